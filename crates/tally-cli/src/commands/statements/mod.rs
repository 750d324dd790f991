pub mod history;
pub mod import;
pub mod list;
pub mod supersede;

pub use history::handle_history;
pub use import::handle_import;
pub use list::handle_list;
pub use supersede::handle_supersede;
