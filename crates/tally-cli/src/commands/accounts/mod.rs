pub mod add;
pub mod delete;
pub mod list;
pub mod rename;
pub mod show;
pub mod status;
pub mod tree;

pub use add::handle_add;
pub use delete::handle_delete;
pub use list::handle_list;
pub use rename::handle_rename;
pub use show::handle_show;
pub use status::{handle_close, handle_reopen};
pub use tree::handle_tree;
