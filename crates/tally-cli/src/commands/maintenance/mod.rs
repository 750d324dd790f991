pub mod check;
pub mod migrations;

pub use check::handle_check;
pub use migrations::handle_migrations;
