//! Application-level plumbing: config and data directory resolution and the
//! context handed to every command.

mod context;
mod resolver;

pub use context::AppContext;
