//! Terminal UI for the Tally CLI.
//!
//! - **context**: TTY, width, color, and unicode detection
//! - **mode**: json / plain / pretty routing
//! - **theme**: badges, styles, tree glyphs
//! - **render**: headers, tables, receipts, hints, the account tree
//! - **format**: IDs, dates, sizes

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::{OutputFormat, OutputMode};
pub use theme::Badge;

pub use render::{
    badge, blank_line, header, hint, kv, print, receipt, simple_table, table, Column,
};

pub use format::{format_bytes, format_datetime, format_period, short_id, truncate};
