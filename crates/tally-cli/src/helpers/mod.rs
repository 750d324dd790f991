//! Argument parsing and reference lookup shared by the commands.

mod lookup;
mod parsing;

pub use lookup::{resolve_account, resolve_statement};
pub use parsing::{parse_currency, parse_period};
