//! Output formatting for accounts and statements.

mod json;
mod text;

pub use json::{account_json, accounts_json, statement_json, statements_json};
pub use text::{
    account_paths, paths_from_tree, print_account_detail, print_account_list,
    print_statement_list,
};
