//! JSON shapes for accounts and statements.

use std::collections::HashMap;

use tally_core::storage::{Account, Statement};
use uuid::Uuid;

pub fn account_json(account: &Account, path: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": account.id,
        "parent_id": account.parent_id,
        "name": account.name,
        "path": path.unwrap_or(&account.name),
        "currency": account.currency,
        "is_closed": account.is_closed,
        "created_at": account.created_at,
        "note": account.note,
    })
}

pub fn accounts_json(accounts: &[Account], paths: &HashMap<Uuid, String>) -> Vec<serde_json::Value> {
    accounts
        .iter()
        .map(|account| account_json(account, paths.get(&account.id).map(String::as_str)))
        .collect()
}

pub fn statement_json(statement: &Statement, account_path: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": statement.id,
        "institution": statement.institution,
        "account_id": statement.account_id,
        "account": account_path,
        "period_start": statement.period_start,
        "period_end": statement.period_end,
        "currency": statement.currency,
        "file_hash": statement.file_hash,
        "file_size": statement.file_size,
        "imported_at": statement.imported_at,
        "replaced_by": statement.replaced_by,
        "active": statement.is_active(),
    })
}

pub fn statements_json(
    statements: &[Statement],
    paths: &HashMap<Uuid, String>,
) -> Vec<serde_json::Value> {
    statements
        .iter()
        .map(|s| statement_json(s, paths.get(&s.account_id).map(String::as_str)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_account_json_falls_back_to_name_for_path() {
        let account = Account {
            id: Uuid::new_v4(),
            parent_id: None,
            name: "Assets".to_string(),
            currency: "USD".to_string(),
            is_closed: false,
            created_at: Utc::now(),
            note: None,
        };
        let value = account_json(&account, None);
        assert_eq!(value["path"], "Assets");
        assert_eq!(value["is_closed"], false);
        assert!(value["note"].is_null());
    }

    #[test]
    fn test_statement_json_reports_active_and_dates() {
        let statement = Statement {
            id: Uuid::new_v4(),
            institution: "First Bank".to_string(),
            account_id: Uuid::new_v4(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            currency: "USD".to_string(),
            file_hash: "abc".to_string(),
            file_size: 42,
            imported_at: Utc::now(),
            replaced_by: Some(Uuid::new_v4()),
        };
        let value = statement_json(&statement, Some("Assets:Checking"));
        assert_eq!(value["period_start"], "2026-01-01");
        assert_eq!(value["account"], "Assets:Checking");
        assert_eq!(value["active"], false);
    }
}
