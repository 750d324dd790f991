//! Parsing of command-line values.

use chrono::NaiveDate;

use crate::errors::CliError;

/// Parse a calendar date given as `YYYY-MM-DD`.
pub fn parse_date(flag: &str, value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CliError::invalid_input(format!(
            "Invalid {} date '{}' (expected YYYY-MM-DD)",
            flag, value
        ))
        .into()
    })
}

/// Check a statement period before any file is copied.
pub fn parse_period(from: &str, to: &str) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let start = parse_date("--from", from)?;
    let end = parse_date("--to", to)?;
    if start > end {
        return Err(CliError::invalid_input(format!(
            "Statement period starts after it ends ({} > {})",
            start, end
        ))
        .into());
    }
    Ok((start, end))
}

/// Trimmed, non-empty currency code.
pub fn parse_currency(value: &str) -> anyhow::Result<String> {
    let code = value.trim();
    if code.is_empty() {
        return Err(CliError::invalid_input("Currency must not be empty").into());
    }
    Ok(code.to_string())
}
