//! The transaction entry form.
//!
//! The form only describes its fields and draws them. It has no submit
//! action, does not validate input, and never reads or writes the store.

use serde::Serialize;

use crate::ui::render::header;
use crate::ui::theme::{styled, styles, SymbolPair};
use crate::ui::UiContext;

/// Currencies offered when nothing else is configured.
pub const BUILTIN_CURRENCIES: [&str; 7] = ["USD", "EUR", "GBP", "CAD", "JPY", "CHF", "AUD"];

const CHECKBOX_OFF: SymbolPair = SymbolPair::new("[ ]", "\u{2610}");
const SELECT_ARROW: SymbolPair = SymbolPair::new("v", "\u{25BE}");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceField {
    pub label: String,
    pub choices: Vec<String>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextField {
    pub label: String,
    pub placeholder: String,
}

/// Pick from `choices` or type any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboField {
    pub label: String,
    pub choices: Vec<String>,
    pub freeform: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckboxField {
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionForm {
    pub title: String,
    pub currency: ChoiceField,
    pub amount: TextField,
    pub account: ComboField,
    pub split: CheckboxField,
}

impl TransactionForm {
    pub fn new(currencies: Vec<String>, accounts: Vec<String>) -> Self {
        let currencies = if currencies.is_empty() {
            BUILTIN_CURRENCIES.iter().map(|c| c.to_string()).collect()
        } else {
            currencies
        };
        Self {
            title: "New transaction".to_string(),
            currency: ChoiceField {
                label: "Currency".to_string(),
                selected: Some(0),
                choices: currencies,
            },
            amount: TextField {
                label: "Amount".to_string(),
                placeholder: "0.00".to_string(),
            },
            account: ComboField {
                label: "Account".to_string(),
                choices: accounts,
                freeform: true,
            },
            split: CheckboxField {
                label: "Split".to_string(),
                checked: false,
            },
        }
    }

    /// Preselect `code`, adding it to the choices if missing.
    pub fn with_default_currency(mut self, code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            return self;
        }
        let position = match self.currency.choices.iter().position(|c| c == code) {
            Some(i) => i,
            None => {
                self.currency.choices.insert(0, code.to_string());
                0
            }
        };
        self.currency.selected = Some(position);
        self
    }

    pub fn selected_currency(&self) -> Option<&str> {
        self.currency
            .selected
            .and_then(|i| self.currency.choices.get(i))
            .map(String::as_str)
    }

    /// Draw the form as text.
    pub fn render(&self, ctx: &UiContext) -> String {
        let label = |text: &str| styled(&format!("{:<9}", text), styles::dim(), ctx.color);
        let mut lines = vec![header(ctx, "form", Some(&self.title)), String::new()];

        let currency = self.selected_currency().unwrap_or("");
        lines.push(format!(
            "{} [ {:<6} {} ]  {}",
            label(&self.currency.label),
            currency,
            SELECT_ARROW.get(ctx.unicode),
            styled(&self.currency.choices.join(" "), styles::dim(), ctx.color)
        ));

        lines.push(format!(
            "{} [ {:<20} ]",
            label(&self.amount.label),
            styled(&self.amount.placeholder, styles::dim(), ctx.color)
        ));

        let account_hint = if self.account.choices.is_empty() {
            "type an account path".to_string()
        } else {
            self.account.choices.join(", ")
        };
        lines.push(format!(
            "{} [ {:<20} {} ]  {}",
            label(&self.account.label),
            "",
            SELECT_ARROW.get(ctx.unicode),
            styled(&account_hint, styles::dim(), ctx.color)
        ));

        lines.push(format!(
            "{} {}",
            label(&self.split.label),
            CHECKBOX_OFF.get(ctx.unicode)
        ));
        lines.join("\n")
    }
}

/// Clear the screen and move the cursor home.
pub fn clear_screen() -> &'static str {
    "\x1b[2J\x1b[H"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    fn ctx(unicode: bool) -> UiContext {
        UiContext {
            is_tty: true,
            color: false,
            unicode,
            width: 80,
            mode: OutputMode::Pretty,
        }
    }

    #[test]
    fn test_builtin_currencies_when_none_given() {
        let form = TransactionForm::new(Vec::new(), Vec::new());
        assert_eq!(form.currency.choices.len(), BUILTIN_CURRENCIES.len());
        assert_eq!(form.selected_currency(), Some("USD"));
        assert!(form.account.freeform);
        assert!(!form.split.checked);
    }

    #[test]
    fn test_default_currency_selected_or_added() {
        let form = TransactionForm::new(Vec::new(), Vec::new()).with_default_currency("CAD");
        assert_eq!(form.selected_currency(), Some("CAD"));
        assert_eq!(form.currency.choices.len(), BUILTIN_CURRENCIES.len());

        let form = TransactionForm::new(Vec::new(), Vec::new()).with_default_currency("NZD");
        assert_eq!(form.currency.choices[0], "NZD");
        assert_eq!(form.selected_currency(), Some("NZD"));
    }

    #[test]
    fn test_render_shows_every_field() {
        let form = TransactionForm::new(
            vec!["USD".to_string()],
            vec!["Assets:Checking".to_string()],
        );
        let out = form.render(&ctx(false));
        for needle in ["Currency", "Amount", "Account", "Split", "Assets:Checking", "[ ]"] {
            assert!(out.contains(needle), "missing {}", needle);
        }
        assert!(form.render(&ctx(true)).contains('\u{2610}'));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(TransactionForm::new(Vec::new(), Vec::new())).unwrap();
        assert_eq!(value["account"]["freeform"], true);
        assert_eq!(value["split"]["checked"], false);
        assert_eq!(value["amount"]["placeholder"], "0.00");
    }
}
