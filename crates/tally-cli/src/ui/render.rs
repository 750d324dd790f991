//! Rendering primitives shared by the commands.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, NOTHING, UTF8_FULL};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use tally_core::storage::Account;
use tally_core::AccountTree;

use super::context::UiContext;
use super::mode::OutputMode;
use super::theme::{styled, styles, tree, Badge, HEADER_DOT};

/// Command header.
///
/// Pretty: "Tally · accounts (context)" and an optional `Data:` line.
/// Plain: "tally accounts".
pub fn header_with_context(
    ctx: &UiContext,
    command: &str,
    context: Option<&str>,
    data_dir: Option<&str>,
) -> String {
    match ctx.mode {
        OutputMode::Pretty => {
            let title = styled("Tally", styles::bold(), ctx.color);
            let dot = HEADER_DOT.get(ctx.unicode);
            let mut out = match context {
                Some(c) => format!("{} {} {} ({})", title, dot, command, c),
                None => format!("{} {} {}", title, dot, command),
            };
            if let Some(dir) = data_dir {
                out.push('\n');
                out.push_str(&kv(ctx, "Data", &shorten_path(dir, 50)));
            }
            out
        }
        OutputMode::Plain => format!("tally {}", command),
        OutputMode::Json => String::new(),
    }
}

pub fn header(ctx: &UiContext, command: &str, context: Option<&str>) -> String {
    header_with_context(ctx, command, context, None)
}

fn shorten_path(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}

pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let token = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        token
    } else {
        format!("{} {}", token, message)
    }
}

/// Pretty: "Key: value". Plain: "key=value" with the key snake-cased.
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let label = styled(&format!("{}:", key), styles::dim(), ctx.color);
        format!("{} {}", label, value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", styled("Hint:", styles::dim(), ctx.color), text)
    } else {
        format!("hint={}", text)
    }
}

/// Summary printed after a write.
///
/// Pretty: an OK badge and indented fields. Plain: `status=ok` then fields.
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Ok, title));
        lines.extend(items.iter().map(|(k, v)| format!("  {}", kv(ctx, k, v))));
    } else {
        lines.push("status=ok".to_string());
        lines.extend(items.iter().map(|(k, v)| kv(ctx, k, v)));
    }
    lines.join("\n")
}

#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Self { header }
    }
}

fn plain_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bordered table in pretty mode, space-separated rows otherwise.
pub fn table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return plain_rows(rows);
    }

    let mut table = Table::new();
    if ctx.unicode {
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(ctx.width.min(u16::MAX as usize) as u16)
        .set_header(columns.iter().map(|c| c.header));
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Borderless table with dim headers.
pub fn simple_table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return plain_rows(rows);
    }

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|c| {
        let cell = Cell::new(c.header);
        if ctx.color {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        }
    }));
    for i in 0..columns.len() {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Draw the chart of accounts with box-drawing guides.
///
/// Closed accounts are dimmed and tagged `(closed)`.
pub fn account_tree(ctx: &UiContext, accounts: &AccountTree) -> String {
    let mut lines = Vec::with_capacity(accounts.len());
    for root in accounts.roots() {
        push_subtree(ctx, accounts, root, "", None, &mut lines);
    }
    lines.join("\n")
}

fn push_subtree(
    ctx: &UiContext,
    accounts: &AccountTree,
    account: &Account,
    prefix: &str,
    is_last: Option<bool>,
    lines: &mut Vec<String>,
) {
    let connector = match is_last {
        None => "",
        Some(true) => tree::LAST.get(ctx.unicode),
        Some(false) => tree::BRANCH.get(ctx.unicode),
    };

    let label = if account.is_closed {
        styled(&format!("{} (closed)", account.name), styles::dim(), ctx.color)
    } else {
        styled(&account.name, styles::bold(), ctx.color)
    };
    let currency = styled(&account.currency, styles::dim(), ctx.color);
    lines.push(format!("{}{}{}  {}", prefix, connector, label, currency));

    let child_prefix = match is_last {
        None => prefix.to_string(),
        Some(true) => format!("{}{}", prefix, tree::SPACE.get(ctx.unicode)),
        Some(false) => format!("{}{}", prefix, tree::PIPE.get(ctx.unicode)),
    };
    let children = accounts.children(&account.id);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        push_subtree(ctx, accounts, child, &child_prefix, Some(i + 1 == count), lines);
    }
}

/// Print unless the command is in JSON mode.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() {
        println!("{}", message);
    }
}

pub fn blank_line(ctx: &UiContext) {
    if ctx.mode.is_pretty() {
        println!();
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = Vec::with_capacity(2);
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Err, message));
        lines.extend(error_hint.map(|h| hint(ctx, h)));
    } else {
        lines.push(format!("error={}", message));
        lines.extend(error_hint.map(|h| format!("hint={}", h)));
    }
    lines.join("\n")
}

pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}
