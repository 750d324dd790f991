use crate::app::AppContext;
use crate::cli::FormArgs;
use crate::form::{clear_screen, TransactionForm};
use crate::ui::print;

/// Draw the entry form once and return. Nothing is read back.
pub fn handle_form(ctx: &AppContext, args: &FormArgs) -> anyhow::Result<()> {
    let mut form = TransactionForm::new(Vec::new(), Vec::new());
    if let Some(code) = ctx.default_currency()? {
        form = form.with_default_currency(&code);
    }

    let ui_ctx = ctx.ui_context(args.json, None)?;
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&form)?);
        return Ok(());
    }

    if ui_ctx.mode.is_pretty() {
        print!("{}", clear_screen());
    }
    print(&ui_ctx, &form.render(&ui_ctx));
    Ok(())
}
