//! Uninstall handler

use anyhow::Result;

use super::should_proceed;
use setver::theme::current_theme;
use setver::Config;

/// Delete the stored version entry after confirmation.
pub fn handle(config: &Config, auto_confirm: bool) -> Result<()> {
    let theme = current_theme();
    let engine = config.engine();
    let mut store = config.open_store();

    let message = format!(
        "Delete '{}' from {}?",
        engine.version_key(),
        store.path().display()
    );
    if !should_proceed(&message, auto_confirm)? {
        println!("{}", theme.primary_text("No changes made."));
        return Ok(());
    }

    if engine.uninstall(&mut store)? {
        println!("{}", theme.success_text("Stored version removed."));
    } else {
        println!("{}", theme.secondary_text("No stored version found."));
    }
    Ok(())
}
