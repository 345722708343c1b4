//! Status handler

use anyhow::Result;

use setver::theme::current_theme;
use setver::Config;

/// Show the stored version and the actions a run would execute.
pub fn handle(config: &Config) -> Result<()> {
    let theme = current_theme();
    let engine = config.engine();
    let store = config.open_store();
    let plan = engine.plan(&store)?;

    println!(
        "{}",
        theme.primary_text(&format!("Store:   {}", store.path().display()))
    );
    println!(
        "{}",
        theme.primary_text(&format!("Version: {}", plan.current))
    );
    println!(
        "{}",
        theme.primary_text(&format!(
            "Actions: {} registered, {} pending",
            plan.applied.len() + plan.pending.len(),
            plan.pending.len()
        ))
    );

    if plan.is_up_to_date() {
        println!("{}", theme.success_text("Up to date."));
        return Ok(());
    }

    println!("{}", theme.primary_text("Pending:"));
    for migration in &plan.pending {
        println!(
            "  {} {}",
            theme.accent_text(&format!("v{}", migration.version())),
            theme.primary_text(migration.name())
        );
    }
    Ok(())
}
