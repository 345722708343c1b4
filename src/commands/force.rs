//! Forced run handler

use anyhow::Result;

use setver::theme::current_theme;
use setver::{Config, EngineError};

/// Run every action regardless of the stored version, reporting each one.
pub fn handle(config: &Config) -> Result<()> {
    let theme = current_theme();
    let engine = config.engine();

    let result = engine.force_all(|migration| {
        println!(
            "{}",
            theme.primary_text(&format!("Running: {}", migration.name()))
        );
    });

    match result {
        Ok(report) if report.executed.is_empty() => {
            println!("{}", theme.secondary_text("No actions are registered."));
            Ok(())
        }
        Ok(_) => {
            println!(
                "{}",
                theme.success_text("Success: all actions have been triggered.")
            );
            Ok(())
        }
        Err(e @ EngineError::ForcedActionFailed { .. }) => {
            eprintln!("{}", theme.error_text("Failed: not all actions ran."));
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
