//! Gated run handler

use anyhow::Result;
use tracing::info;

use setver::Config;

/// Run pending actions. Silent on success; details go to the log.
pub fn handle(config: &Config) -> Result<()> {
    let engine = config.engine();
    let mut store = config.open_store();

    let report = engine.run(&mut store)?;

    if report.advanced() {
        info!(
            executed = report.executed.len(),
            version = report.current,
            "run complete"
        );
    } else {
        info!(version = report.current, "already up to date");
    }
    Ok(())
}
