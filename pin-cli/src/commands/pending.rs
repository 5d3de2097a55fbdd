//! Print pending asset ids, one per line.

use anyhow::Result;

use crate::commands::orchestrator;
use crate::config::Config;

/// Run the pending command.
pub async fn run(config: &Config, mock: bool) -> Result<()> {
    let orchestrator = orchestrator(config.sync_settings()?, config, mock);
    for id in orchestrator.pending().await? {
        println!("{id}");
    }
    Ok(())
}
