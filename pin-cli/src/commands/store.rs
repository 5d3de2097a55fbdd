//! Store every pending asset and record its address.

use anyhow::{Context, Result};

use pin_core::{Outcome, SyncReport};
use pin_sync::SyncError;

use crate::commands::orchestrator;
use crate::config::Config;
use crate::{EXIT_FAILED, EXIT_INTERRUPTED, EXIT_OK};

/// Flags of the `store` command.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// List pending assets without uploading.
    pub dry_run: bool,
    /// Override `sync.concurrency`.
    pub concurrency: Option<usize>,
}

/// Run the store command and return the process exit status.
pub async fn run(config: &Config, options: StoreOptions, mock: bool) -> Result<u8> {
    if !mock && !options.dry_run && config.store.api_token.is_none() {
        tracing::warn!("No API token configured for {}", config.store.endpoint);
    }

    let mut settings = config.sync_settings()?;
    settings.dry_run = options.dry_run;
    if let Some(concurrency) = options.concurrency {
        settings.concurrency = concurrency.max(1);
    }
    let orchestrator = orchestrator(settings, config, mock);

    let result = tokio::select! {
        result = orchestrator.run() => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            eprintln!("Interrupted. Assets stored so far are recorded in the state file.");
            return Ok(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(exit_status(report.outcome()))
        }
        Err(SyncError::StateSave { report, source }) => {
            print_report(&report);
            eprintln!("These uploads are not recorded; add them to the state file by hand:");
            for (id, address) in &report.published {
                eprintln!("  {id}: {address}");
            }
            Err(source).context(format!(
                "Failed to save state to {}",
                orchestrator
                    .state_store()
                    .state_path(&orchestrator.settings().namespace)
                    .display()
            ))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &SyncReport) {
    match report.outcome() {
        Outcome::NoNewAssets => {
            println!("No new asset to be stored, skipped");
            return;
        }
        Outcome::DryRun { .. } => {
            for id in &report.pending {
                println!("{id}");
            }
        }
        _ => {
            for (id, address) in &report.published {
                println!("{id}: {address}");
            }
            for failure in &report.failed {
                println!("FAILED {failure}");
            }
        }
    }
    println!("{}", report.outcome());
}

fn exit_status(outcome: Outcome) -> u8 {
    if outcome.is_success() {
        EXIT_OK
    } else {
        EXIT_FAILED
    }
}
