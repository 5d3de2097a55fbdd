//! Show publication status for the configured network.

use anyhow::Result;

use pin_sync::AssetStatus;

use crate::commands::orchestrator;
use crate::config::Config;

/// Run the status command.
pub async fn run(config: &Config, mock: bool) -> Result<()> {
    let orchestrator = orchestrator(config.sync_settings()?, config, mock);
    let settings = orchestrator.settings();
    let statuses = orchestrator.status().await?;

    println!("=== assetpin status ===");
    println!();
    println!("Network: {}", settings.namespace);
    println!("Assets:  {}", settings.assets_root.display());
    println!(
        "State:   {}",
        orchestrator
            .state_store()
            .state_path(&settings.namespace)
            .display()
    );
    println!();

    if statuses.is_empty() {
        println!("No assets found.");
        return Ok(());
    }

    let width = statuses
        .iter()
        .map(|s| s.id.as_str().len())
        .max()
        .unwrap_or(0);
    for status in &statuses {
        println!("  {:width$}  {}", status.id.as_str(), describe(status));
    }

    let published = statuses.iter().filter(|s| s.is_published()).count();
    let pending = statuses
        .iter()
        .filter(|s| s.on_disk && !s.is_published())
        .count();
    println!();
    println!("{published} published, {pending} pending");

    Ok(())
}

fn describe(status: &AssetStatus) -> String {
    let state = status.uri.as_deref().unwrap_or("pending");
    if status.on_disk {
        state.to_string()
    } else if status.is_published() {
        format!("{state} (not on disk)")
    } else {
        "unpublished (not on disk)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_types::AssetId;
    use tempfile::tempdir;

    fn status(name: &str, uri: Option<&str>, on_disk: bool) -> AssetStatus {
        AssetStatus {
            id: AssetId::new(name).unwrap(),
            uri: uri.map(str::to_string),
            on_disk,
        }
    }

    #[test]
    fn describes_each_state() {
        assert_eq!(describe(&status("a", None, true)), "pending");
        assert_eq!(describe(&status("a", Some("ipfs://A"), true)), "ipfs://A");
        assert_eq!(
            describe(&status("a", Some("ipfs://A"), false)),
            "ipfs://A (not on disk)"
        );
        assert_eq!(
            describe(&status("a", None, false)),
            "unpublished (not on disk)"
        );
    }

    #[tokio::test]
    async fn status_on_empty_root() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.assets.root = dir.path().to_path_buf();

        let result = run(&config, true).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn status_on_missing_root_fails() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.assets.root = dir.path().join("nope");

        assert!(run(&config, true).await.is_err());
    }
}
