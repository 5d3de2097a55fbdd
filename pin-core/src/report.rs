//! Run summary.
//!
//! A [`SyncReport`] is built by the orchestrator as results come in and
//! classified into an [`Outcome`] at the end. Partial success is its own
//! outcome and is never reported as full success.

use std::fmt;

use pin_types::{AssetId, ContentAddress};

/// Where an asset's publication failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Reading `metadata.json` or the payload failed.
    Bundle,
    /// Submitting to the store failed.
    Publish,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Bundle => f.write_str("bundle"),
            FailureStage::Publish => f.write_str("publish"),
        }
    }
}

/// One asset that could not be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    /// The asset.
    pub asset: AssetId,
    /// Stage that failed.
    pub stage: FailureStage,
    /// Human-readable cause.
    pub reason: String,
}

impl fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.asset, self.stage, self.reason)
    }
}

/// Classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was pending; state untouched.
    NoNewAssets,
    /// Dry run: `pending` assets would have been published.
    DryRun {
        /// Number of pending assets.
        pending: usize,
    },
    /// Every pending asset was published.
    Published {
        /// Number of assets published.
        count: usize,
    },
    /// Some assets were published, some failed.
    Partial {
        /// Number of assets published.
        published: usize,
        /// Number of assets that failed.
        failed: usize,
    },
    /// Every pending asset failed.
    AllFailed {
        /// Number of assets that failed.
        failed: usize,
    },
}

impl Outcome {
    /// Whether the run should exit successfully.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Outcome::NoNewAssets | Outcome::DryRun { .. } | Outcome::Published { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoNewAssets => f.write_str("no new assets to store"),
            Outcome::DryRun { pending } => write!(f, "{pending} asset(s) would be stored"),
            Outcome::Published { count } => write!(f, "{count} asset(s) stored"),
            Outcome::Partial { published, failed } => {
                write!(f, "{published} asset(s) stored, {failed} failed")
            }
            Outcome::AllFailed { failed } => write!(f, "all {failed} asset(s) failed"),
        }
    }
}

/// Everything that happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Assets found pending at the start of the run.
    pub pending: Vec<AssetId>,
    /// Assets published in this run, with their new addresses.
    pub published: Vec<(AssetId, ContentAddress)>,
    /// Assets that failed.
    pub failed: Vec<AssetFailure>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl SyncReport {
    /// Start a report for the given pending assets.
    pub fn new(pending: Vec<AssetId>) -> Self {
        Self {
            pending,
            ..Self::default()
        }
    }

    /// Record a successful publication.
    pub fn record_published(&mut self, asset: AssetId, address: ContentAddress) {
        self.published.push((asset, address));
    }

    /// Record a failure.
    pub fn record_failure(&mut self, asset: AssetId, stage: FailureStage, reason: impl Into<String>) {
        self.failed.push(AssetFailure {
            asset,
            stage,
            reason: reason.into(),
        });
    }

    /// Sort results by asset id so output is stable regardless of completion order.
    pub fn sort(&mut self) {
        self.published.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed.sort_by(|a, b| a.asset.cmp(&b.asset));
    }

    /// Classify the run.
    pub fn outcome(&self) -> Outcome {
        if self.pending.is_empty() {
            return Outcome::NoNewAssets;
        }
        if self.dry_run {
            return Outcome::DryRun {
                pending: self.pending.len(),
            };
        }
        match (self.published.len(), self.failed.len()) {
            (count, 0) => Outcome::Published { count },
            (0, failed) => Outcome::AllFailed { failed },
            (published, failed) => Outcome::Partial { published, failed },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AssetId {
        AssetId::new(name).unwrap()
    }

    fn addr(uri: &str) -> ContentAddress {
        ContentAddress::new(uri).unwrap()
    }

    #[test]
    fn empty_report_is_no_new_assets() {
        let report = SyncReport::new(vec![]);
        assert_eq!(report.outcome(), Outcome::NoNewAssets);
        assert!(report.outcome().is_success());
    }

    #[test]
    fn all_published() {
        let mut report = SyncReport::new(vec![id("a"), id("b")]);
        report.record_published(id("a"), addr("ipfs://A"));
        report.record_published(id("b"), addr("ipfs://B"));

        assert_eq!(report.outcome(), Outcome::Published { count: 2 });
        assert!(report.outcome().is_success());
    }

    #[test]
    fn partial_success_is_not_success() {
        let mut report = SyncReport::new(vec![id("a"), id("c")]);
        report.record_published(id("a"), addr("ipfs://A"));
        report.record_failure(id("c"), FailureStage::Publish, "connection reset");

        let outcome = report.outcome();
        assert_eq!(
            outcome,
            Outcome::Partial {
                published: 1,
                failed: 1
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.to_string(), "1 asset(s) stored, 1 failed");
    }

    #[test]
    fn all_failed() {
        let mut report = SyncReport::new(vec![id("a")]);
        report.record_failure(id("a"), FailureStage::Bundle, "metadata.json missing");

        assert_eq!(report.outcome(), Outcome::AllFailed { failed: 1 });
        assert_eq!(
            report.failed[0].to_string(),
            "a (bundle): metadata.json missing"
        );
    }

    #[test]
    fn dry_run_outcome() {
        let mut report = SyncReport::new(vec![id("a"), id("b")]);
        report.dry_run = true;
        assert_eq!(report.outcome(), Outcome::DryRun { pending: 2 });
    }

    #[test]
    fn sort_orders_by_asset() {
        let mut report = SyncReport::new(vec![id("a"), id("b")]);
        report.record_published(id("b"), addr("ipfs://B"));
        report.record_published(id("a"), addr("ipfs://A"));
        report.sort();
        assert_eq!(report.published[0].0, id("a"));
    }
}
