//! Lock-free holder for the most recent successful analysis

use crate::analysis::AnalysisReport;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Latest finished report, replaced wholesale on every successful run.
///
/// Cloning the store shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    latest: Arc<ArcSwapOption<AnalysisReport>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored report, returning the one it displaced
    pub fn publish(&self, report: Arc<AnalysisReport>) -> Option<Arc<AnalysisReport>> {
        self.latest.swap(Some(report))
    }

    pub fn latest(&self) -> Option<Arc<AnalysisReport>> {
        self.latest.load_full()
    }

    pub fn has_result(&self) -> bool {
        self.latest.load().is_some()
    }

    pub fn clear(&self) {
        self.latest.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytstats_common::{now, test_utils::fixtures, RequestedCount};

    fn report(title: &str) -> Arc<AnalysisReport> {
        Arc::new(AnalysisReport {
            channel: fixtures::channel("UC1", title),
            requested: RequestedCount::All,
            video_ids_collected: 0,
            records: Vec::new(),
            series: Vec::new(),
            failed_batches: Vec::new(),
            completed_at: now(),
        })
    }

    #[test]
    fn test_publish_replaces_previous() {
        let store = ResultStore::new();
        assert!(!store.has_result());

        assert!(store.publish(report("first")).is_none());
        let displaced = store.publish(report("second")).unwrap();
        assert_eq!(displaced.channel.title, "first");
        assert_eq!(store.latest().unwrap().channel.title, "second");
    }

    #[test]
    fn test_clones_share_the_slot() {
        let store = ResultStore::new();
        let reader = store.clone();
        store.publish(report("shared"));
        assert_eq!(reader.latest().unwrap().channel.title, "shared");

        reader.clear();
        assert!(store.latest().is_none());
    }
}
