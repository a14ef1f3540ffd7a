//! Best-effort report persistence.

use std::sync::Arc;

use crate::core::{ReportData, ResearchMode};
use crate::storage::{ReportRecord, ReportStore};

/// Saves `report` through `store` and returns its identifier.
///
/// Never fails: storage errors and a panicking store are logged with
/// their kind and turned into `None`, leaving the in-memory report as is.
/// The synchronous store call runs on the blocking pool.
pub async fn save_report_safely(
    store: &Arc<dyn ReportStore>,
    query: &str,
    mode: ResearchMode,
    report: &ReportData,
) -> Option<String> {
    let record = ReportRecord::from_report(query, mode, report);
    let store = Arc::clone(store);

    match tokio::task::spawn_blocking(move || store.save(&record)).await {
        Ok(Ok(id)) => {
            tracing::info!(report_id = %id, "report persisted");
            Some(id)
        }
        Ok(Err(e)) => {
            tracing::error!(error_kind = e.kind(), error = %e, "report save failed");
            None
        }
        Err(e) => {
            let kind = if e.is_panic() { "panic" } else { "cancelled" };
            tracing::error!(error_kind = kind, error = %e, "report save task failed");
            None
        }
    }
}
