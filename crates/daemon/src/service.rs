//! The poll cycle: fetch, normalize, diff, notify, persist.
//!
//! Neither entry point returns an error. Any failure is logged with its kind,
//! reported by email on a best-effort basis, and encoded in the response body.
//! Overlapping cycles are not serialized; the snapshot is last-writer-wins.

use std::sync::Arc;

use serde_json::Value;
use stockwatch_core::api::{CheckResponse, StockResponse};
use stockwatch_core::{diff_stock, normalize, render_changes, WatchError};
use tracing::{error, info};

use crate::fetch::StockSource;
use crate::notify::{
    Notifier, SUBJECT_CHECK_ERROR, SUBJECT_CURRENT_ERROR, SUBJECT_CURRENT_STOCK,
    SUBJECT_STOCK_UPDATE,
};
use crate::store::SnapshotStore;

const EMPTY_LISTING: &str = "No stock data available";

pub struct StockWatcher {
    source: Arc<dyn StockSource>,
    store: SnapshotStore,
    notifier: Notifier,
}

impl StockWatcher {
    pub fn new(source: Arc<dyn StockSource>, store: SnapshotStore, notifier: Notifier) -> Self {
        Self {
            source,
            store,
            notifier,
        }
    }

    /// One full check cycle.
    pub async fn check_stock_changes(&self) -> CheckResponse {
        match self.try_check().await {
            Ok(changes) => CheckResponse::ok(changes),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "stock check failed");
                self.notifier
                    .send(
                        SUBJECT_CHECK_ERROR,
                        &[format!("Error checking stock: {e}")],
                    )
                    .await;
                CheckResponse::failed(e.to_string())
            }
        }
    }

    async fn try_check(&self) -> Result<Vec<String>, WatchError> {
        let raw = self.source.fetch().await?;
        let previous = self.store.load().await.map(|v| normalize(&v));
        let current = normalize(&raw);

        let changes = render_changes(&diff_stock(previous.as_deref(), &current));
        info!(
            items = current.len(),
            first_run = previous.as_ref().map_or(true, Vec::is_empty),
            changes = changes.len(),
            "stock checked"
        );

        if !changes.is_empty() {
            self.notifier.send(SUBJECT_STOCK_UPDATE, &changes).await;
        }

        // The raw payload is stored, whatever shape it arrived in.
        self.store.save(&raw).await?;
        Ok(changes)
    }

    /// Fetches the current listing and emails all of it.
    pub async fn get_current_stock(&self) -> StockResponse {
        match self.try_current().await {
            Ok(stock) => StockResponse::ok(stock),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "current stock fetch failed");
                self.notifier
                    .send(
                        SUBJECT_CURRENT_ERROR,
                        &[format!("Error fetching stock: {e}")],
                    )
                    .await;
                StockResponse::failed(e.to_string())
            }
        }
    }

    async fn try_current(&self) -> Result<Vec<String>, WatchError> {
        let raw: Value = self.source.fetch().await?;
        let stock: Vec<String> = normalize(&raw).iter().map(|i| i.status_line()).collect();

        let body = if stock.is_empty() {
            vec![EMPTY_LISTING.to_string()]
        } else {
            stock.clone()
        };
        self.notifier.send(SUBJECT_CURRENT_STOCK, &body).await;
        Ok(stock)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;
    use crate::notify::testing::RecordingMailer;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    struct Harness {
        _dir: TempDir,
        store: SnapshotStore,
        mailer: Arc<RecordingMailer>,
        watcher: StockWatcher,
    }

    fn harness(results: Vec<Result<Value, String>>) -> Harness {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("stockData.json"));
        let mailer = Arc::new(RecordingMailer::default());
        let watcher = StockWatcher::new(
            Arc::new(ScriptedSource::new(results)),
            store.clone(),
            Notifier::new(mailer.clone(), "me@example.com"),
        );
        Harness {
            _dir: dir,
            store,
            mailer,
            watcher,
        }
    }

    #[tokio::test]
    async fn first_run_reports_in_stock_items_and_persists_raw() {
        let raw = json!({"data": [
            {"id": 1, "name": "A", "inStock": true},
            {"id": 2, "name": "B", "inStock": false}
        ]});
        let h = harness(vec![Ok(raw.clone())]);

        let res = h.watcher.check_stock_changes().await;
        assert_eq!(res, CheckResponse::ok(vec!["A is in stock (New Item)".into()]));
        assert_eq!(h.mailer.subjects(), vec![SUBJECT_STOCK_UPDATE]);
        // Stored as fetched, not normalized.
        assert_eq!(h.store.load().await, Some(raw));
    }

    #[tokio::test]
    async fn unchanged_cycle_overwrites_snapshot_without_email() {
        let raw = json!([{"id": 1, "name": "A", "inStock": false}]);
        let h = harness(vec![Ok(raw.clone())]);
        // Same items, different wrapper: the diff works on the normalized view.
        h.store.save(&json!({"items": raw.clone()})).await.unwrap();

        let res = h.watcher.check_stock_changes().await;
        assert_eq!(res, CheckResponse::ok(vec![]));
        assert!(h.mailer.subjects().is_empty());
        assert_eq!(h.store.load().await, Some(raw));
    }

    #[tokio::test]
    async fn restock_and_added_across_cycles() {
        let h = harness(vec![
            Ok(json!([{"id": 1, "name": "A", "inStock": false}])),
            Ok(json!([
                {"id": 1, "name": "A", "inStock": true},
                {"id": 2, "name": "C", "inStock": false}
            ])),
        ]);

        assert_eq!(h.watcher.check_stock_changes().await, CheckResponse::ok(vec![]));
        let res = h.watcher.check_stock_changes().await;
        assert_eq!(
            res,
            CheckResponse::ok(vec![
                "A is back in stock".into(),
                "C was added to stock".into()
            ])
        );
        let sent = h.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].text,
            "Stock update:\n\nA is back in stock\nC was added to stock"
        );
    }

    #[tokio::test]
    async fn malformed_payload_still_overwrites_snapshot() {
        let h = harness(vec![Ok(json!("unexpected"))]);
        h.store
            .save(&json!([{"id": 1, "name": "A", "inStock": true}]))
            .await
            .unwrap();

        let res = h.watcher.check_stock_changes().await;
        assert!(res.success);
        assert_eq!(h.store.load().await, Some(json!("unexpected")));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_not_raised() {
        let h = harness(vec![Err("connection refused".into())]);
        h.store.save(&json!([1])).await.unwrap();

        let res = h.watcher.check_stock_changes().await;
        assert_eq!(
            res,
            CheckResponse::failed("fetch failed: connection refused")
        );
        assert_eq!(h.mailer.subjects(), vec![SUBJECT_CHECK_ERROR]);
        assert_eq!(
            h.mailer.sent.lock().unwrap()[0].text,
            "Stock update:\n\nError checking stock: fetch failed: connection refused"
        );
        // Snapshot untouched on failure.
        assert_eq!(h.store.load().await, Some(json!([1])));
    }

    #[tokio::test]
    async fn snapshot_write_failure_takes_error_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let watcher = StockWatcher::new(
            Arc::new(ScriptedSource::new(vec![Ok(json!([
                {"id": 1, "name": "A", "inStock": false}
            ]))])),
            SnapshotStore::new(blocker.join("stockData.json")),
            Notifier::new(mailer.clone(), "me@example.com"),
        );

        let res = watcher.check_stock_changes().await;
        assert!(!res.success);
        assert!(res.changes.is_none());
        let error = res.error.unwrap();
        assert!(error.starts_with("snapshot persistence failed: "), "{error}");

        // No changes on a first run with nothing in stock, so only the error email goes out.
        assert_eq!(mailer.subjects(), vec![SUBJECT_CHECK_ERROR]);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(
            sent[0].text,
            format!("Stock update:\n\nError checking stock: {error}")
        );
    }

    #[tokio::test]
    async fn error_email_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let watcher = StockWatcher::new(
            Arc::new(ScriptedSource::new(vec![Err("timeout".into())])),
            SnapshotStore::new(dir.path().join("stockData.json")),
            Notifier::new(Arc::new(RecordingMailer::failing()), "me@example.com"),
        );
        let res = watcher.get_current_stock().await;
        assert_eq!(res, StockResponse::failed("fetch failed: timeout"));
    }

    #[tokio::test]
    async fn current_stock_lists_everything() {
        let h = harness(vec![Ok(json!({"seed": {"id": 1, "name": "A", "inStock": true},
                                       "gear": {"id": 2, "name": "B", "inStock": false}}))]);
        let res = h.watcher.get_current_stock().await;
        // Record-map values keep payload order.
        assert_eq!(
            res,
            StockResponse::ok(vec!["A: In Stock".into(), "B: Out of Stock".into()])
        );
        assert_eq!(h.mailer.subjects(), vec![SUBJECT_CURRENT_STOCK]);
        // Listing does not touch the snapshot.
        assert_eq!(h.store.load().await, None);
    }

    #[tokio::test]
    async fn current_stock_empty_listing_uses_placeholder() {
        let h = harness(vec![Ok(json!(null))]);
        let res = h.watcher.get_current_stock().await;
        assert_eq!(res, StockResponse::ok(vec![]));
        let sent = h.mailer.sent.lock().unwrap();
        assert_eq!(sent[0].text, "Stock update:\n\nNo stock data available");
    }

    #[tokio::test]
    async fn disabled_notifier_does_not_stop_polling() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("stockData.json"));
        let watcher = StockWatcher::new(
            Arc::new(ScriptedSource::new(vec![Ok(json!([
                {"id": 1, "name": "A", "inStock": true}
            ]))])),
            store.clone(),
            Notifier::disabled("me@example.com"),
        );
        let res = watcher.check_stock_changes().await;
        assert_eq!(res, CheckResponse::ok(vec!["A is in stock (New Item)".into()]));
        assert!(store.load().await.is_some());
    }
}
