//! A catalog shared between request handlers and the reload path.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};

use crate::catalog::{Catalog, LoadOutcome, LoadTicket};
use crate::error::CatalogError;
use crate::source::{Source, SourceClient};

/// Single writer (loads), many readers (queries).
///
/// Every load takes a ticket before its I/O starts and commits only if no
/// later ticket has committed in the meantime. [`SharedCatalog::reload`]
/// additionally refuses to start while another reload is in flight.
#[derive(Debug, Clone)]
pub struct SharedCatalog {
    catalog: Arc<RwLock<Catalog>>,
    issued: Arc<AtomicU64>,
    reload_guard: Arc<Mutex<()>>,
    /// Observed by status checks; only `reload` writes it.
    reloading: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the reload finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SharedCatalog {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let issued = catalog.generation();
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            issued: Arc::new(AtomicU64::new(issued)),
            reload_guard: Arc::new(Mutex::new(())),
            reloading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Issues the next load ticket.
    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().await
    }

    /// Commits a freshly built catalog under `ticket`.
    pub async fn commit(&self, ticket: LoadTicket, fresh: Catalog) -> LoadOutcome {
        self.catalog.write().await.commit(ticket, fresh)
    }

    /// Fetches `source` and commits the result, keeping the current list on
    /// failure.
    pub async fn load(&self, client: &SourceClient, source: &Source) -> LoadOutcome {
        let ticket = self.ticket();
        tracing::info!(%source, ticket = ticket.0, "loading businesses");
        match client.fetch(source).await {
            Ok(payload) => self.commit(ticket, Catalog::from_payload(payload)).await,
            Err(e) => {
                tracing::error!(%source, error = %e, "failed to load businesses; keeping previous list");
                LoadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Like [`SharedCatalog::load`], but rejects the request while another
    /// reload is still running.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ReloadInProgress`] if a reload holds the guard.
    pub async fn reload(
        &self,
        client: &SourceClient,
        source: &Source,
    ) -> Result<LoadOutcome, CatalogError> {
        let Ok(_guard) = self.reload_guard.try_lock() else {
            tracing::warn!(%source, "reload requested while another is in flight");
            return Err(CatalogError::ReloadInProgress);
        };
        self.reloading.store(true, Ordering::SeqCst);
        let _in_flight = InFlight(&self.reloading);
        Ok(self.load(client, source).await)
    }

    /// Whether a reload is currently running. Never touches the reload guard.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reloading.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn batch(names: &[&str]) -> Catalog {
        Catalog::from_records(
            names
                .iter()
                .map(|n| json!({"name": n, "business_type": "cafe"}))
                .collect(),
        )
    }

    #[tokio::test]
    async fn later_commit_wins_over_slow_earlier_load() {
        let shared = SharedCatalog::new(Catalog::default());
        let slow = shared.ticket();
        let fast = shared.ticket();

        let applied = shared.commit(fast, batch(&["Fresh"])).await;
        assert_eq!(
            applied,
            LoadOutcome::Applied {
                generation: 2,
                records: 1
            }
        );

        let dropped = shared.commit(slow, batch(&["Stale", "Stale"])).await;
        assert_eq!(dropped, LoadOutcome::Superseded { generation: 2 });

        let catalog = shared.read().await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].raw()["name"], "Fresh");
    }

    #[tokio::test]
    async fn in_order_commits_replace_wholesale() {
        let shared = SharedCatalog::new(Catalog::default());
        let first = shared.ticket();
        shared.commit(first, batch(&["A", "B", "C"])).await;
        let second = shared.ticket();
        shared.commit(second, batch(&["D"])).await;

        let catalog = shared.read().await;
        assert_eq!(catalog.generation(), 2);
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn reload_is_rejected_while_guard_is_held() {
        let shared = SharedCatalog::new(Catalog::default());
        let client = SourceClient::new(5, "bizdash-test/0.1", 0, 0).expect("client");
        let source = Source::parse("/nonexistent/businesses.json");

        let held = shared.reload_guard.lock().await;
        let result = shared.reload(&client, &source).await;
        assert_eq!(result, Err(CatalogError::ReloadInProgress));
        drop(held);

        let result = shared.reload(&client, &source).await;
        assert!(matches!(result, Ok(LoadOutcome::Failed { .. })));
        assert!(!shared.is_reloading());
    }

    #[tokio::test]
    async fn status_checks_during_reload_do_not_cause_conflicts() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"name": "Cafe A", "business_type": "cafe"}]))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let shared = SharedCatalog::new(Catalog::default());
        let client = SourceClient::new(5, "bizdash-test/0.1", 0, 0).expect("client");
        let source = Source::parse(&format!("{}/businesses", server.uri()));

        let reloader = shared.clone();
        let task = tokio::spawn(async move { reloader.reload(&client, &source).await });

        let mut observed = false;
        for _ in 0..200 {
            observed |= shared.is_reloading();
            tokio::task::yield_now().await;
        }
        for _ in 0..50 {
            if observed {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            observed = shared.is_reloading();
        }

        let result = task.await.expect("reload task");
        assert!(observed, "reload in flight should be visible to status checks");
        assert!(matches!(result, Ok(LoadOutcome::Applied { records: 1, .. })));
        assert!(!shared.is_reloading());
    }
}
