use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::watch;

use crate::{
    model::{Candidate, Detail, Enrichment},
    provider::{ForecastProvider, ProviderError},
    store::SelectionStore,
};

/// Message shown when a provider call fails. One generic signal; the
/// provider exposes no error taxonomy worth distinguishing.
pub const FETCH_ERROR: &str = "Could not fetch weather data";

/// Message shown when persisting the selection fails.
pub const SAVE_ERROR: &str = "Could not save selected city";

/// Coordinates the search-and-enrich flow and the persisted selection.
///
/// Owns the four observable fields the presentation layer renders, each one
/// a `watch` channel: subscribers see every published value, and a snapshot
/// is always available. Operations publish into the channels and never
/// return errors to the caller; failures surface through `error_message`.
pub struct Orchestrator {
    provider: Arc<dyn ForecastProvider>,
    store: Arc<dyn SelectionStore>,
    candidates: watch::Sender<Vec<Candidate>>,
    selected: watch::Sender<Option<Detail>>,
    error_message: watch::Sender<Option<String>>,
    is_loading: watch::Sender<bool>,
    /// Monotonic sequence for `search` calls. A call that is no longer the
    /// latest publishes nothing, so overlapping searches cannot leave a
    /// stale list on screen.
    search_seq: AtomicU64,
}

impl Orchestrator {
    /// Build the orchestrator and run the startup restore: if a city name
    /// survived the last run, fetch its full detail and pre-select it.
    ///
    /// A failed restore is silent and leaves the persisted name in place,
    /// so the next launch retries it. Only an explicit deselect clears it.
    pub async fn new(provider: Arc<dyn ForecastProvider>, store: Arc<dyn SelectionStore>) -> Self {
        let orchestrator = Self {
            provider,
            store,
            candidates: watch::Sender::new(Vec::new()),
            selected: watch::Sender::new(None),
            error_message: watch::Sender::new(None),
            is_loading: watch::Sender::new(false),
            search_seq: AtomicU64::new(0),
        };

        orchestrator.restore_selection().await;
        orchestrator
    }

    async fn restore_selection(&self) {
        let saved = match self.store.read().await {
            Ok(saved) => saved,
            Err(err) => {
                warn!("failed to read persisted selection: {err:#}");
                return;
            }
        };

        let Some(name) = saved else { return };

        match self.provider.detail(&name).await {
            Ok(detail) => {
                debug!("restored selection: {name}");
                self.selected.send_replace(Some(detail));
            }
            Err(err) => {
                // Transient restore failure; keep the name for next launch.
                warn!("failed to restore selection {name:?}: {err:#}");
            }
        }
    }

    /// Search for cities and enrich every hit with live temperature.
    ///
    /// The lookup call is fail-fast: on failure the error message is set
    /// and the previously displayed list is preserved. Enrichment failures
    /// are non-fatal; the affected row is published with its enrichment
    /// still `Pending`. The published list keeps the lookup's ordering.
    pub async fn search(&self, query: &str) {
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.is_loading.send_replace(true);

        let outcome = self.lookup_and_enrich(query).await;

        // Superseded by a newer search: drop everything, including the
        // loading transition, which now belongs to the newer call.
        if self.search_seq.load(Ordering::SeqCst) != seq {
            debug!("search {seq} superseded, discarding results");
            return;
        }

        match outcome {
            Ok(list) => {
                self.candidates.send_replace(list);
            }
            Err(err) => {
                warn!("city lookup failed: {err:#}");
                self.error_message.send_replace(Some(FETCH_ERROR.to_string()));
            }
        }

        self.is_loading.send_replace(false);
    }

    async fn lookup_and_enrich(&self, query: &str) -> Result<Vec<Candidate>, ProviderError> {
        let candidates = self.provider.lookup(query).await?;

        // One detail call per candidate, concurrently. join_all keeps the
        // lookup order no matter which call finishes first.
        let enriched = join_all(candidates.into_iter().map(|c| self.enrich(c))).await;
        Ok(enriched)
    }

    async fn enrich(&self, mut candidate: Candidate) -> Candidate {
        match self.provider.detail(&candidate.coordinates()).await {
            Ok(detail) => {
                candidate.enrichment = Enrichment::Ready { temp_c: detail.temp_c, icon: detail.icon };
            }
            Err(err) => {
                debug!("enrichment failed for {}: {err:#}", candidate.name);
            }
        }
        candidate
    }

    /// Pin a candidate as the selected city, or deselect with `None`.
    ///
    /// Selecting synthesizes the detail from the candidate's known fields
    /// without a network call, and writes the name to the store in the same
    /// operation. The in-memory selection reflects the user's choice even
    /// when the store write fails; the failure is surfaced as an error.
    pub async fn select(&self, candidate: Option<&Candidate>) {
        let outcome = match candidate {
            Some(candidate) => {
                self.selected.send_replace(Some(Detail::from_candidate(candidate)));
                self.store.write(&candidate.name).await
            }
            None => {
                self.selected.send_replace(None);
                self.store.clear().await
            }
        };

        if let Err(err) = outcome {
            warn!("failed to persist selection: {err:#}");
            self.error_message.send_replace(Some(SAVE_ERROR.to_string()));
        }
    }

    /// Acknowledge the current error. Idempotent.
    pub fn clear_error(&self) {
        self.error_message.send_replace(None);
    }

    // Snapshots of the observable state.

    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates.borrow().clone()
    }

    pub fn selected(&self) -> Option<Detail> {
        self.selected.borrow().clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_message.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.is_loading.borrow()
    }

    // Subscriptions for push-style consumers.

    pub fn watch_candidates(&self) -> watch::Receiver<Vec<Candidate>> {
        self.candidates.subscribe()
    }

    pub fn watch_selected(&self) -> watch::Receiver<Option<Detail>> {
        self.selected.subscribe()
    }

    pub fn watch_error_message(&self) -> watch::Receiver<Option<String>> {
        self.error_message.subscribe()
    }

    pub fn watch_is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }
}
