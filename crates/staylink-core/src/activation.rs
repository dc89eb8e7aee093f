// ── Category activation state ──
//
// Per-provider set of activated categories, toggled against the backend
// with a local fallback when the backend cannot be reached. One manager
// owns one provider's state; every toggle marks its key busy for the
// duration of the request so a second toggle of the same key is a no-op.
// Different keys never block each other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{CategoryCatalog, CategoryScope, ServiceCategory};
use crate::error::CoreError;
use crate::gateway::{ApiResult, CategoryGateway};

/// Default deadline for a single activate/deactivate round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ── State types ──────────────────────────────────────────────────

/// Where a category's activation state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActivationOrigin {
    /// Confirmed by the backend.
    Server,
    /// Changed locally while offline; not yet recorded by the backend.
    LocalPending,
}

/// Per-key lifecycle. `Activating` and `Deactivating` block further toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "lowercase")]
pub enum ActivationPhase {
    Inactive,
    Activating,
    Active,
    Deactivating,
}

impl ActivationPhase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Activating | Self::Deactivating)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCategory {
    pub key: String,
    pub origin: ActivationOrigin,
}

/// Point-in-time view of one provider's activation state.
///
/// Serializable so a one-shot consumer (the CLI) can persist offline
/// changes between runs; `in_flight` is runtime-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSnapshot {
    /// Active categories in catalog order.
    pub active: Vec<ActiveCategory>,
    /// Server-confirmed categories deactivated locally while offline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_removals: Vec<String>,
    #[serde(skip)]
    pub in_flight: BTreeMap<String, ActivationPhase>,
}

impl ActivationSnapshot {
    pub fn active_keys(&self) -> Vec<&str> {
        self.active.iter().map(|a| a.key.as_str()).collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending_removals.is_empty()
            || self
                .active
                .iter()
                .any(|a| a.origin == ActivationOrigin::LocalPending)
    }
}

/// Activation state for every provider seen so far, keyed by provider id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationLedger {
    #[serde(default)]
    pub providers: BTreeMap<String, ActivationSnapshot>,
}

impl ActivationLedger {
    /// State for `provider_id`; an empty set the first time a provider is seen.
    pub fn provider(&mut self, provider_id: &str) -> &mut ActivationSnapshot {
        self.providers.entry(provider_id.to_owned()).or_default()
    }

    pub fn record(&mut self, provider_id: &str, snapshot: ActivationSnapshot) {
        self.providers.insert(provider_id.to_owned(), snapshot);
    }
}

// ── Outcomes ─────────────────────────────────────────────────────

/// Result of a toggle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The backend recorded the change.
    Confirmed { key: String, message: String },
    /// The backend was unreachable; the change was applied locally only.
    Offline { key: String, message: String },
    /// A request for this key is already in flight; nothing was done.
    Busy { key: String },
}

impl ActivationOutcome {
    pub fn key(&self) -> &str {
        match self {
            Self::Confirmed { key, .. } | Self::Offline { key, .. } | Self::Busy { key } => key,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Confirmed { message, .. } | Self::Offline { message, .. } => message.clone(),
            Self::Busy { key } => format!("A change to '{key}' is already in progress"),
        }
    }
}

/// What a [`ActivationManager::reconcile`] pass achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Local changes the backend has now recorded.
    pub synced: Vec<String>,
    /// Local changes the backend refused (403); reverted locally.
    pub reverted: Vec<String>,
    /// Local changes still waiting for the backend.
    pub still_pending: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Activate,
    Deactivate,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Self::Activate => "activated",
            Self::Deactivate => "deactivated",
        }
    }

    fn phase(self) -> ActivationPhase {
        match self {
            Self::Activate => ActivationPhase::Activating,
            Self::Deactivate => ActivationPhase::Deactivating,
        }
    }
}

// ── Busy marker ──────────────────────────────────────────────────

/// Holds a key's in-flight marker; releasing it on drop covers success,
/// error, timeout, cancellation and unwinding alike.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, ActivationPhase>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

// ── Manager ──────────────────────────────────────────────────────

/// Owns one provider's activation state and mediates every change to it.
pub struct ActivationManager<G> {
    gateway: G,
    provider_id: String,
    catalog: ArcSwap<CategoryCatalog>,
    active: DashMap<String, ActivationOrigin>,
    pending_removals: DashMap<String, ()>,
    in_flight: DashMap<String, ActivationPhase>,
    request_timeout: Duration,
    cancel: CancellationToken,
    snapshot: watch::Sender<ActivationSnapshot>,
}

impl<G: CategoryGateway> ActivationManager<G> {
    pub fn new(gateway: G, provider_id: impl Into<String>, catalog: CategoryCatalog) -> Self {
        let (snapshot, _) = watch::channel(ActivationSnapshot::default());
        Self {
            gateway,
            provider_id: provider_id.into(),
            catalog: ArcSwap::from_pointee(catalog),
            active: DashMap::new(),
            pending_removals: DashMap::new(),
            in_flight: DashMap::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cancel: CancellationToken::new(),
            snapshot,
        }
    }

    /// Deadline after which an unanswered request is abandoned.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Tie in-flight requests to an outer lifetime (e.g. the owning view).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn catalog(&self) -> Arc<CategoryCatalog> {
        self.catalog.load_full()
    }

    /// Abandon every in-flight request.
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn phase(&self, key: &str) -> ActivationPhase {
        if let Some(phase) = self.in_flight.get(key) {
            return *phase;
        }
        if self.active.contains_key(key) {
            ActivationPhase::Active
        } else {
            ActivationPhase::Inactive
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }

    pub fn origin(&self, key: &str) -> Option<ActivationOrigin> {
        self.active.get(key).map(|o| *o)
    }

    /// Whether a view should enable the toggle control for `key`.
    ///
    /// A coming-soon category cannot be switched on, but one the backend
    /// already reports active can still be switched off.
    pub fn can_toggle(&self, key: &str) -> bool {
        self.catalog.load().get(key).is_some_and(|category| {
            category.is_activatable() || self.active.contains_key(key)
        }) && !self.phase(key).is_busy()
    }

    pub fn active_keys(&self) -> Vec<String> {
        self.snapshot_now()
            .active
            .into_iter()
            .map(|a| a.key)
            .collect()
    }

    pub fn snapshot(&self) -> ActivationSnapshot {
        self.snapshot_now()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActivationSnapshot> {
        self.snapshot.subscribe()
    }

    // ── Persistence ──────────────────────────────────────────────

    /// Replace local state with a previously exported snapshot.
    pub fn restore(&self, snapshot: &ActivationSnapshot) {
        self.active.clear();
        self.pending_removals.clear();
        for entry in &snapshot.active {
            self.active.insert(entry.key.clone(), entry.origin);
        }
        for key in &snapshot.pending_removals {
            self.pending_removals.insert(key.clone(), ());
        }
        self.publish();
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Refresh catalog and active set from `GET /service/categories`.
    ///
    /// Server state replaces server-origin entries; local pending changes
    /// are kept on top of it until [`reconcile`](Self::reconcile) syncs them.
    /// Returns the server's message, if any.
    pub async fn load(&self) -> Result<Option<String>, CoreError> {
        let listing = self.bounded("categories", self.gateway.list_categories()).await?;

        if !listing.available_categories.is_empty() {
            let merged = self.catalog.load().merged_with(&listing.available_categories);
            self.catalog.store(Arc::new(merged));
        }

        let served: BTreeSet<String> = listing
            .active_categories
            .iter()
            .map(|c| c.key().to_owned())
            .collect();
        self.apply_served_state(&served, |_| true);

        info!(
            provider = %self.provider_id,
            active = served.len(),
            "loaded category activation state"
        );
        Ok(listing.message)
    }

    /// Refresh inside-hotel categories from `GET /service/inside-services`.
    pub async fn load_inside_services(&self) -> Result<(), CoreError> {
        let services = self
            .bounded("inside-services", self.gateway.list_inside_services())
            .await?;

        let catalog = self.catalog.load_full();
        let served: BTreeSet<String> = services
            .iter()
            .filter(|s| s.is_active && catalog.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();
        self.apply_served_state(&served, |key| {
            catalog
                .get(key)
                .is_some_and(|c| c.scope == CategoryScope::InsideHotel)
        });
        debug!(active = served.len(), "loaded inside-hotel services");
        Ok(())
    }

    /// Apply the backend's view of which keys (within `in_scope`) are active.
    fn apply_served_state(&self, served: &BTreeSet<String>, in_scope: impl Fn(&str) -> bool) {
        self.active.retain(|key, origin| {
            !in_scope(key.as_str()) || *origin == ActivationOrigin::LocalPending || served.contains(key)
        });
        // The backend agreeing on a removal settles it.
        self.pending_removals
            .retain(|key, _| !in_scope(key.as_str()) || served.contains(key));
        for key in served {
            if self.pending_removals.contains_key(key) {
                continue;
            }
            self.active.insert(key.clone(), ActivationOrigin::Server);
        }
        self.publish();
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Activate `key` for this provider.
    ///
    /// 403 leaves state untouched and returns [`CoreError::Forbidden`].
    /// An unreachable backend (no network, 404, timeout) activates locally
    /// and returns [`ActivationOutcome::Offline`]. A key already in flight
    /// returns [`ActivationOutcome::Busy`] without doing anything.
    pub async fn activate(&self, key: &str) -> Result<ActivationOutcome, CoreError> {
        self.transition(key, Direction::Activate).await
    }

    /// Deactivate `key`; symmetric to [`activate`](Self::activate).
    pub async fn deactivate(&self, key: &str) -> Result<ActivationOutcome, CoreError> {
        self.transition(key, Direction::Deactivate).await
    }

    /// Flip `key` to the opposite of its current state.
    pub async fn toggle(&self, key: &str) -> Result<ActivationOutcome, CoreError> {
        if self.is_active(key) {
            self.deactivate(key).await
        } else {
            self.activate(key).await
        }
    }

    async fn transition(&self, key: &str, direction: Direction) -> Result<ActivationOutcome, CoreError> {
        let category = self
            .catalog
            .load()
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::UnknownCategory { key: key.into() })?;

        // Deactivation stays open so a served coming-soon entry can be cleared.
        if direction == Direction::Activate && category.coming_soon {
            return Err(CoreError::ComingSoon { key: key.into() });
        }

        let Some(guard) = self.try_mark_busy(key, direction.phase()) else {
            debug!(key, "toggle ignored; request already in flight");
            return Ok(ActivationOutcome::Busy { key: key.into() });
        };

        let currently_active = self.active.contains_key(key);
        let expected_active = direction == Direction::Deactivate;
        if currently_active != expected_active {
            drop(guard);
            return Err(CoreError::InvalidTransition {
                key: key.into(),
                action: direction.verb(),
                phase: self.phase(key),
            });
        }
        self.publish();

        let call = async {
            match direction {
                Direction::Activate => self.gateway.activate(key).await,
                Direction::Deactivate => self.gateway.deactivate(key).await,
            }
        };
        let result = self.bounded_raw(call).await;

        let outcome = match result {
            Err(Interrupted::Cancelled) => {
                drop(guard);
                self.publish();
                return Err(CoreError::Cancelled { key: key.into() });
            }
            Ok(Ok(server_message)) => {
                self.apply_confirmed(key, direction);
                info!(provider = %self.provider_id, key, "category {}", direction.past());
                Ok(ActivationOutcome::Confirmed {
                    key: key.into(),
                    message: server_message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| format!("{} {} successfully", category.name, direction.past())),
                })
            }
            Ok(Err(e)) => self.handle_failure(&category, direction, e),
        };

        drop(guard);
        self.publish();
        outcome
    }

    fn handle_failure(
        &self,
        category: &ServiceCategory,
        direction: Direction,
        err: staylink_api::Error,
    ) -> Result<ActivationOutcome, CoreError> {
        let key = category.key.as_str();
        if err.is_forbidden() {
            warn!(key, "backend refused category {}", direction.verb());
            return Err(CoreError::Forbidden {
                message: format!(
                    "You are not authorized to {} {}. Please contact your hotel admin.",
                    direction.verb(),
                    category.name
                ),
            });
        }
        if err.is_unreachable() {
            warn!(key, error = %err, "backend unreachable; applying change locally");
            self.apply_local(key, direction);
            return Ok(ActivationOutcome::Offline {
                key: key.into(),
                message: format!("{} {} locally (offline mode)", category.name, direction.past()),
            });
        }
        Err(CoreError::from(err))
    }

    fn apply_confirmed(&self, key: &str, direction: Direction) {
        self.pending_removals.remove(key);
        match direction {
            Direction::Activate => {
                self.active.insert(key.to_owned(), ActivationOrigin::Server);
            }
            Direction::Deactivate => {
                self.active.remove(key);
            }
        }
    }

    fn apply_local(&self, key: &str, direction: Direction) {
        match direction {
            Direction::Activate => {
                // Re-activating something whose removal never reached the
                // backend just cancels that removal.
                let origin = if self.pending_removals.remove(key).is_some() {
                    ActivationOrigin::Server
                } else {
                    ActivationOrigin::LocalPending
                };
                self.active.insert(key.to_owned(), origin);
            }
            Direction::Deactivate => {
                if let Some((_, ActivationOrigin::Server)) = self.active.remove(key) {
                    self.pending_removals.insert(key.to_owned(), ());
                }
            }
        }
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Replay every local-only change against the backend.
    ///
    /// Accepted changes become server-confirmed, refused ones (403) are
    /// reverted, and anything that still cannot reach the backend stays
    /// pending. Keys busy with another request are left for the next pass.
    pub async fn reconcile(&self) -> ReconcileReport {
        let pending_adds: Vec<String> = self
            .active
            .iter()
            .filter(|e| *e.value() == ActivationOrigin::LocalPending)
            .map(|e| e.key().clone())
            .collect();
        let pending_removes: Vec<String> =
            self.pending_removals.iter().map(|e| e.key().clone()).collect();

        let jobs = pending_adds
            .into_iter()
            .map(|k| (k, Direction::Activate))
            .chain(pending_removes.into_iter().map(|k| (k, Direction::Deactivate)));

        let results = join_all(jobs.map(|(key, direction)| self.replay(key, direction))).await;

        let mut report = ReconcileReport::default();
        for (key, result) in results {
            match result {
                ReplayResult::Synced => report.synced.push(key),
                ReplayResult::Reverted => report.reverted.push(key),
                ReplayResult::Pending => report.still_pending.push(key),
            }
        }
        self.publish();

        info!(
            provider = %self.provider_id,
            synced = report.synced.len(),
            reverted = report.reverted.len(),
            pending = report.still_pending.len(),
            "reconciled local activation changes"
        );
        report
    }

    async fn replay(&self, key: String, direction: Direction) -> (String, ReplayResult) {
        let Some(guard) = self.try_mark_busy(&key, direction.phase()) else {
            return (key, ReplayResult::Pending);
        };

        let call = async {
            match direction {
                Direction::Activate => self.gateway.activate(&key).await,
                Direction::Deactivate => self.gateway.deactivate(&key).await,
            }
        };
        let result = match self.bounded_raw(call).await {
            Ok(Ok(_)) => {
                self.apply_confirmed(&key, direction);
                ReplayResult::Synced
            }
            Ok(Err(e)) if e.is_forbidden() => {
                // Undo the local change: the backend's state stands.
                match direction {
                    Direction::Activate => {
                        self.active.remove(&key);
                    }
                    Direction::Deactivate => {
                        self.pending_removals.remove(&key);
                        self.active.insert(key.clone(), ActivationOrigin::Server);
                    }
                }
                ReplayResult::Reverted
            }
            Ok(Err(e)) => {
                debug!(key = %key, error = %e, "replay failed; keeping local change");
                ReplayResult::Pending
            }
            Err(_) => ReplayResult::Pending,
        };
        drop(guard);
        (key, result)
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn try_mark_busy(&self, key: &str, phase: ActivationPhase) -> Option<InFlightGuard<'_>> {
        match self.in_flight.entry(key.to_owned()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(phase);
                Some(InFlightGuard {
                    in_flight: &self.in_flight,
                    key: key.to_owned(),
                })
            }
        }
    }

    /// Run a backend call under the request deadline and the cancellation
    /// token. A deadline miss is reported as a transport timeout.
    async fn bounded_raw<T>(
        &self,
        call: impl Future<Output = ApiResult<T>>,
    ) -> Result<ApiResult<T>, Interrupted> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            res = tokio::time::timeout(self.request_timeout, call) => Ok(res.unwrap_or_else(|_| {
                Err(staylink_api::Error::Timeout {
                    timeout_secs: self.request_timeout.as_secs(),
                })
            })),
        }
    }

    async fn bounded<T>(
        &self,
        what: &str,
        call: impl Future<Output = ApiResult<T>>,
    ) -> Result<T, CoreError> {
        match self.bounded_raw(call).await {
            Ok(res) => res.map_err(CoreError::from),
            Err(Interrupted::Cancelled) => Err(CoreError::Cancelled { key: what.into() }),
        }
    }

    fn snapshot_now(&self) -> ActivationSnapshot {
        let catalog = self.catalog.load();
        let mut active: Vec<ActiveCategory> = self
            .active
            .iter()
            .map(|e| ActiveCategory {
                key: e.key().clone(),
                origin: *e.value(),
            })
            .collect();
        active.sort_by(|a, b| {
            let pa = catalog.position(&a.key).unwrap_or(usize::MAX);
            let pb = catalog.position(&b.key).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.key.cmp(&b.key))
        });

        let mut pending_removals: Vec<String> =
            self.pending_removals.iter().map(|e| e.key().clone()).collect();
        pending_removals.sort();

        let in_flight = self
            .in_flight
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();

        ActivationSnapshot {
            active,
            pending_removals,
            in_flight,
        }
    }

    fn publish(&self) {
        let snap = self.snapshot_now();
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(snap);
    }
}

enum Interrupted {
    Cancelled,
}

enum ReplayResult {
    Synced,
    Reverted,
    Pending,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ledger_creates_empty_state_for_new_provider() {
        let mut ledger = ActivationLedger::default();
        assert!(ledger.provider("p-9").active.is_empty());
        assert!(ledger.providers.contains_key("p-9"));
    }

    #[test]
    fn snapshot_serializes_without_runtime_fields() {
        let mut snap = ActivationSnapshot {
            active: vec![ActiveCategory {
                key: "laundry".into(),
                origin: ActivationOrigin::LocalPending,
            }],
            ..Default::default()
        };
        snap.in_flight.insert("spa".into(), ActivationPhase::Activating);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "active": [{ "key": "laundry", "origin": "local-pending" }] })
        );
        assert!(snap.has_pending_changes());
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(ActivationPhase::Deactivating.to_string(), "deactivating");
        assert!(ActivationPhase::Activating.is_busy());
        assert!(!ActivationPhase::Active.is_busy());
    }
}
