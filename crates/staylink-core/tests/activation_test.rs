#![allow(clippy::unwrap_used)]
// Activation state machine tests against an in-memory gateway.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use staylink_api::models::{CategoryListing, CategoryRef, InsideService, RemoteCategory};
use staylink_core::{
    ActivationManager, ActivationOrigin, ActivationOutcome, ActivationPhase, ApiResult,
    CategoryCatalog, CategoryGateway, CoreError,
};

// ── Fake backend ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Ok,
    Forbidden,
    Unreachable,
    ServerError,
    /// Wait for `release` before answering OK.
    Held,
    /// Never answer.
    Silent,
}

struct FakeGateway {
    replies: Mutex<HashMap<String, Reply>>,
    listing: Mutex<CategoryListing>,
    inside: Mutex<Vec<InsideService>>,
    calls: Mutex<Vec<String>>,
    release: Notify,
}

impl FakeGateway {
    fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            listing: Mutex::new(CategoryListing::default()),
            inside: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            release: Notify::new(),
        }
    }

    fn reply(&self, key: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(key.into(), reply);
    }

    fn serve_active(&self, keys: &[&str]) {
        self.listing.lock().unwrap().active_categories =
            keys.iter().map(|k| CategoryRef::Key((*k).into())).collect();
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, action: &str, key: &str) -> ApiResult<Option<String>> {
        self.calls.lock().unwrap().push(format!("{action} {key}"));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(Reply::Ok);
        match reply {
            Reply::Ok => Ok(None),
            Reply::Held => {
                self.release.notified().await;
                Ok(None)
            }
            Reply::Silent => std::future::pending().await,
            Reply::Forbidden => Err(staylink_api::Error::Forbidden {
                message: "nope".into(),
            }),
            Reply::Unreachable => Err(staylink_api::Error::NotFound {
                path: format!("/service/categories/{key}/{action}"),
                message: String::new(),
            }),
            Reply::ServerError => Err(staylink_api::Error::Server {
                status: 500,
                message: "boom".into(),
            }),
        }
    }
}

impl CategoryGateway for FakeGateway {
    async fn list_categories(&self) -> ApiResult<CategoryListing> {
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn activate(&self, key: &str) -> ApiResult<Option<String>> {
        self.answer("activate", key).await
    }

    async fn deactivate(&self, key: &str) -> ApiResult<Option<String>> {
        self.answer("deactivate", key).await
    }

    async fn list_inside_services(&self) -> ApiResult<Vec<InsideService>> {
        Ok(self.inside.lock().unwrap().clone())
    }
}

fn manager() -> ActivationManager<FakeGateway> {
    ActivationManager::new(FakeGateway::new(), "p-1", CategoryCatalog::builtin())
}

// ── Transitions ─────────────────────────────────────────────────────

#[tokio::test]
async fn confirmed_activation_is_server_origin() {
    let mgr = manager();

    let outcome = mgr.activate("laundry").await.unwrap();

    assert!(matches!(outcome, ActivationOutcome::Confirmed { .. }));
    assert_eq!(outcome.message(), "Laundry activated successfully");
    assert_eq!(mgr.phase("laundry"), ActivationPhase::Active);
    assert_eq!(mgr.origin("laundry"), Some(ActivationOrigin::Server));
}

#[tokio::test]
async fn forbidden_leaves_state_unchanged() {
    let mgr = manager();
    mgr.gateway().reply("tours", Reply::Forbidden);

    let err = mgr.activate("tours").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "You are not authorized to activate Tours & Activities. Please contact your hotel admin."
    );
    assert_eq!(mgr.phase("tours"), ActivationPhase::Inactive);
    assert!(mgr.can_toggle("tours"));
}

#[tokio::test]
async fn unreachable_backend_activates_locally() {
    let mgr = manager();
    mgr.gateway().reply("laundry", Reply::Unreachable);

    let outcome = mgr.activate("laundry").await.unwrap();

    assert_eq!(
        outcome,
        ActivationOutcome::Offline {
            key: "laundry".into(),
            message: "Laundry activated locally (offline mode)".into(),
        }
    );
    assert_eq!(mgr.origin("laundry"), Some(ActivationOrigin::LocalPending));
    assert!(mgr.snapshot().has_pending_changes());
}

#[tokio::test]
async fn server_error_surfaces_without_state_change() {
    let mgr = manager();
    mgr.gateway().reply("laundry", Reply::ServerError);

    let err = mgr.activate("laundry").await.unwrap_err();

    assert!(matches!(err, CoreError::Server { status: 500, .. }), "got: {err:?}");
    assert!(!mgr.is_active("laundry"));
}

#[tokio::test]
async fn coming_soon_and_unknown_keys_are_rejected() {
    let mgr = manager();

    assert!(matches!(
        mgr.activate("spa").await.unwrap_err(),
        CoreError::ComingSoon { .. }
    ));
    assert!(matches!(
        mgr.activate("karaoke").await.unwrap_err(),
        CoreError::UnknownCategory { .. }
    ));
    assert!(!mgr.can_toggle("spa"));
    assert!(mgr.gateway().calls().is_empty());
}

#[tokio::test]
async fn forbidden_deactivation_keeps_active() {
    let mgr = manager();
    mgr.gateway().serve_active(&["tours"]);
    mgr.load().await.unwrap();
    mgr.gateway().reply("tours", Reply::Forbidden);

    let err = mgr.deactivate("tours").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "You are not authorized to deactivate Tours & Activities. Please contact your hotel admin."
    );
    assert_eq!(mgr.phase("tours"), ActivationPhase::Active);
    assert_eq!(mgr.origin("tours"), Some(ActivationOrigin::Server));
    assert!(!mgr.snapshot().has_pending_changes());
}

#[tokio::test]
async fn unreachable_deactivation_records_pending_removal() {
    let mgr = manager();
    mgr.gateway().serve_active(&["laundry"]);
    mgr.load().await.unwrap();
    mgr.gateway().reply("laundry", Reply::Unreachable);

    let outcome = mgr.deactivate("laundry").await.unwrap();

    assert_eq!(
        outcome,
        ActivationOutcome::Offline {
            key: "laundry".into(),
            message: "Laundry deactivated locally (offline mode)".into(),
        }
    );
    assert_eq!(mgr.phase("laundry"), ActivationPhase::Inactive);
    assert_eq!(mgr.snapshot().pending_removals, vec!["laundry".to_string()]);

    // A later load that still serves the key does not resurrect it.
    mgr.load().await.unwrap();
    assert!(!mgr.is_active("laundry"));
}

#[tokio::test]
async fn served_coming_soon_category_can_still_be_deactivated() {
    let mgr = manager();
    mgr.gateway().serve_active(&["spa"]);
    mgr.load().await.unwrap();

    assert!(mgr.can_toggle("spa"));
    let outcome = mgr.deactivate("spa").await.unwrap();

    assert!(matches!(outcome, ActivationOutcome::Confirmed { .. }));
    assert!(!mgr.is_active("spa"));
    assert!(!mgr.can_toggle("spa"));
    assert_eq!(mgr.gateway().calls(), vec!["deactivate spa".to_string()]);
}

#[tokio::test]
async fn deactivating_inactive_key_is_invalid() {
    let mgr = manager();

    let err = mgr.deactivate("laundry").await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidTransition { .. }), "got: {err:?}");
    assert_eq!(mgr.phase("laundry"), ActivationPhase::Inactive);
}

#[tokio::test]
async fn second_toggle_of_busy_key_is_a_noop() {
    let mgr = manager();
    mgr.gateway().reply("laundry", Reply::Held);

    let (first, (second, other)) = tokio::join!(mgr.activate("laundry"), async {
        tokio::task::yield_now().await;
        assert_eq!(mgr.phase("laundry"), ActivationPhase::Activating);
        assert!(!mgr.can_toggle("laundry"));
        let second = mgr.activate("laundry").await;
        // A different key is never blocked.
        let other = mgr.activate("tours").await;
        mgr.gateway().release.notify_one();
        (second, other)
    });

    assert!(matches!(first.unwrap(), ActivationOutcome::Confirmed { .. }));
    assert_eq!(
        second.unwrap(),
        ActivationOutcome::Busy {
            key: "laundry".into()
        }
    );
    assert!(matches!(other.unwrap(), ActivationOutcome::Confirmed { .. }));
    assert_eq!(
        mgr.gateway().calls(),
        vec!["activate laundry".to_string(), "activate tours".to_string()]
    );
    assert!(mgr.snapshot().in_flight.is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_falls_back_to_offline() {
    let mgr = manager().with_request_timeout(Duration::from_secs(5));
    mgr.gateway().reply("laundry", Reply::Silent);

    let outcome = mgr.activate("laundry").await.unwrap();

    assert!(matches!(outcome, ActivationOutcome::Offline { .. }));
    assert_eq!(mgr.phase("laundry"), ActivationPhase::Active);
    assert_eq!(mgr.origin("laundry"), Some(ActivationOrigin::LocalPending));
    assert!(mgr.snapshot().in_flight.is_empty());
    assert!(mgr.can_toggle("laundry"));
}

#[tokio::test]
async fn cancellation_restores_previous_phase() {
    let token = CancellationToken::new();
    let mgr = manager().with_cancellation(token.clone());
    mgr.gateway().reply("laundry", Reply::Silent);

    let (result, ()) = tokio::join!(mgr.activate("laundry"), async {
        tokio::task::yield_now().await;
        token.cancel();
    });

    assert!(matches!(result.unwrap_err(), CoreError::Cancelled { .. }));
    assert_eq!(mgr.phase("laundry"), ActivationPhase::Inactive);
}

// ── Loading and reconciliation ──────────────────────────────────────

#[tokio::test]
async fn load_replaces_server_state_but_keeps_local_changes() {
    let mgr = manager();
    mgr.gateway().reply("transportation", Reply::Unreachable);
    mgr.activate("transportation").await.unwrap();
    mgr.gateway().serve_active(&["tours", "laundry"]);

    mgr.load().await.unwrap();

    // Catalog order, not server order.
    assert_eq!(mgr.active_keys(), vec!["laundry", "transportation", "tours"]);
    assert_eq!(mgr.origin("tours"), Some(ActivationOrigin::Server));
    assert_eq!(
        mgr.origin("transportation"),
        Some(ActivationOrigin::LocalPending)
    );
}

#[tokio::test]
async fn load_merges_served_catalog() {
    let mgr = manager();
    mgr.gateway()
        .listing
        .lock()
        .unwrap()
        .available_categories = vec![RemoteCategory {
        key: "spa".into(),
        name: None,
        description: None,
        coming_soon: false,
        sample_items: vec![],
    }];

    mgr.load().await.unwrap();

    assert!(mgr.can_toggle("spa"));
    assert!(mgr.activate("spa").await.is_ok());
}

#[tokio::test]
async fn inside_services_only_touch_inside_scope() {
    let mgr = manager();
    mgr.activate("laundry").await.unwrap();
    *mgr.gateway().inside.lock().unwrap() = vec![
        InsideService {
            id: "room-service".into(),
            is_active: true,
        },
        InsideService {
            id: "concierge-services".into(),
            is_active: false,
        },
    ];

    mgr.load_inside_services().await.unwrap();

    assert_eq!(mgr.active_keys(), vec!["laundry", "room-service"]);
}

#[tokio::test]
async fn reconcile_syncs_reverts_and_keeps_pending() {
    let mgr = manager();
    let gw = mgr.gateway();
    mgr.activate("concierge-services").await.unwrap();
    for key in ["laundry", "tours", "transportation"] {
        gw.reply(key, Reply::Unreachable);
        mgr.activate(key).await.unwrap();
    }
    gw.reply("concierge-services", Reply::Unreachable);
    mgr.deactivate("concierge-services").await.unwrap();
    assert_eq!(mgr.snapshot().pending_removals, vec!["concierge-services"]);

    gw.reply("laundry", Reply::Ok);
    gw.reply("tours", Reply::Forbidden);
    gw.reply("concierge-services", Reply::Ok);

    let mut report = mgr.reconcile().await;
    report.synced.sort();

    assert_eq!(report.synced, vec!["concierge-services", "laundry"]);
    assert_eq!(report.reverted, vec!["tours"]);
    assert_eq!(report.still_pending, vec!["transportation"]);
    assert_eq!(mgr.origin("laundry"), Some(ActivationOrigin::Server));
    assert!(!mgr.is_active("tours"));
    assert!(!mgr.is_active("concierge-services"));
    assert!(mgr.snapshot().pending_removals.is_empty());
}

#[tokio::test]
async fn restore_round_trips_through_snapshot() {
    let mgr = manager();
    mgr.gateway().reply("laundry", Reply::Unreachable);
    mgr.activate("laundry").await.unwrap();
    let exported = mgr.snapshot();

    let fresh = manager();
    fresh.restore(&exported);

    assert_eq!(fresh.snapshot(), exported);
    assert_eq!(fresh.origin("laundry"), Some(ActivationOrigin::LocalPending));
}

#[tokio::test]
async fn subscribers_see_published_snapshots() {
    let mgr = manager();
    let mut rx = mgr.subscribe();

    mgr.activate("tours").await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().active_keys(), vec!["tours"]);
}
