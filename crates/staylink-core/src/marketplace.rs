// ── Marketplace facade ──
//
// Single entry point for views. Owns the HTTP client, the session and one
// activation manager per provider, and folds transport errors into
// `CoreError` at every boundary.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use staylink_api::models::HousekeepingServiceRecord;
use staylink_api::{MarketplaceClient, SessionSlot, TransportConfig};

use crate::activation::ActivationManager;
use crate::catalog::CategoryCatalog;
use crate::config::MarketplaceConfig;
use crate::error::CoreError;
use crate::housekeeping::HousekeepingService;
use crate::loyalty::{LoyaltyMembership, TierProgress, compute_progress, redeemable_value};
use crate::markup::MarkupEngine;
use crate::session::{Capability, SessionContext};

pub type CategoryManager = ActivationManager<MarketplaceClient>;

/// A guest's membership with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyOverview {
    pub membership: LoyaltyMembership,
    pub progress: TierProgress,
    /// Currency value of the redeemable points.
    pub redeemable_value: f64,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MarketplaceInner>`.
#[derive(Clone)]
pub struct Marketplace {
    inner: Arc<MarketplaceInner>,
}

struct MarketplaceInner {
    config: MarketplaceConfig,
    client: MarketplaceClient,
    session: SessionContext,
    catalog: CategoryCatalog,
    /// Provider id → activation state; created empty on first use.
    activations: DashMap<String, Arc<CategoryManager>>,
    cancel: CancellationToken,
}

impl Marketplace {
    pub fn new(config: MarketplaceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: (&config.tls).into(),
            ..TransportConfig::with_timeout(config.timeout)
        };
        let slot = SessionSlot::empty();
        if let Some(session) = config.session.clone() {
            slot.install(session);
        }
        let client = MarketplaceClient::new(config.api_url.as_str(), slot.clone(), &transport)?;
        debug!(url = %client.base_url(), "marketplace client ready");

        Ok(Self {
            inner: Arc::new(MarketplaceInner {
                config,
                client,
                session: SessionContext::new(slot),
                catalog: CategoryCatalog::builtin(),
                activations: DashMap::new(),
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn client(&self) -> &MarketplaceClient {
        &self.inner.client
    }

    /// Abandon every in-flight request.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    // ── Categories ───────────────────────────────────────────────

    /// Activation state for `provider_id`, created empty the first time.
    pub fn activations_for(&self, provider_id: &str) -> Arc<CategoryManager> {
        self.inner
            .activations
            .entry(provider_id.to_owned())
            .or_insert_with(|| {
                debug!(provider = provider_id, "tracking new provider");
                Arc::new(
                    ActivationManager::new(
                        self.inner.client.clone(),
                        provider_id,
                        self.inner.catalog.clone(),
                    )
                    .with_request_timeout(self.inner.config.request_timeout)
                    .with_cancellation(self.inner.cancel.child_token()),
                )
            })
            .clone()
    }

    /// Activation state for the logged-in provider.
    pub fn my_categories(&self) -> Result<Arc<CategoryManager>, CoreError> {
        self.inner.session.require(Capability::ManageCategories)?;
        let provider_id = self.inner.session.provider_id()?;
        Ok(self.activations_for(&provider_id))
    }

    // ── Markup ───────────────────────────────────────────────────

    pub async fn load_markup(&self) -> Result<MarkupEngine, CoreError> {
        self.inner.session.require(Capability::EditMarkup)?;
        MarkupEngine::load(&self.inner.client).await
    }

    pub async fn save_markup(&self, engine: &mut MarkupEngine) -> Result<(), CoreError> {
        self.inner.session.require(Capability::EditMarkup)?;
        engine.save_all(&self.inner.client).await
    }

    // ── Housekeeping ─────────────────────────────────────────────

    pub async fn list_housekeeping(&self) -> Result<Vec<HousekeepingService>, CoreError> {
        self.inner.session.require(Capability::ManageHousekeeping)?;
        let records = self.inner.client.list_housekeeping_services().await?;
        Ok(records.into_iter().map(HousekeepingService::from).collect())
    }

    pub async fn get_housekeeping(&self, id: &str) -> Result<HousekeepingService, CoreError> {
        self.inner.session.require(Capability::ManageHousekeeping)?;
        let record = self
            .inner
            .client
            .get_housekeeping_service(id)
            .await
            .map_err(|e| not_found_as_entity(e, id))?;
        Ok(record.into())
    }

    pub async fn create_housekeeping(
        &self,
        service: &HousekeepingService,
    ) -> Result<HousekeepingService, CoreError> {
        self.inner.session.require(Capability::ManageHousekeeping)?;
        service.validate()?;
        let created = self
            .inner
            .client
            .create_housekeeping_service(&HousekeepingServiceRecord::from(service))
            .await?;
        info!(name = %created.name, "housekeeping service created");
        Ok(created.into())
    }

    pub async fn update_housekeeping(
        &self,
        service: &HousekeepingService,
    ) -> Result<HousekeepingService, CoreError> {
        self.inner.session.require(Capability::ManageHousekeeping)?;
        service.validate()?;
        let id = service.id.as_deref().ok_or_else(|| CoreError::ValidationFailed {
            message: "cannot update a housekeeping service without an id".into(),
        })?;
        let updated = self
            .inner
            .client
            .update_housekeeping_service(id, &HousekeepingServiceRecord::from(service))
            .await
            .map_err(|e| not_found_as_entity(e, id))?;
        info!(id, "housekeeping service updated");
        Ok(updated.into())
    }

    pub async fn delete_housekeeping(&self, id: &str) -> Result<(), CoreError> {
        self.inner.session.require(Capability::ManageHousekeeping)?;
        self.inner
            .client
            .delete_housekeeping_service(id)
            .await
            .map_err(|e| not_found_as_entity(e, id))?;
        info!(id, "housekeeping service deleted");
        Ok(())
    }

    // ── Loyalty ──────────────────────────────────────────────────

    pub async fn loyalty(&self) -> Result<LoyaltyOverview, CoreError> {
        self.inner.session.require(Capability::ViewLoyalty)?;
        let record = self.inner.client.loyalty_membership().await?;
        let membership = LoyaltyMembership::try_from(record)?;
        Ok(LoyaltyOverview {
            progress: compute_progress(&membership, &self.inner.config.tier_thresholds),
            redeemable_value: redeemable_value(&membership, self.inner.config.points_ratio),
            membership,
        })
    }
}

/// A 404 on an id-addressed housekeeping route means the service is gone,
/// not that the backend is unreachable.
fn not_found_as_entity(err: staylink_api::Error, id: &str) -> CoreError {
    if matches!(err, staylink_api::Error::NotFound { .. }) {
        CoreError::NotFound {
            entity_type: "housekeeping service".into(),
            identifier: id.into(),
        }
    } else {
        err.into()
    }
}
