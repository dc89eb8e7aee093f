// Category activation endpoints
//
// `/service/categories` lists the catalog and the caller's active set;
// activation toggles are bodiless POSTs keyed by category.

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::models::{Acknowledgement, CategoryListing, InsideService, MessageResponse};

impl MarketplaceClient {
    /// List available and active categories for the current provider.
    ///
    /// `GET /service/categories`
    pub async fn list_categories(&self) -> Result<CategoryListing, Error> {
        debug!("listing service categories");
        self.get("service/categories").await
    }

    /// Activate a category for the current provider.
    ///
    /// `POST /service/categories/{key}/activate`
    pub async fn activate_category(&self, key: &str) -> Result<MessageResponse, Error> {
        debug!(key, "activating category");
        let ack: Option<Acknowledgement> = self
            .post_empty(&format!("service/categories/{key}/activate"))
            .await?;
        Ok(ack.unwrap_or_default().into_message())
    }

    /// Deactivate a category for the current provider.
    ///
    /// `POST /service/categories/{key}/deactivate`
    pub async fn deactivate_category(&self, key: &str) -> Result<MessageResponse, Error> {
        debug!(key, "deactivating category");
        let ack: Option<Acknowledgement> = self
            .post_empty(&format!("service/categories/{key}/deactivate"))
            .await?;
        Ok(ack.unwrap_or_default().into_message())
    }

    /// List inside-hotel services with their activation flag.
    ///
    /// `GET /service/inside-services`
    pub async fn list_inside_services(&self) -> Result<Vec<InsideService>, Error> {
        debug!("listing inside-hotel services");
        self.get("service/inside-services").await
    }
}
