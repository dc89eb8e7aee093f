// ── Backend seams ──
//
// The activation and markup models talk to the backend through these
// traits so they can run against `MarketplaceClient` in production and
// against in-memory fakes in tests.

use std::future::Future;

use staylink_api::MarketplaceClient;
use staylink_api::models::{CategoryListing, InsideService, MarkupSettingRecord};

pub type ApiResult<T> = Result<T, staylink_api::Error>;

/// Remote authority for category activation.
pub trait CategoryGateway: Send + Sync {
    fn list_categories(&self) -> impl Future<Output = ApiResult<CategoryListing>> + Send;

    /// Returns the server's confirmation message, if it sent one.
    fn activate(&self, key: &str) -> impl Future<Output = ApiResult<Option<String>>> + Send;

    fn deactivate(&self, key: &str) -> impl Future<Output = ApiResult<Option<String>>> + Send;

    fn list_inside_services(&self) -> impl Future<Output = ApiResult<Vec<InsideService>>> + Send;
}

/// Bulk persistence for hotel markup settings.
pub trait MarkupGateway: Send + Sync {
    fn load(&self) -> impl Future<Output = ApiResult<Vec<MarkupSettingRecord>>> + Send;

    fn save_all(
        &self,
        settings: &[MarkupSettingRecord],
    ) -> impl Future<Output = ApiResult<Vec<MarkupSettingRecord>>> + Send;
}

impl CategoryGateway for MarketplaceClient {
    async fn list_categories(&self) -> ApiResult<CategoryListing> {
        MarketplaceClient::list_categories(self).await
    }

    async fn activate(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.activate_category(key).await?.message)
    }

    async fn deactivate(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.deactivate_category(key).await?.message)
    }

    async fn list_inside_services(&self) -> ApiResult<Vec<InsideService>> {
        MarketplaceClient::list_inside_services(self).await
    }
}

impl MarkupGateway for MarketplaceClient {
    async fn load(&self) -> ApiResult<Vec<MarkupSettingRecord>> {
        self.markup_settings().await
    }

    async fn save_all(&self, settings: &[MarkupSettingRecord]) -> ApiResult<Vec<MarkupSettingRecord>> {
        self.save_markup_settings(settings).await
    }
}

impl<G: CategoryGateway> CategoryGateway for std::sync::Arc<G> {
    fn list_categories(&self) -> impl Future<Output = ApiResult<CategoryListing>> + Send {
        (**self).list_categories()
    }

    fn activate(&self, key: &str) -> impl Future<Output = ApiResult<Option<String>>> + Send {
        (**self).activate(key)
    }

    fn deactivate(&self, key: &str) -> impl Future<Output = ApiResult<Option<String>>> + Send {
        (**self).deactivate(key)
    }

    fn list_inside_services(&self) -> impl Future<Output = ApiResult<Vec<InsideService>>> + Send {
        (**self).list_inside_services()
    }
}
