// Housekeeping service CRUD endpoints

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::models::HousekeepingServiceRecord;

const BASE: &str = "service/housekeeping-services";

impl MarketplaceClient {
    /// `GET /service/housekeeping-services`
    pub async fn list_housekeeping_services(
        &self,
    ) -> Result<Vec<HousekeepingServiceRecord>, Error> {
        debug!("listing housekeeping services");
        self.get(BASE).await
    }

    /// `GET /service/housekeeping-services/{id}`
    pub async fn get_housekeeping_service(
        &self,
        id: &str,
    ) -> Result<HousekeepingServiceRecord, Error> {
        debug!(id, "fetching housekeeping service");
        self.get(&format!("{BASE}/{id}")).await
    }

    /// `POST /service/housekeeping-services`
    pub async fn create_housekeeping_service(
        &self,
        service: &HousekeepingServiceRecord,
    ) -> Result<HousekeepingServiceRecord, Error> {
        debug!(name = %service.name, "creating housekeeping service");
        self.post(BASE, service).await
    }

    /// `PUT /service/housekeeping-services/{id}`
    pub async fn update_housekeeping_service(
        &self,
        id: &str,
        service: &HousekeepingServiceRecord,
    ) -> Result<HousekeepingServiceRecord, Error> {
        debug!(id, "updating housekeeping service");
        self.put(&format!("{BASE}/{id}"), service).await
    }

    /// `DELETE /service/housekeeping-services/{id}`
    pub async fn delete_housekeeping_service(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting housekeeping service");
        self.delete(&format!("{BASE}/{id}")).await
    }
}
