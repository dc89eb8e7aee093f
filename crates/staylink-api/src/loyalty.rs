// Guest loyalty endpoint (read-only; accrual and redemption are server-side)

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::models::MembershipRecord;

impl MarketplaceClient {
    /// `GET /guest/loyalty/membership`
    pub async fn loyalty_membership(&self) -> Result<MembershipRecord, Error> {
        debug!("fetching loyalty membership");
        self.get("guest/loyalty/membership").await
    }
}
