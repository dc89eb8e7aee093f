// Hotel markup settings endpoints

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::models::MarkupSettingRecord;

impl MarketplaceClient {
    /// Fetch all markup settings for the current hotel.
    ///
    /// `GET /hotel/markup-settings`
    pub async fn markup_settings(&self) -> Result<Vec<MarkupSettingRecord>, Error> {
        debug!("fetching markup settings");
        self.get("hotel/markup-settings").await
    }

    /// Replace all markup settings in one request.
    ///
    /// `POST /hotel/markup-settings` with the full array. The backend
    /// applies the batch atomically and echoes the stored settings.
    pub async fn save_markup_settings(
        &self,
        settings: &[MarkupSettingRecord],
    ) -> Result<Vec<MarkupSettingRecord>, Error> {
        debug!(count = settings.len(), "saving markup settings");
        let saved: Option<Vec<MarkupSettingRecord>> =
            self.post("hotel/markup-settings", &settings).await?;
        Ok(saved.unwrap_or_else(|| settings.to_vec()))
    }
}
