use crate::error::Result;
use crate::models::Status;
use crate::store::ServiceStore;

use super::Engine;

impl Engine {
    pub async fn status(&self) -> Result<Status> {
        Ok(self.store.status().await?)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("All forum data cleared");
        Ok(())
    }
}
