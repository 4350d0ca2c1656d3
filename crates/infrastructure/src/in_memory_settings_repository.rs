use async_trait::async_trait;
use squadsync_application::{RawSyncSettings, SettingsRepository};
use squadsync_core::AppResult;
use tokio::sync::RwLock;

/// In-memory settings storage.
#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<RawSyncSettings>,
}

impl InMemorySettingsRepository {
    /// Creates a repository holding the given settings.
    #[must_use]
    pub fn new(settings: RawSyncSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load_raw_settings(&self) -> AppResult<RawSyncSettings> {
        Ok(self.settings.read().await.clone())
    }

    async fn save_raw_settings(&self, settings: RawSyncSettings) -> AppResult<()> {
        *self.settings.write().await = settings;
        Ok(())
    }
}
