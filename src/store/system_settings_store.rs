//! Persists the single process-wide `system_settings` document (§3, §6).

use super::error::StoreError;
use crate::domain::SystemSettings;
use bson::doc;
use mongodb::Collection;

const DOCUMENT_KEY: &str = "_singleton";

#[derive(Clone)]
pub struct SystemSettingsStore {
    collection: Collection<bson::Document>,
}

impl SystemSettingsStore {
    pub fn new(collection: Collection<bson::Document>) -> Self {
        Self { collection }
    }

    pub async fn load(&self) -> Result<SystemSettings, StoreError> {
        let filter = doc! { "_id": DOCUMENT_KEY };
        match self.collection.find_one(filter).await? {
            Some(document) => {
                let values = document
                    .get_document("values")
                    .cloned()
                    .unwrap_or_default();
                Ok(SystemSettings {
                    values: bson::from_document(values)?,
                })
            }
            None => Ok(SystemSettings::defaults()),
        }
    }

    pub async fn save(&self, settings: &SystemSettings) -> Result<(), StoreError> {
        let filter = doc! { "_id": DOCUMENT_KEY };
        let update = doc! { "$set": { "values": bson::to_bson(&settings.values)? } };
        let options = mongodb::options::UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(filter, update)
            .with_options(options)
            .await?;
        Ok(())
    }

    /// Runs the legacy-key cleanup migration (§6, §10.4) and persists the result.
    pub async fn strip_legacy_keys(&self) -> Result<usize, StoreError> {
        let mut settings = self.load().await?;
        let removed = settings.strip_legacy_keys();
        if removed > 0 {
            self.save(&settings).await?;
        }
        Ok(removed)
    }
}
