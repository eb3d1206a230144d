//! Document store (§4.D, §4.E) — a MongoDB-backed persistence layer, one sub-store per
//! aggregate, each owning its collection and atomic-update vocabulary.

mod background_job_store;
mod cache_folder_store;
mod collection_store;
mod error;
mod job_state_store;
mod system_settings_store;

pub use background_job_store::BackgroundJobStore;
pub use cache_folder_store::CacheFolderStore;
pub use collection_store::CollectionStore;
pub use error::StoreError;
pub use job_state_store::JobStateStore;
pub use system_settings_store::SystemSettingsStore;

use crate::config::StoreConfig;
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::time::Duration;

/// All aggregate stores, grounded in a single Mongo database connection.
#[derive(Clone)]
pub struct Store {
    pub job_states: JobStateStore,
    pub collections: CollectionStore,
    pub cache_folders: CacheFolderStore,
    pub system_settings: SystemSettingsStore,
    pub background_jobs: BackgroundJobStore,
    pub libraries: mongodb::Collection<crate::domain::Library>,
    database: mongodb::Database,
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.connection_string).await?;
        options.connect_timeout = Some(Duration::from_millis(config.connection_timeout_ms));
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.retry_writes = Some(config.retry_writes);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database_name);

        Ok(Self {
            job_states: JobStateStore::new(database.collection("job_states")),
            collections: CollectionStore::new(database.collection("collections")),
            cache_folders: CacheFolderStore::new(database.collection("cache_folders")),
            system_settings: SystemSettingsStore::new(database.collection("system_settings")),
            background_jobs: BackgroundJobStore::new(database.collection("background_jobs")),
            libraries: database.collection("libraries"),
            database,
        })
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        use bson::doc;
        use mongodb::IndexModel;

        let job_states: mongodb::Collection<bson::Document> = self.database.collection("job_states");
        job_states
            .create_index(IndexModel::builder().keys(doc! { "job_id": 1 }).build())
            .await?;
        job_states
            .create_index(IndexModel::builder().keys(doc! { "status": 1, "last_progress_at": 1 }).build())
            .await?;

        let collections: mongodb::Collection<bson::Document> = self.database.collection("collections");
        collections
            .create_index(IndexModel::builder().keys(doc! { "id": 1 }).build())
            .await?;

        let cache_folders: mongodb::Collection<bson::Document> = self.database.collection("cache_folders");
        cache_folders
            .create_index(IndexModel::builder().keys(doc! { "is_active": 1, "priority": 1 }).build())
            .await?;
        Ok(())
    }
}
