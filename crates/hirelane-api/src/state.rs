//! Application state.

use std::sync::Arc;

use hirelane_firestore::{ApplicationRepository, FirestoreClient, JobRepository, UserRepository};
use hirelane_storage::R2Client;

use crate::config::ApiConfig;
use crate::services::{CatalogService, DirectoryService, LedgerService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<R2Client>,
    pub directory: DirectoryService,
    pub catalog: CatalogService,
    pub ledger: LedgerService,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let firestore = FirestoreClient::from_env().await?;
        let storage = Arc::new(R2Client::from_env().await?);

        Ok(Self::with_clients(config, firestore, storage))
    }

    /// Wire up state over already-constructed clients. Tests use this to
    /// point the store at a mock server.
    pub fn with_clients(config: ApiConfig, firestore: FirestoreClient, storage: Arc<R2Client>) -> Self {
        let users = UserRepository::new(firestore.clone());
        let jobs = JobRepository::new(firestore.clone());
        let applications = ApplicationRepository::new(firestore);

        Self {
            config,
            storage,
            directory: DirectoryService::new(users.clone()),
            catalog: CatalogService::new(jobs.clone(), applications.clone(), users.clone()),
            ledger: LedgerService::new(applications, jobs, users),
        }
    }
}
