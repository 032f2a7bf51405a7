//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        checkpoints::CheckpointsRepository,
        crossings::{CrossingCoordinator, CrossingsRepository, CrossingsService},
        passes::{PassLifecycleService, PassesRepository, PassesService},
        sweep::{PassSweeper, SweepService},
    },
    store::PgStore,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub passes: Arc<dyn PassesService>,
    pub crossings: Arc<dyn CrossingsService>,
    pub sweeper: Arc<dyn SweepService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_store(Arc::new(PgStore::new(Db::new(pool)))))
    }

    /// Context over any store implementing every repository, e.g. a
    /// [`MemoryStore`](crate::store::MemoryStore).
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: Store + 'static,
    {
        Self {
            passes: Arc::new(PassLifecycleService::new(store.clone(), store.clone())),
            crossings: Arc::new(CrossingCoordinator::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            sweeper: Arc::new(PassSweeper::new(store.clone(), store)),
        }
    }
}

/// Backs every repository.
pub trait Store: PassesRepository + CrossingsRepository + CheckpointsRepository {}

impl<S> Store for S where S: PassesRepository + CrossingsRepository + CheckpointsRepository {}
