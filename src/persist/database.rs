use super::SqlPersistence;
use crate::config::PersistConfig;
use crate::connection::{ConnectionFactory, SqlExecutor};
use crate::core::{PersistError, Result};
use crate::metadata::{Entity, EntityConfig, EntityRegistry};
use std::sync::Arc;

/// Entry point tying the host's connection factory and executor to entity metadata.
///
/// Cloning is cheap; clones share the factory, executor, configuration and registry.
///
/// # Examples
///
/// ```ignore
/// let db = Database::new(pool, executor, PersistConfig::default())?;
/// let orders = db.persistence::<Order>()?;
///
/// let mut order = Order::new(42, 99.50);
/// orders.insert(&mut order)?;        // order.id is now set
/// order.total = 150.0;
/// orders.save(&mut order)?;          // primary key present: UPDATE
/// ```
pub struct Database<F, X> {
    factory: Arc<F>,
    executor: Arc<X>,
    config: Arc<PersistConfig>,
    registry: Arc<EntityRegistry>,
}

impl<F, X> Database<F, X>
where
    F: ConnectionFactory,
    X: SqlExecutor<F::Connection>,
{
    pub fn new(factory: F, executor: X, config: PersistConfig) -> Result<Self> {
        Self::with_registry(factory, executor, config, Arc::new(EntityRegistry::new()))
    }

    /// Create a database sharing an existing entity registry
    pub fn with_registry(
        factory: F,
        executor: X,
        config: PersistConfig,
        registry: Arc<EntityRegistry>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|message| PersistError::configuration("PersistConfig", message))?;

        Ok(Self {
            factory: Arc::new(factory),
            executor: Arc::new(executor),
            config: Arc::new(config),
            registry,
        })
    }

    /// Persistence handle for `T`, resolving its configuration through the registry.
    pub fn persistence<T: Entity>(&self) -> Result<SqlPersistence<T, F, X>> {
        let entity = self.registry.resolve::<T>()?;
        Ok(SqlPersistence::new(self.clone(), entity))
    }

    /// Persistence handle for `T` using an explicitly supplied configuration.
    pub fn persistence_with<T: Send + Sync + 'static>(
        &self,
        entity: EntityConfig<T>,
    ) -> SqlPersistence<T, F, X> {
        SqlPersistence::new(self.clone(), Arc::new(entity))
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }
}

impl<F, X> Clone for Database<F, X> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            executor: Arc::clone(&self.executor),
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
        }
    }
}
