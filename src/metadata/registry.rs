use super::{Entity, TableMetadata};
use crate::core::{PersistError, Result};
use crate::persist::Validator;
use crate::transform::{Identity, ValueTransformer};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{Level, event};

/// Everything an operation needs to know about one entity type.
///
/// Injected into persistence handles at construction time.
pub struct EntityConfig<T> {
    metadata: Arc<TableMetadata<T>>,
    transformer: Arc<dyn ValueTransformer<T>>,
    validator: Option<Arc<dyn Validator<T>>>,
}

impl<T: 'static> EntityConfig<T> {
    pub fn new(metadata: TableMetadata<T>) -> Self {
        Self {
            metadata: Arc::new(metadata),
            transformer: Arc::new(Identity),
            validator: None,
        }
    }

    pub fn from_entity() -> Result<Self>
    where
        T: Entity,
    {
        Ok(Self {
            metadata: Arc::new(T::table_metadata()?),
            transformer: T::value_transformer(),
            validator: T::validator(),
        })
    }

    pub fn with_transformer(mut self, transformer: impl ValueTransformer<T> + 'static) -> Self {
        self.transformer = Arc::new(transformer);
        self
    }

    pub fn with_validator(mut self, validator: impl Validator<T> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn metadata(&self) -> &TableMetadata<T> {
        &self.metadata
    }

    pub fn transformer(&self) -> &dyn ValueTransformer<T> {
        self.transformer.as_ref()
    }

    pub fn validator(&self) -> Option<&dyn Validator<T>> {
        self.validator.as_deref()
    }
}

impl<T> Clone for EntityConfig<T> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            transformer: Arc::clone(&self.transformer),
            validator: self.validator.clone(),
        }
    }
}

impl<T> fmt::Debug for EntityConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityConfig")
            .field("metadata", &self.metadata)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Type-keyed store of entity configurations.
///
/// Populated once per type (explicitly or on first `resolve`) and read when
/// persistence handles are created. Operations never touch the registry.
#[derive(Default)]
pub struct EntityRegistry {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the configuration for `T`.
    pub fn register<T: Send + Sync + 'static>(
        &self,
        config: EntityConfig<T>,
    ) -> Result<Arc<EntityConfig<T>>> {
        let config = Arc::new(config);
        let mut entries = self.entries.write()?;
        let replaced = entries
            .insert(TypeId::of::<T>(), config.clone() as Arc<dyn Any + Send + Sync>)
            .is_some();
        event!(
            Level::DEBUG,
            entity = config.metadata().entity_name(),
            table = config.metadata().table_name(),
            replaced,
            "entity registered"
        );
        Ok(config)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<EntityConfig<T>>>> {
        let entries = self.entries.read()?;
        Ok(entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<EntityConfig<T>>().ok()))
    }

    /// Returns the registered configuration, building it from `Entity` on first use.
    ///
    /// Concurrent first calls may each build a candidate; the first one stored wins
    /// and every caller receives that same instance.
    pub fn resolve<T: Entity>(&self) -> Result<Arc<EntityConfig<T>>> {
        if let Some(config) = self.get::<T>()? {
            return Ok(config);
        }

        let candidate: Arc<dyn Any + Send + Sync> = Arc::new(EntityConfig::<T>::from_entity()?);
        let mut entries = self.entries.write()?;
        let stored = entries
            .entry(TypeId::of::<T>())
            .or_insert(candidate)
            .clone();
        drop(entries);

        stored.downcast::<EntityConfig<T>>().map_err(|_| {
            PersistError::configuration(
                std::any::type_name::<T>(),
                "registry entry does not hold this entity's configuration",
            )
        })
    }

    pub fn contains<T: 'static>(&self) -> Result<bool> {
        Ok(self.entries.read()?.contains_key(&TypeId::of::<T>()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entries", &self.len().ok())
            .finish()
    }
}
