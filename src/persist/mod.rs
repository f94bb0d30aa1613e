//! The persistence contract: save, insert, batch insert, update and delete.

pub mod database;
pub mod sql_persistence;
pub mod validation;

use crate::core::Result;

pub use database::Database;
pub use sql_persistence::SqlPersistence;
pub use validation::Validator;

/// Which branch `save` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The entity had no primary key value and was inserted.
    Inserted,
    /// The entity had a primary key value; carries the affected row count.
    Updated(u64),
}

/// Per-call switches for write operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub skip_validation: bool,
}

impl WriteOptions {
    pub fn skip_validation() -> Self {
        Self {
            skip_validation: true,
        }
    }
}

/// Typed persistence handle for entities of type `T`.
///
/// Each call acquires its own connection and releases it before returning,
/// so a handle can be shared freely across threads.
pub trait Persistence<T> {
    /// Inserts when the primary key is unset, updates otherwise.
    fn save_with(&self, entity: &mut T, options: WriteOptions) -> Result<SaveOutcome>;

    /// Inserts the entity and writes server-generated values back into it.
    fn insert_with(&self, entity: &mut T, options: WriteOptions) -> Result<()>;

    /// Inserts all entities with one statement; returns affected rows.
    fn insert_batch_with(&self, entities: &[T], options: WriteOptions) -> Result<u64>;

    /// Updates the row identified by the entity's primary key; returns affected rows.
    fn update_with(&self, entity: &T, options: WriteOptions) -> Result<u64>;

    /// Deletes the row identified by the entity's primary key; returns affected rows.
    fn delete(&self, entity: &T) -> Result<u64>;

    fn save(&self, entity: &mut T) -> Result<SaveOutcome> {
        self.save_with(entity, WriteOptions::default())
    }

    fn insert(&self, entity: &mut T) -> Result<()> {
        self.insert_with(entity, WriteOptions::default())
    }

    fn insert_batch(&self, entities: &[T]) -> Result<u64> {
        self.insert_batch_with(entities, WriteOptions::default())
    }

    fn update(&self, entity: &T) -> Result<u64> {
        self.update_with(entity, WriteOptions::default())
    }
}
