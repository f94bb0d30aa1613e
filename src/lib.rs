// ============================================================================
// rowbind Library
// ============================================================================

pub mod config;
pub mod connection;
pub mod core;
pub mod metadata;
pub mod persist;
pub mod sql;
pub mod transform;

// Re-export main types for convenience
pub use config::PersistConfig;
pub use core::{Operation, PersistError, Result, Value};
pub use metadata::{
    Entity, EntityConfig, EntityRegistry, PropertyDescriptor, TableMetadata, TableMetadataBuilder,
};
pub use sql::{BatchStatement, PlaceholderStyle, Statement};
pub use transform::{
    Chain, ColumnDefaults, DefaultValue, FnTransformer, Identity, JsonEncoding, TransformError,
    ValueTransformer,
};

// Re-export persistence API
pub use connection::{ConnectionFactory, ConnectionGuard, InsertOutcome, SqlExecutor};
pub use persist::{
    Database, Persistence, SaveOutcome, SqlPersistence, Validator, WriteOptions,
};
