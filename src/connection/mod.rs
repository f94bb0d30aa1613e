//! Boundary to the outside world: connection acquisition and statement execution.
//!
//! Both collaborators are supplied by the host application. Their errors are
//! `anyhow::Error` and reach callers unchanged inside `PersistError::Execution`.

pub mod guard;

use crate::core::Value;

pub use guard::ConnectionGuard;

/// Source of connections, typically a driver's pool.
pub trait ConnectionFactory: Send + Sync {
    type Connection: Send;

    fn get_connection(&self) -> anyhow::Result<Self::Connection>;

    /// Hands a connection back once the operation that acquired it is over.
    ///
    /// Called exactly once per acquired connection. Defaults to dropping it.
    fn release(&self, connection: Self::Connection) -> anyhow::Result<()> {
        drop(connection);
        Ok(())
    }
}

/// Result of executing a single-row INSERT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub affected: u64,
    /// Server-generated values keyed by column name (e.g. the new primary key).
    pub generated: Vec<(String, Value)>,
}

impl InsertOutcome {
    pub fn new(affected: u64) -> Self {
        Self {
            affected,
            generated: Vec::new(),
        }
    }

    pub fn with_generated(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.generated.push((column.into(), value.into()));
        self
    }
}

/// Binds parameters to statement text and runs it on a connection.
pub trait SqlExecutor<C>: Send + Sync {
    fn insert(
        &self,
        connection: &mut C,
        sql: &str,
        entity: &str,
        params: &[Value],
    ) -> anyhow::Result<InsertOutcome>;

    /// Runs `sql` once per row as a single multi-row operation; returns affected rows.
    fn insert_batch(
        &self,
        connection: &mut C,
        sql: &str,
        entity: &str,
        rows: &[Vec<Value>],
    ) -> anyhow::Result<u64>;

    /// Executes an UPDATE or DELETE; returns affected rows.
    fn update(&self, connection: &mut C, sql: &str, params: &[Value]) -> anyhow::Result<u64>;
}
