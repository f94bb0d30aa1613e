#![allow(dead_code)]

//! Fake connection boundary shared by the integration tests.

use rowbind::{
    ConnectionFactory, Database, Entity, InsertOutcome, PersistConfig, PropertyDescriptor,
    Result, SqlExecutor, TableMetadata, Value,
};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use tracing::span;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Option<i64>,
    pub customer_id: i64,
    pub total: f64,
}

impl Order {
    pub fn new(customer_id: i64, total: f64) -> Self {
        Self {
            id: None,
            customer_id,
            total,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl Entity for Order {
    fn table_metadata() -> Result<TableMetadata<Self>> {
        TableMetadata::<Order>::builder("Order")
            .property(
                PropertyDescriptor::primary_key("id", |o: &Order| o.id.into())
                    .with_setter(|o, v| o.id = v.as_i64()),
            )
            .column("customerId", |o| o.customer_id.into())
            .column("total", |o| o.total.into())
            .build()
    }
}

/// Connection handed out by `RecordingFactory`.
#[derive(Debug)]
pub struct FakeConnection {
    pub id: u64,
}

#[derive(Default)]
pub struct RecordingFactory {
    next_id: AtomicU64,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_acquire: bool,
    fail_release: bool,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_acquire() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }

    pub fn failing_release() -> Self {
        Self {
            fail_release: true,
            ..Self::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ConnectionFactory for RecordingFactory {
    type Connection = FakeConnection;

    fn get_connection(&self) -> anyhow::Result<FakeConnection> {
        if self.fail_acquire {
            anyhow::bail!("connection refused");
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }

    fn release(&self, _connection: FakeConnection) -> anyhow::Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            anyhow::bail!("connection already closed");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Insert,
    InsertBatch,
    Update,
}

/// One statement as the executor received it.
#[derive(Debug, Clone)]
pub struct ExecutedCall {
    pub kind: CallKind,
    pub connection: u64,
    pub sql: String,
    pub entity: Option<String>,
    pub params: Vec<Value>,
    pub rows: Vec<Vec<Value>>,
}

pub struct RecordingExecutor {
    calls: Mutex<Vec<ExecutedCall>>,
    next_key: AtomicI64,
    generated_column: Option<&'static str>,
    affected: u64,
    fail_with: Option<&'static str>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_key: AtomicI64::new(1),
            generated_column: Some("id"),
            affected: 1,
            fail_with: None,
        }
    }

    /// Column reported as server-generated after each single-row insert.
    pub fn generating(mut self, column: Option<&'static str>) -> Self {
        self.generated_column = column;
        self
    }

    /// Rows reported as affected by UPDATE and DELETE.
    pub fn affecting(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Every statement fails with `message`.
    pub fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }

    pub fn calls(&self) -> Vec<ExecutedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ExecutedCall) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(message) => anyhow::bail!(message),
            None => Ok(()),
        }
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlExecutor<FakeConnection> for RecordingExecutor {
    fn insert(
        &self,
        connection: &mut FakeConnection,
        sql: &str,
        entity: &str,
        params: &[Value],
    ) -> anyhow::Result<InsertOutcome> {
        self.record(ExecutedCall {
            kind: CallKind::Insert,
            connection: connection.id,
            sql: sql.to_string(),
            entity: Some(entity.to_string()),
            params: params.to_vec(),
            rows: Vec::new(),
        })?;

        let outcome = InsertOutcome::new(1);
        Ok(match self.generated_column {
            Some(column) => {
                outcome.with_generated(column, self.next_key.fetch_add(1, Ordering::SeqCst))
            }
            None => outcome,
        })
    }

    fn insert_batch(
        &self,
        connection: &mut FakeConnection,
        sql: &str,
        entity: &str,
        rows: &[Vec<Value>],
    ) -> anyhow::Result<u64> {
        self.record(ExecutedCall {
            kind: CallKind::InsertBatch,
            connection: connection.id,
            sql: sql.to_string(),
            entity: Some(entity.to_string()),
            params: Vec::new(),
            rows: rows.to_vec(),
        })?;
        Ok(rows.len() as u64)
    }

    fn update(
        &self,
        connection: &mut FakeConnection,
        sql: &str,
        params: &[Value],
    ) -> anyhow::Result<u64> {
        self.record(ExecutedCall {
            kind: CallKind::Update,
            connection: connection.id,
            sql: sql.to_string(),
            entity: None,
            params: params.to_vec(),
            rows: Vec::new(),
        })?;
        Ok(self.affected)
    }
}

pub type TestDatabase = Database<RecordingFactory, RecordingExecutor>;

pub fn database() -> TestDatabase {
    database_with(RecordingFactory::new(), RecordingExecutor::new(), PersistConfig::default())
}

pub fn database_with(
    factory: RecordingFactory,
    executor: RecordingExecutor,
    config: PersistConfig,
) -> TestDatabase {
    Database::new(factory, executor, config).unwrap()
}

/// Parses `sql` with a generic dialect, panicking with the parser's message on failure.
pub fn assert_parses(sql: &str) {
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .unwrap_or_else(|err| panic!("generated SQL does not parse: {sql}: {err}"));
    assert_eq!(statements.len(), 1, "expected one statement in {sql}");
}

/// Subscriber that counts ERROR events, for asserting that failures are logged.
#[derive(Clone, Default)]
pub struct ErrorEvents {
    errors: Arc<AtomicUsize>,
    next_span: Arc<AtomicU64>,
}

impl ErrorEvents {
    pub fn count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

impl tracing::Subscriber for ErrorEvents {
    fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(self.next_span.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}

    fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}

    fn event(&self, event: &tracing::Event<'_>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _span: &span::Id) {}

    fn exit(&self, _span: &span::Id) {}
}
