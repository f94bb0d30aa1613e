use super::{Database, Persistence, SaveOutcome, WriteOptions};
use crate::connection::{ConnectionFactory, ConnectionGuard, SqlExecutor};
use crate::core::{Operation, PersistError, Result, Value};
use crate::metadata::{EntityConfig, PropertyDescriptor, TableMetadata};
use crate::sql::{BatchStatement, Statement, build_delete, build_insert, build_update};
use std::fmt;
use std::sync::Arc;
use tracing::{Level, event, info_span};

/// `Persistence` implementation that generates parameterized SQL from entity
/// metadata and hands it to the host's executor.
///
/// Handles are cheap to clone and safe to share across threads. Every public
/// operation runs all checks first, then acquires exactly one connection and
/// releases it before returning.
pub struct SqlPersistence<T, F, X> {
    database: Database<F, X>,
    entity: Arc<EntityConfig<T>>,
}

impl<T, F, X> SqlPersistence<T, F, X>
where
    T: 'static,
    F: ConnectionFactory,
    X: SqlExecutor<F::Connection>,
{
    pub(crate) fn new(database: Database<F, X>, entity: Arc<EntityConfig<T>>) -> Self {
        Self { database, entity }
    }

    pub fn entity_config(&self) -> &EntityConfig<T> {
        &self.entity
    }

    pub fn metadata(&self) -> &TableMetadata<T> {
        self.entity.metadata()
    }

    fn entity_name(&self) -> &'static str {
        self.metadata().entity_name()
    }

    /// The INSERT this handle would run for `entity`, with transformed binds.
    pub fn insert_statement(&self, entity: &T) -> Result<Statement> {
        let metadata = self.metadata();
        let (columns, params) = self.bind_row(entity, metadata.insertable(), Operation::Insert)?;
        let sql = build_insert(
            metadata.table_name(),
            &columns,
            self.database.config().placeholder_style,
        )
        .map_err(|err| PersistError::configuration(self.entity_name(), err.to_string()))?;

        Ok(Statement::new(sql, params))
    }

    /// One INSERT plus an N x columns value matrix.
    ///
    /// Fails if any column carries values of different types across rows.
    /// `NULL` matches anything, and integers and floats count as one numeric type.
    pub fn batch_insert_statement(&self, entities: &[T]) -> Result<BatchStatement> {
        let metadata = self.metadata();
        let columns = metadata.insertable_columns();
        let sql = build_insert(
            metadata.table_name(),
            &columns,
            self.database.config().placeholder_style,
        )
        .map_err(|err| PersistError::configuration(self.entity_name(), err.to_string()))?;

        let rows = entities
            .iter()
            .map(|entity| {
                self.bind_row(entity, metadata.insertable(), Operation::InsertBatch)
                    .map(|(_, values)| values)
            })
            .collect::<Result<Vec<_>>>()?;
        self.check_homogeneous(&columns, &rows)?;

        Ok(BatchStatement::new(sql, rows))
    }

    /// The UPDATE for `entity`. The transformed key is always the last bind.
    pub fn update_statement(&self, entity: &T) -> Result<Statement> {
        let metadata = self.metadata();
        let key = self.require_key_value(entity, Operation::Update)?;

        let (assignments, mut params) =
            self.bind_row(entity, metadata.updatable(), Operation::Update)?;
        let sql = build_update(
            metadata.table_name(),
            &assignments,
            key.column_name(),
            self.database.config().placeholder_style,
        )
        .map_err(|err| PersistError::configuration(self.entity_name(), err.to_string()))?;

        params.push(self.transform(key, key.read(entity), Operation::Update)?);
        Ok(Statement::new(sql, params))
    }

    pub fn delete_statement(&self, entity: &T) -> Result<Statement> {
        let metadata = self.metadata();
        let key = self.require_key_value(entity, Operation::Delete)?;
        let sql = build_delete(
            metadata.table_name(),
            key.column_name(),
            self.database.config().placeholder_style,
        );

        let key_value = self.transform(key, key.read(entity), Operation::Delete)?;
        Ok(Statement::new(sql, vec![key_value]))
    }

    /// Columns and transformed values from a single pass over `properties`,
    /// so `columns[i]` always pairs with `values[i]`.
    fn bind_row<'p>(
        &self,
        entity: &T,
        properties: impl Iterator<Item = &'p PropertyDescriptor<T>>,
        operation: Operation,
    ) -> Result<(Vec<&'static str>, Vec<Value>)> {
        let (lower, _) = properties.size_hint();
        let mut columns = Vec::with_capacity(lower);
        let mut values = Vec::with_capacity(lower);

        for property in properties {
            values.push(self.transform(property, property.read(entity), operation)?);
            columns.push(property.column_name());
        }

        Ok((columns, values))
    }

    fn transform(
        &self,
        property: &PropertyDescriptor<T>,
        raw: Value,
        operation: Operation,
    ) -> Result<Value> {
        self.entity
            .transformer()
            .transform(property, raw)
            .map_err(|err| PersistError::Transformation {
                entity: self.entity_name().to_string(),
                operation,
                property: property.name().to_string(),
                message: err.to_string(),
            })
    }

    fn require_key_value(
        &self,
        entity: &T,
        operation: Operation,
    ) -> Result<&PropertyDescriptor<T>> {
        let key = self.metadata().require_primary_key(operation)?;
        if key.read(entity).is_null() {
            return Err(PersistError::MissingPrimaryKey {
                entity: self.entity_name().to_string(),
                operation,
            });
        }
        Ok(key)
    }

    fn validate<'e>(
        &self,
        entities: impl IntoIterator<Item = &'e T>,
        options: WriteOptions,
        operation: Operation,
    ) -> Result<()>
    where
        T: 'e,
    {
        if options.skip_validation || !self.database.config().validate_on_write {
            return Ok(());
        }
        let Some(validator) = self.entity.validator() else {
            return Ok(());
        };

        for entity in entities {
            if let Err(violations) = validator.validate(entity) {
                return Err(PersistError::Validation {
                    entity: self.entity_name().to_string(),
                    operation,
                    violations,
                });
            }
        }
        Ok(())
    }

    fn check_homogeneous(&self, columns: &[&str], rows: &[Vec<Value>]) -> Result<()> {
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PersistError::configuration(
                    self.entity_name(),
                    format!(
                        "batch row {} has {} values, expected {}",
                        row_idx,
                        row.len(),
                        columns.len()
                    ),
                ));
            }
        }

        for (col_idx, column) in columns.iter().enumerate() {
            let mut expected: Option<&'static str> = None;
            for (row_idx, row) in rows.iter().enumerate() {
                let value = &row[col_idx];
                if value.is_null() {
                    continue;
                }
                let class = bind_class(value);
                match expected {
                    None => expected = Some(class),
                    Some(type_name) if type_name != class => {
                        return Err(PersistError::configuration(
                            self.entity_name(),
                            format!(
                                "heterogeneous batch: column '{}' is {} in an earlier row but {} in row {}",
                                column, type_name, class, row_idx
                            ),
                        ));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Runs `work` on a freshly acquired connection that is released on every exit path.
    fn with_connection<R>(
        &self,
        operation: Operation,
        work: impl FnOnce(&X, &mut F::Connection) -> anyhow::Result<R>,
    ) -> Result<R> {
        let entity = self.entity_name();
        let mut guard = ConnectionGuard::acquire(self.database.factory())
            .map_err(|err| PersistError::execution(entity, operation, err))?;

        work(self.database.executor(), guard.connection())
            .map_err(|err| PersistError::execution(entity, operation, err))
    }

    fn apply_generated(&self, entity: &mut T, generated: Vec<(String, Value)>) {
        for (column, value) in generated {
            let written = self
                .metadata()
                .property_by_column(&column)
                .is_some_and(|property| property.write(entity, value));
            if !written {
                event!(
                    Level::WARN,
                    column = %column,
                    "generated value has no writable property, skipped"
                );
            }
        }
    }

    fn run_insert(&self, entity: &mut T, options: WriteOptions) -> Result<()> {
        self.validate([&*entity], options, Operation::Insert)?;
        let (sql, params) = self.insert_statement(entity)?.into_parts();
        event!(Level::DEBUG, sql = %sql, binds = params.len(), "insert statement built");

        let outcome = self.with_connection(Operation::Insert, |executor, connection| {
            executor.insert(connection, &sql, self.entity_name(), &params)
        })?;

        event!(
            Level::DEBUG,
            affected = outcome.affected,
            generated = outcome.generated.len(),
            "entity inserted"
        );
        self.apply_generated(entity, outcome.generated);
        Ok(())
    }

    fn run_insert_batch(&self, entities: &[T], options: WriteOptions) -> Result<u64> {
        if entities.is_empty() {
            event!(Level::DEBUG, "empty batch, nothing to insert");
            return Ok(0);
        }
        if let Some(max) = self.database.config().max_batch_rows {
            if entities.len() > max {
                return Err(PersistError::configuration(
                    self.entity_name(),
                    format!("batch of {} rows exceeds max_batch_rows {}", entities.len(), max),
                ));
            }
        }

        self.validate(entities, options, Operation::InsertBatch)?;
        let batch = self.batch_insert_statement(entities)?;
        event!(
            Level::DEBUG,
            sql = %batch.sql(),
            rows = batch.row_count(),
            "batch insert statement built"
        );

        let affected = self.with_connection(Operation::InsertBatch, |executor, connection| {
            executor.insert_batch(connection, batch.sql(), self.entity_name(), batch.rows())
        })?;

        event!(Level::DEBUG, affected, "batch inserted");
        Ok(affected)
    }

    fn run_update(&self, entity: &T, options: WriteOptions) -> Result<u64> {
        let statement = self.update_statement(entity)?;
        self.validate([entity], options, Operation::Update)?;
        event!(
            Level::DEBUG,
            sql = %statement.sql(),
            binds = statement.params().len(),
            "update statement built"
        );

        let affected = self.with_connection(Operation::Update, |executor, connection| {
            executor.update(connection, statement.sql(), statement.params())
        })?;

        event!(Level::DEBUG, affected, "entity updated");
        Ok(affected)
    }

    fn run_delete(&self, entity: &T) -> Result<u64> {
        let statement = self.delete_statement(entity)?;
        event!(Level::DEBUG, sql = %statement.sql(), "delete statement built");

        let affected = self.with_connection(Operation::Delete, |executor, connection| {
            executor.update(connection, statement.sql(), statement.params())
        })?;

        event!(Level::DEBUG, affected, "entity deleted");
        Ok(affected)
    }
}

/// Type class a batch column must agree on. Drivers bind integers into
/// float columns, so both count as numeric.
fn bind_class(value: &Value) -> &'static str {
    match value {
        Value::Integer(_) | Value::Float(_) => "NUMERIC",
        other => other.type_name(),
    }
}

impl<T, F, X> Persistence<T> for SqlPersistence<T, F, X>
where
    T: 'static,
    F: ConnectionFactory,
    X: SqlExecutor<F::Connection>,
{
    fn save_with(&self, entity: &mut T, options: WriteOptions) -> Result<SaveOutcome> {
        let metadata = self.metadata();
        let span = info_span!(
            "persist.save",
            entity = %metadata.entity_name(),
            table = %metadata.table_name()
        );
        let _enter = span.enter();

        let key = metadata
            .require_primary_key(Operation::Save)
            .inspect_err(|err| event!(Level::ERROR, error = %err, "persist save failed"))?;
        if key.read(entity).is_null() {
            self.insert_with(entity, options)?;
            Ok(SaveOutcome::Inserted)
        } else {
            self.update_with(entity, options).map(SaveOutcome::Updated)
        }
    }

    fn insert_with(&self, entity: &mut T, options: WriteOptions) -> Result<()> {
        let metadata = self.metadata();
        let span = info_span!(
            "persist.insert",
            entity = %metadata.entity_name(),
            table = %metadata.table_name()
        );
        let _enter = span.enter();

        self.run_insert(entity, options)
            .inspect_err(|err| event!(Level::ERROR, error = %err, "persist insert failed"))
    }

    fn insert_batch_with(&self, entities: &[T], options: WriteOptions) -> Result<u64> {
        let metadata = self.metadata();
        let span = info_span!(
            "persist.insert_batch",
            entity = %metadata.entity_name(),
            table = %metadata.table_name(),
            rows = entities.len()
        );
        let _enter = span.enter();

        self.run_insert_batch(entities, options)
            .inspect_err(|err| event!(Level::ERROR, error = %err, "persist batch insert failed"))
    }

    fn update_with(&self, entity: &T, options: WriteOptions) -> Result<u64> {
        let metadata = self.metadata();
        let span = info_span!(
            "persist.update",
            entity = %metadata.entity_name(),
            table = %metadata.table_name()
        );
        let _enter = span.enter();

        self.run_update(entity, options)
            .inspect_err(|err| event!(Level::ERROR, error = %err, "persist update failed"))
    }

    fn delete(&self, entity: &T) -> Result<u64> {
        let metadata = self.metadata();
        let span = info_span!(
            "persist.delete",
            entity = %metadata.entity_name(),
            table = %metadata.table_name()
        );
        let _enter = span.enter();

        self.run_delete(entity)
            .inspect_err(|err| event!(Level::ERROR, error = %err, "persist delete failed"))
    }
}

impl<T, F, X> Clone for SqlPersistence<T, F, X> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            entity: Arc::clone(&self.entity),
        }
    }
}

impl<T, F, X> fmt::Debug for SqlPersistence<T, F, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlPersistence")
            .field("entity", &self.entity)
            .finish()
    }
}
