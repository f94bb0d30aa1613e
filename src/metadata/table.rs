use super::naming::{default_table_name, is_valid_identifier};
use super::property::{Getter, PropertyDescriptor};
use crate::core::{Operation, PersistError, Result};
use std::collections::HashSet;
use std::fmt;

/// Table-level metadata for one entity type.
///
/// Built once and never mutated afterwards. Insertable and updatable subsets
/// keep declaration order, which is the order columns and values are emitted in.
pub struct TableMetadata<T> {
    entity_name: &'static str,
    table_name: String,
    properties: Vec<PropertyDescriptor<T>>,
    primary_key: Option<usize>,
    insertable: Vec<usize>,
    updatable: Vec<usize>,
}

impl<T> TableMetadata<T> {
    pub fn builder(entity_name: &'static str) -> TableMetadataBuilder<T> {
        TableMetadataBuilder {
            entity_name,
            table_name: None,
            properties: Vec::new(),
        }
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn primary_key(&self) -> Option<&PropertyDescriptor<T>> {
        self.primary_key.map(|idx| &self.properties[idx])
    }

    /// The primary-key descriptor, or a configuration error naming the entity.
    pub fn require_primary_key(&self, operation: Operation) -> Result<&PropertyDescriptor<T>> {
        self.primary_key().ok_or_else(|| {
            PersistError::configuration(
                self.entity_name,
                format!("{} requires a primary key property, none is declared", operation),
            )
        })
    }

    pub fn insertable(&self) -> impl Iterator<Item = &PropertyDescriptor<T>> {
        self.insertable.iter().map(|&idx| &self.properties[idx])
    }

    pub fn updatable(&self) -> impl Iterator<Item = &PropertyDescriptor<T>> {
        self.updatable.iter().map(|&idx| &self.properties[idx])
    }

    pub fn insertable_count(&self) -> usize {
        self.insertable.len()
    }

    pub fn updatable_count(&self) -> usize {
        self.updatable.len()
    }

    pub fn insertable_columns(&self) -> Vec<&'static str> {
        self.insertable().map(|p| p.column_name()).collect()
    }

    pub fn updatable_columns(&self) -> Vec<&'static str> {
        self.updatable().map(|p| p.column_name()).collect()
    }

    pub fn property_by_column(&self, column: &str) -> Option<&PropertyDescriptor<T>> {
        self.properties
            .iter()
            .find(|p| p.column_name().eq_ignore_ascii_case(column))
    }
}

impl<T> fmt::Debug for TableMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableMetadata")
            .field("entity_name", &self.entity_name)
            .field("table_name", &self.table_name)
            .field("properties", &self.properties)
            .field("primary_key", &self.primary_key().map(|p| p.name()))
            .finish()
    }
}

pub struct TableMetadataBuilder<T> {
    entity_name: &'static str,
    table_name: Option<String>,
    properties: Vec<PropertyDescriptor<T>>,
}

impl<T> TableMetadataBuilder<T> {
    /// Overrides the table name derived from the entity name.
    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn primary_key(self, name: &'static str, getter: Getter<T>) -> Self {
        self.property(PropertyDescriptor::primary_key(name, getter))
    }

    pub fn column(self, name: &'static str, getter: Getter<T>) -> Self {
        self.property(PropertyDescriptor::new(name, getter))
    }

    pub fn property(mut self, descriptor: PropertyDescriptor<T>) -> Self {
        self.properties.push(descriptor);
        self
    }

    pub fn build(self) -> Result<TableMetadata<T>> {
        let entity = self.entity_name;
        let table_name = self
            .table_name
            .unwrap_or_else(|| default_table_name(entity));

        if !is_valid_identifier(&table_name) {
            return Err(PersistError::configuration(
                entity,
                format!("invalid table name '{}'", table_name),
            ));
        }

        let mut primary_key = None;
        let mut seen = HashSet::new();

        for (idx, property) in self.properties.iter().enumerate() {
            let column = property.column_name();
            if !is_valid_identifier(column) {
                return Err(PersistError::configuration(
                    entity,
                    format!("invalid column name '{}' for property '{}'", column, property.name()),
                ));
            }
            if !seen.insert(column.to_ascii_lowercase()) {
                return Err(PersistError::configuration(
                    entity,
                    format!("column '{}' is declared more than once", column),
                ));
            }
            if property.is_primary_key() {
                if let Some(existing) = primary_key {
                    let existing: &PropertyDescriptor<T> = &self.properties[existing];
                    return Err(PersistError::configuration(
                        entity,
                        format!(
                            "multiple primary keys declared: '{}' and '{}'",
                            existing.name(),
                            property.name()
                        ),
                    ));
                }
                primary_key = Some(idx);
            }
        }

        let insertable = indices_where(&self.properties, PropertyDescriptor::is_insertable);
        let updatable = indices_where(&self.properties, PropertyDescriptor::is_updatable);

        Ok(TableMetadata {
            entity_name: entity,
            table_name,
            properties: self.properties,
            primary_key,
            insertable,
            updatable,
        })
    }
}

fn indices_where<T>(
    properties: &[PropertyDescriptor<T>],
    predicate: fn(&PropertyDescriptor<T>) -> bool,
) -> Vec<usize> {
    properties
        .iter()
        .enumerate()
        .filter(|(_, p)| predicate(p))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    struct Order {
        id: Option<i64>,
        customer_id: i64,
        total: f64,
        created_at: Option<String>,
    }

    fn order_table() -> TableMetadata<Order> {
        TableMetadata::<Order>::builder("Order")
            .primary_key("id", |o| o.id.into())
            .column("customerId", |o| o.customer_id.into())
            .column("total", |o| o.total.into())
            .property(
                PropertyDescriptor::new("createdAt", |o: &Order| o.created_at.clone().into())
                    .updatable(false),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_subsets_keep_declaration_order() {
        let table = order_table();

        assert_eq!(table.table_name(), "orders");
        assert_eq!(table.primary_key().unwrap().name(), "id");
        assert_eq!(table.insertable_columns(), vec!["customerId", "total", "createdAt"]);
        assert_eq!(table.updatable_columns(), vec!["customerId", "total"]);
    }

    #[test]
    fn test_metadata_is_stable_across_reads() {
        let table = order_table();
        let first = table.insertable_columns();
        for _ in 0..10 {
            assert_eq!(table.insertable_columns(), first);
        }
    }

    #[test]
    fn test_explicit_table_name() {
        let table = TableMetadata::<Order>::builder("Order")
            .table("sales.order_headers")
            .column("total", |o| o.total.into())
            .build()
            .unwrap();
        assert_eq!(table.table_name(), "sales.order_headers");
        assert!(table.primary_key().is_none());
    }

    #[test]
    fn test_missing_primary_key_is_reported_on_demand() {
        let table = TableMetadata::<Order>::builder("Order")
            .column("total", |o| o.total.into())
            .build()
            .unwrap();

        let err = table.require_primary_key(Operation::Update).unwrap_err();
        assert!(matches!(err, PersistError::Configuration { ref entity, .. } if entity == "Order"));
    }

    #[test]
    fn test_rejects_second_primary_key() {
        let result = TableMetadata::<Order>::builder("Order")
            .primary_key("id", |o| o.id.into())
            .primary_key("customerId", |o| o.customer_id.into())
            .build();
        assert!(matches!(result, Err(PersistError::Configuration { .. })));
    }

    #[test]
    fn test_rejects_duplicate_and_invalid_columns() {
        let duplicate = TableMetadata::<Order>::builder("Order")
            .column("total", |o| o.total.into())
            .property(PropertyDescriptor::new("amount", |o: &Order| o.total.into()).column("TOTAL"))
            .build();
        assert!(duplicate.is_err());

        let invalid = TableMetadata::<Order>::builder("Order")
            .property(PropertyDescriptor::new("total", |o: &Order| o.total.into()).column("total)--"))
            .build();
        assert!(invalid.is_err());

        let invalid_table = TableMetadata::<Order>::builder("Order")
            .table("orders o")
            .build();
        assert!(invalid_table.is_err());

        let non_ascii = TableMetadata::<Order>::builder("Bestellübersicht")
            .column("total", |o| o.total.into())
            .build();
        assert!(matches!(non_ascii, Err(PersistError::Configuration { .. })));
    }

    #[test]
    fn test_property_by_column() {
        let table = order_table();
        let prop = table.property_by_column("ID").unwrap();
        let order = Order {
            id: Some(3),
            customer_id: 1,
            total: 0.0,
            created_at: None,
        };
        assert_eq!(prop.read(&order), Value::Integer(3));
        assert!(table.property_by_column("missing").is_none());
    }
}
