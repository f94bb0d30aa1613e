//! Entity metadata: property descriptors, table metadata and the type-keyed registry.

pub mod naming;
pub mod property;
pub mod registry;
pub mod table;

use crate::core::Result;
use crate::persist::Validator;
use crate::transform::{Identity, ValueTransformer};
use std::sync::Arc;

pub use naming::{default_table_name, is_valid_identifier};
pub use property::{Getter, PropertyDescriptor, Setter};
pub use registry::{EntityConfig, EntityRegistry};
pub use table::{TableMetadata, TableMetadataBuilder};

/// A type that maps to one table row.
///
/// Implementors declare their property table once; nothing is discovered at runtime.
///
/// ```
/// use rowbind::{Entity, PropertyDescriptor, Result, TableMetadata};
///
/// struct Order {
///     id: Option<i64>,
///     customer_id: i64,
///     total: f64,
/// }
///
/// impl Entity for Order {
///     fn table_metadata() -> Result<TableMetadata<Self>> {
///         TableMetadata::<Order>::builder("Order")
///             .property(
///                 PropertyDescriptor::primary_key("id", |o: &Order| o.id.into())
///                     .with_setter(|o, v| o.id = v.as_i64()),
///             )
///             .column("customerId", |o| o.customer_id.into())
///             .column("total", |o| o.total.into())
///             .build()
///     }
/// }
///
/// let table = Order::table_metadata().unwrap();
/// assert_eq!(table.table_name(), "orders");
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    fn table_metadata() -> Result<TableMetadata<Self>>;

    fn value_transformer() -> Arc<dyn ValueTransformer<Self>> {
        Arc::new(Identity)
    }

    fn validator() -> Option<Arc<dyn Validator<Self>>> {
        None
    }
}
