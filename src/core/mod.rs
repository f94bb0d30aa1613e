pub mod error;
pub mod value;

pub use error::{BoxError, Operation, PersistError, Result};
pub use value::Value;
