//! Parameterized statement text for INSERT, UPDATE and DELETE.
//!
//! Values are never rendered into SQL. Every value travels as a bound
//! parameter; only validated identifiers are spliced into the text.

pub mod builder;
pub mod statement;

pub use builder::{BuildError, build_delete, build_insert, build_update};
pub use statement::{BatchStatement, PlaceholderStyle, Statement};
