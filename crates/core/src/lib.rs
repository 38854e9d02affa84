pub mod dsl;
pub mod engine;
pub mod error;
pub mod io;
pub mod registry;

pub use dsl::{col, lit, AggregateFunction, Aggregation, FilterExpr};
pub use engine::join::JoinKind;
pub use error::{RegistryError, Result};
pub use io::{FileFormat, SheetSelector};
pub use registry::TableRegistry;
