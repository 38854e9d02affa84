pub mod aggregation;
pub mod expression;

pub use aggregation::{AggregateFunction, Aggregation};
pub use expression::{col, lit, CompareOp, FilterExpr, Scalar};
