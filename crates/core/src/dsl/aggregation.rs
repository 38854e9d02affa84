use polars::prelude::{col, DataType, Expr};
use serde::{Deserialize, Serialize};

/// The closed set of supported aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    First,
    Last,
}

/// One aggregated output column: apply `function` to `column` within each
/// group. The output column keeps the input column's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub column: String,
    pub function: AggregateFunction,
}

impl Aggregation {
    pub fn new(column: impl Into<String>, function: AggregateFunction) -> Self {
        Self {
            column: column.into(),
            function,
        }
    }

    pub fn to_polars(&self) -> Expr {
        let input = col(self.column.as_str());
        let expr = match self.function {
            AggregateFunction::Sum => input.sum(),
            AggregateFunction::Mean => input.mean(),
            AggregateFunction::Min => input.min(),
            AggregateFunction::Max => input.max(),
            AggregateFunction::Count => input.count().cast(DataType::Int64),
            AggregateFunction::First => input.first(),
            AggregateFunction::Last => input.last(),
        };
        expr.alias(self.column.as_str())
    }
}
