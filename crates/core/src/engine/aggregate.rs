use polars::prelude::*;

use crate::dsl::Aggregation;
use crate::engine::ensure_columns_exist;
use crate::error::Result;

/// Partition `frame` by the distinct `group_by` combinations and reduce
/// each aggregation's column within its partition. The output carries the
/// group columns plus one column per aggregation.
pub fn apply_aggregate(
    frame: &DataFrame,
    group_by: &[String],
    aggregations: &[Aggregation],
) -> Result<DataFrame> {
    let lazy = frame.clone().lazy();

    let group_columns: Vec<&str> = group_by.iter().map(String::as_str).collect();
    ensure_columns_exist(&lazy, &group_columns, "group-by column")?;

    let input_columns: Vec<&str> = aggregations
        .iter()
        .map(|aggregation| aggregation.column.as_str())
        .collect();
    ensure_columns_exist(&lazy, &input_columns, "aggregation input column")?;

    let group_exprs: Vec<Expr> = group_columns.iter().map(|name| col(*name)).collect();
    let agg_exprs: Vec<Expr> = aggregations
        .iter()
        .map(Aggregation::to_polars)
        .collect();

    Ok(lazy.group_by(group_exprs).agg(agg_exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::AggregateFunction;
    use crate::error::RegistryError;

    fn sample_frame() -> DataFrame {
        df!(
            "account" => &["checking", "savings", "checking", "savings"],
            "amount" => &[100i64, 200, 150, 250]
        )
        .unwrap()
    }

    #[test]
    fn one_row_per_distinct_group() {
        let out = apply_aggregate(
            &sample_frame(),
            &["account".to_string()],
            &[Aggregation::new("amount", AggregateFunction::Sum)],
        )
        .unwrap();

        assert_eq!(out.height(), 2);

        let sorted = out
            .lazy()
            .sort(["account"], Default::default())
            .collect()
            .unwrap();
        let sums: Vec<i64> = sorted
            .column("amount")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(sums, vec![250, 450]);
    }

    #[test]
    fn mean_produces_float_column() {
        let out = apply_aggregate(
            &sample_frame(),
            &["account".to_string()],
            &[Aggregation::new("amount", AggregateFunction::Mean)],
        )
        .unwrap();

        assert_eq!(out.column("amount").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn unknown_group_column_is_rejected() {
        let error = apply_aggregate(
            &sample_frame(),
            &["branch".to_string()],
            &[Aggregation::new("amount", AggregateFunction::Sum)],
        )
        .unwrap_err();

        match error {
            RegistryError::ColumnNotFound { column, .. } => assert_eq!(column, "branch"),
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unknown_aggregation_column_is_rejected() {
        let error = apply_aggregate(
            &sample_frame(),
            &["account".to_string()],
            &[Aggregation::new("balance", AggregateFunction::Max)],
        )
        .unwrap_err();

        assert!(matches!(error, RegistryError::ColumnNotFound { .. }));
    }
}
