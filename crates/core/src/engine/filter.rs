use polars::prelude::*;

use crate::dsl::FilterExpr;
use crate::error::{RegistryError, Result};

/// Check that every name in `required` exists in the frame's schema.
pub(crate) fn ensure_columns_exist(
    frame: &LazyFrame,
    required: &[&str],
    context: &str,
) -> Result<()> {
    let schema = frame.clone().collect_schema()?;

    for column_name in required {
        if schema.get(column_name).is_none() {
            return Err(RegistryError::column_not_found(*column_name, context));
        }
    }

    Ok(())
}

/// Evaluate `predicate` against the frame and return the matching rows.
///
/// Every column the predicate references must exist in the frame's schema.
pub fn apply_filter(frame: &DataFrame, predicate: &FilterExpr) -> Result<DataFrame> {
    let lazy = frame.clone().lazy();

    let referenced = predicate.referenced_columns();
    let required: Vec<&str> = referenced.iter().map(String::as_str).collect();
    ensure_columns_exist(&lazy, &required, "filter predicate")?;

    Ok(lazy.filter(predicate.to_polars()).collect()?)
}
