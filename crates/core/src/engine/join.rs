use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::ensure_columns_exist;
use crate::error::Result;

/// Which unmatched rows survive the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    fn to_polars(self) -> JoinType {
        match self {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
            JoinKind::Right => JoinType::Right,
            JoinKind::Outer => JoinType::Full,
        }
    }
}

/// Relationally join `left` and `right` on the given key columns.
///
/// Key columns must exist on both sides. An outer join coalesces the key
/// columns so each key appears once in the output.
pub fn apply_join(
    left: &DataFrame,
    right: &DataFrame,
    on: &[String],
    kind: JoinKind,
) -> Result<DataFrame> {
    let left_lf = left.clone().lazy();
    let right_lf = right.clone().lazy();

    let keys: Vec<&str> = on.iter().map(String::as_str).collect();
    ensure_columns_exist(&left_lf, &keys, "join key on left table")?;
    ensure_columns_exist(&right_lf, &keys, "join key on right table")?;

    let left_keys: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
    let right_keys: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();

    let mut args = JoinArgs::new(kind.to_polars());
    if kind == JoinKind::Outer {
        args = args.with_coalesce(JoinCoalesce::CoalesceColumns);
    }

    Ok(left_lf
        .join(right_lf, left_keys, right_keys, args)
        .collect()?)
}
