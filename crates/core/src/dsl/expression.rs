//! Typed filter predicates.
//!
//! Predicates are built programmatically (column references, scalar
//! literals, comparisons, boolean combinators) and compiled to polars
//! expressions. Column references are collected up front so the engine can
//! validate them against the table schema before execution.

use std::collections::BTreeSet;

use polars::prelude::{lit as polars_lit, Expr};

/// A scalar literal usable on either side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A filter predicate over a table's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Column(String),
    Literal(Scalar),
    Compare {
        left: Box<FilterExpr>,
        op: CompareOp,
        right: Box<FilterExpr>,
    },
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
}

/// Column reference.
pub fn col(name: &str) -> FilterExpr {
    FilterExpr::Column(name.to_string())
}

/// Scalar literal.
pub fn lit(value: impl Into<Scalar>) -> FilterExpr {
    FilterExpr::Literal(value.into())
}

impl FilterExpr {
    fn compare(self, op: CompareOp, other: FilterExpr) -> FilterExpr {
        FilterExpr::Compare {
            left: Box::new(self),
            op,
            right: Box::new(other),
        }
    }

    pub fn eq(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::Eq, other)
    }

    pub fn neq(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::NotEq, other)
    }

    pub fn lt(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::Lt, other)
    }

    pub fn lt_eq(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::Lte, other)
    }

    pub fn gt(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::Gt, other)
    }

    pub fn gt_eq(self, other: FilterExpr) -> FilterExpr {
        self.compare(CompareOp::Gte, other)
    }

    pub fn and(self, other: FilterExpr) -> FilterExpr {
        FilterExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: FilterExpr) -> FilterExpr {
        FilterExpr::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> FilterExpr {
        FilterExpr::Not(Box::new(self))
    }

    /// Every column name the predicate references.
    pub fn referenced_columns(&self) -> BTreeSet<String> {
        let mut columns = BTreeSet::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns(&self, columns: &mut BTreeSet<String>) {
        match self {
            FilterExpr::Column(name) => {
                columns.insert(name.clone());
            }
            FilterExpr::Literal(_) => {}
            FilterExpr::Compare { left, right, .. } => {
                left.collect_columns(columns);
                right.collect_columns(columns);
            }
            FilterExpr::And(left, right) | FilterExpr::Or(left, right) => {
                left.collect_columns(columns);
                right.collect_columns(columns);
            }
            FilterExpr::Not(inner) => inner.collect_columns(columns),
        }
    }

    /// Compile the predicate to a polars expression.
    pub fn to_polars(&self) -> Expr {
        match self {
            FilterExpr::Column(name) => polars::prelude::col(name.as_str()),
            FilterExpr::Literal(scalar) => match scalar {
                Scalar::Int(value) => polars_lit(*value),
                Scalar::Float(value) => polars_lit(*value),
                Scalar::Bool(value) => polars_lit(*value),
                Scalar::Str(value) => polars_lit(value.clone()),
            },
            FilterExpr::Compare { left, op, right } => {
                let left = left.to_polars();
                let right = right.to_polars();
                match op {
                    CompareOp::Eq => left.eq(right),
                    CompareOp::NotEq => left.neq(right),
                    CompareOp::Lt => left.lt(right),
                    CompareOp::Lte => left.lt_eq(right),
                    CompareOp::Gt => left.gt(right),
                    CompareOp::Gte => left.gt_eq(right),
                }
            }
            FilterExpr::And(left, right) => left.to_polars().and(right.to_polars()),
            FilterExpr::Or(left, right) => left.to_polars().or(right.to_polars()),
            FilterExpr::Not(inner) => inner.to_polars().not(),
        }
    }
}
