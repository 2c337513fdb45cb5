//! Predicate construction strategies.
//!
//! One builder per `PredicateKind` variant. Each takes the resolved
//! column expression plus already-converted values and returns the SQL
//! condition; filter items perform arity validation and value conversion
//! before dispatching here.

use sea_query::{ExprTrait, SimpleExpr, Value};

use crate::operator::CompareOp;

/// Binary comparison against a single typed value.
pub fn comparison(column: SimpleExpr, op: CompareOp, value: Value) -> SimpleExpr {
    match op {
        CompareOp::Equal => column.eq(value),
        CompareOp::NotEqual => column.ne(value),
        CompareOp::GreaterThan => column.gt(value),
        CompareOp::GreaterOrEqual => column.gte(value),
        CompareOp::LessThan => column.lt(value),
        CompareOp::LessOrEqual => column.lte(value),
    }
}

/// Substring match: LIKE %value% with wildcards escaped.
pub fn pattern(column: SimpleExpr, raw: &str) -> SimpleExpr {
    column.like(format!("%{}%", escape_like_wildcards(raw)))
}

/// IN / NOT IN over a converted value list.
pub fn membership(column: SimpleExpr, values: Vec<Value>, negated: bool) -> SimpleExpr {
    if negated {
        column.is_not_in(values)
    } else {
        column.is_in(values)
    }
}

/// Inclusive BETWEEN over a two-value range.
pub fn range(column: SimpleExpr, low: Value, high: Value) -> SimpleExpr {
    column.between(low, high)
}

/// IS NULL / IS NOT NULL.
pub fn null_check(column: SimpleExpr, negated: bool) -> SimpleExpr {
    if negated {
        column.is_not_null()
    } else {
        column.is_null()
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
