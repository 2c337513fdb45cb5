//! Filter operator registry.
//!
//! Maps each operator token to its value arity and the predicate strategy
//! used to build its SQL condition. The mapping is a closed set of match
//! arms, so a missing entry is a compile error rather than a runtime gap.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Comparison operators for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Exact match.
    #[serde(rename = "eq")]
    Equal,
    /// Not equal.
    #[serde(rename = "neq")]
    NotEqual,
    /// Greater than.
    #[serde(rename = "gt")]
    GreaterThan,
    /// Greater than or equal.
    #[serde(rename = "gte")]
    GreaterOrEqual,
    /// Less than.
    #[serde(rename = "lt")]
    LessThan,
    /// Less than or equal.
    #[serde(rename = "lte")]
    LessOrEqual,
    /// Substring match (LIKE %value%).
    Like,
    /// Value in list.
    In,
    /// Value not in list.
    #[serde(rename = "nin")]
    NotIn,
    /// Value within an inclusive range.
    Between,
    /// Attribute is NULL.
    IsNull,
    /// Attribute is not NULL.
    IsNotNull,
}

/// How many raw values an operator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// Exactly one value.
    Single,
    /// Exactly two values.
    Pair,
    /// One or more values.
    Many,
}

/// Comparison flavors for binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

/// The closed set of predicate construction strategies.
///
/// Every operator resolves to exactly one strategy; the strategies
/// themselves are implemented in the `predicate` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Binary comparison against a single typed value.
    Comparison(CompareOp),
    /// LIKE with contains semantics and escaped wildcards.
    Pattern,
    /// IN / NOT IN over a value list.
    Membership {
        negated: bool,
    },
    /// BETWEEN over an inclusive two-value range.
    Range,
    /// IS NULL / IS NOT NULL; the carried value is ignored.
    NullCheck {
        negated: bool,
    },
}

impl FilterOperator {
    /// The expression token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "neq",
            Self::GreaterThan => "gt",
            Self::GreaterOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessOrEqual => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "nin",
            Self::Between => "between",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
        }
    }

    /// Parse an expression token into an operator.
    pub fn from_token(token: &str) -> SpecResult<Self> {
        match token {
            "eq" => Ok(Self::Equal),
            "neq" => Ok(Self::NotEqual),
            "gt" => Ok(Self::GreaterThan),
            "gte" => Ok(Self::GreaterOrEqual),
            "lt" => Ok(Self::LessThan),
            "lte" => Ok(Self::LessOrEqual),
            "like" => Ok(Self::Like),
            "in" => Ok(Self::In),
            "nin" => Ok(Self::NotIn),
            "between" => Ok(Self::Between),
            "is_null" => Ok(Self::IsNull),
            "is_not_null" => Ok(Self::IsNotNull),
            other => Err(SpecError::UnsupportedOperator {
                token: other.to_string(),
            }),
        }
    }

    /// How many values this operator expects.
    pub fn arity(self) -> ValueArity {
        match self {
            Self::Equal
            | Self::NotEqual
            | Self::GreaterThan
            | Self::GreaterOrEqual
            | Self::LessThan
            | Self::LessOrEqual
            | Self::Like
            | Self::IsNull
            | Self::IsNotNull => ValueArity::Single,
            Self::Between => ValueArity::Pair,
            Self::In | Self::NotIn => ValueArity::Many,
        }
    }

    /// The predicate strategy this operator dispatches to.
    pub fn predicate_kind(self) -> PredicateKind {
        match self {
            Self::Equal => PredicateKind::Comparison(CompareOp::Equal),
            Self::NotEqual => PredicateKind::Comparison(CompareOp::NotEqual),
            Self::GreaterThan => PredicateKind::Comparison(CompareOp::GreaterThan),
            Self::GreaterOrEqual => PredicateKind::Comparison(CompareOp::GreaterOrEqual),
            Self::LessThan => PredicateKind::Comparison(CompareOp::LessThan),
            Self::LessOrEqual => PredicateKind::Comparison(CompareOp::LessOrEqual),
            Self::Like => PredicateKind::Pattern,
            Self::In => PredicateKind::Membership { negated: false },
            Self::NotIn => PredicateKind::Membership { negated: true },
            Self::Between => PredicateKind::Range,
            Self::IsNull => PredicateKind::NullCheck { negated: false },
            Self::IsNotNull => PredicateKind::NullCheck { negated: true },
        }
    }
}
