//! Specification error types.

use thiserror::Error;

use crate::value::AttributeType;

/// Errors produced while building a query specification.
#[derive(Debug, Error)]
pub enum SpecError {
    /// An item was constructed with an empty attribute, value, or value list.
    #[error("invalid {kind} construction: {reason}")]
    InvalidConstruction {
        /// Item kind ("filter item", "order-by item").
        kind: &'static str,
        /// What was missing or empty.
        reason: String,
    },

    /// A request channel is populated but the manager has no parser for it.
    #[error("no parser configured for populated request channel `{channel}`")]
    ParserNotProvided {
        /// Channel name (e.g. "filter_param").
        channel: &'static str,
    },

    /// The item variant does not match the operator's declared value arity.
    #[error("operator `{operator}` is not compatible with a {item_kind} filter item")]
    OperatorArityMismatch {
        /// Token of the offending operator.
        operator: &'static str,
        /// "single-value" or "multi-value".
        item_kind: &'static str,
    },

    /// An expression named an operator token outside the closed set.
    #[error("unsupported filter operator `{token}`")]
    UnsupportedOperator {
        /// The unrecognized token.
        token: String,
    },

    /// A raw value could not be coerced to the attribute's declared type.
    #[error("cannot convert value `{raw}` to {target}")]
    ValueConversion {
        /// The offending raw value.
        raw: String,
        /// The target attribute type.
        target: AttributeType,
    },

    /// A logical attribute path does not resolve under the active configuration.
    #[error("cannot resolve attribute path `{path}`: {reason}")]
    AttributeResolution {
        /// The logical path that failed to resolve.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A raw filter or sort expression could not be parsed.
    #[error("malformed expression `{raw}`: {reason}")]
    MalformedExpression {
        /// The raw expression text.
        raw: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Result type alias using SpecError.
pub type SpecResult<T> = Result<T, SpecError>;
