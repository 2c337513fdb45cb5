//! Filter and order-by items.
//!
//! Items are the validated, structured form of a filter or sort
//! expression: an attribute plus an operator and its raw value(s), or an
//! attribute plus a direction. Construction fails fast on structurally
//! impossible items (empty attribute, empty value list); compatibility
//! and data problems (operator arity, value coercion, path resolution)
//! surface later, when the item is asked to produce its predicate or
//! ordering contribution.

use sea_query::{Expr, ExprTrait, Order, SimpleExpr};
use serde::{Deserialize, Serialize};

use crate::context::QueryContext;
use crate::error::{SpecError, SpecResult};
use crate::operator::{FilterOperator, PredicateKind, ValueArity};
use crate::predicate;
use crate::value::ValueConverter;

/// A validated (attribute, operator, value-or-values) triple awaiting
/// predicate production.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterItem {
    /// A filter carrying exactly one raw value.
    Single {
        attribute: String,
        operator: FilterOperator,
        value: String,
    },
    /// A filter carrying an ordered, non-empty list of raw values.
    Multi {
        attribute: String,
        operator: FilterOperator,
        values: Vec<String>,
    },
}

impl FilterItem {
    /// Create a single-value filter item.
    pub fn single(
        attribute: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> SpecResult<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(invalid_filter("attribute is empty"));
        }
        Ok(Self::Single {
            attribute,
            operator,
            value: value.into(),
        })
    }

    /// Create a multi-value filter item.
    pub fn multi(
        attribute: impl Into<String>,
        operator: FilterOperator,
        values: Vec<String>,
    ) -> SpecResult<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(invalid_filter("attribute is empty"));
        }
        if values.is_empty() {
            return Err(invalid_filter("value list is empty"));
        }
        Ok(Self::Multi {
            attribute,
            operator,
            values,
        })
    }

    /// The logical attribute this filter applies to.
    pub fn attribute(&self) -> &str {
        match self {
            Self::Single { attribute, .. } | Self::Multi { attribute, .. } => attribute,
        }
    }

    /// The filter operator.
    pub fn operator(&self) -> FilterOperator {
        match self {
            Self::Single { operator, .. } | Self::Multi { operator, .. } => *operator,
        }
    }

    fn item_kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single-value",
            Self::Multi { .. } => "multi-value",
        }
    }

    fn arity_mismatch(&self) -> SpecError {
        SpecError::OperatorArityMismatch {
            operator: self.operator().token(),
            item_kind: self.item_kind(),
        }
    }

    /// Validate that the operator's declared arity matches this variant.
    ///
    /// Performed before any context mutation so a mismatching item never
    /// registers joins.
    fn ensure_arity(&self) -> SpecResult<()> {
        match (self, self.operator().arity()) {
            (Self::Single { .. }, ValueArity::Single) => Ok(()),
            (Self::Multi { values, .. }, ValueArity::Pair) => {
                if values.len() == 2 {
                    Ok(())
                } else {
                    Err(self.arity_mismatch())
                }
            }
            (Self::Multi { .. }, ValueArity::Many) => Ok(()),
            _ => Err(self.arity_mismatch()),
        }
    }

    /// Produce the SQL predicate for this filter.
    ///
    /// Resolves the attribute through the context (creating or reusing
    /// joins), converts each raw value to the attribute's declared type,
    /// and dispatches to the operator's predicate strategy. The `like`
    /// operator is the exception: its value feeds the pattern as text
    /// regardless of the attribute's declared type.
    pub fn produce(
        &self,
        ctx: &mut QueryContext<'_>,
        converter: &ValueConverter,
    ) -> SpecResult<SimpleExpr> {
        self.ensure_arity()?;

        let resolved = ctx.resolve(self.attribute())?;
        let target = ctx.attribute_type(self.attribute());
        let column = resolved.expr();

        match (self, self.operator().predicate_kind()) {
            (Self::Single { value, .. }, PredicateKind::Comparison(op)) => {
                let converted = converter.convert(value, target)?;
                Ok(predicate::comparison(column, op, converted))
            }
            (Self::Single { value, .. }, PredicateKind::Pattern) => {
                Ok(predicate::pattern(column, value))
            }
            (Self::Single { .. }, PredicateKind::NullCheck { negated }) => {
                Ok(predicate::null_check(column, negated))
            }
            (Self::Multi { values, .. }, PredicateKind::Membership { negated }) => {
                let converted = values
                    .iter()
                    .map(|raw| converter.convert(raw, target))
                    .collect::<SpecResult<Vec<_>>>()?;
                Ok(predicate::membership(column, converted, negated))
            }
            (Self::Multi { values, .. }, PredicateKind::Range) => {
                if let [low, high] = values.as_slice() {
                    let low = converter.convert(low, target)?;
                    let high = converter.convert(high, target)?;
                    Ok(predicate::range(column, low, high))
                } else {
                    Err(self.arity_mismatch())
                }
            }
            // Unreachable after ensure_arity; kept as a defensive check.
            _ => Err(self.arity_mismatch()),
        }
    }
}

fn invalid_filter(reason: &str) -> SpecError {
    SpecError::InvalidConstruction {
        kind: "filter item",
        reason: reason.to_string(),
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction token (`asc` / `desc`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn to_sea(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// The ordering clauses contributed by one order-by item, in emission
/// order.
pub type OrderingContribution = Vec<(SimpleExpr, Order)>;

/// A validated (attribute, direction) pair awaiting ordering production.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderByItem {
    attribute: String,
    #[serde(default)]
    direction: SortDirection,
}

impl OrderByItem {
    /// Create an order-by item.
    pub fn new(attribute: impl Into<String>, direction: SortDirection) -> SpecResult<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(SpecError::InvalidConstruction {
                kind: "order-by item",
                reason: "attribute is empty".to_string(),
            });
        }
        Ok(Self {
            attribute,
            direction,
        })
    }

    /// The logical attribute this sorts by.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Produce the ordering clauses for this item.
    ///
    /// Emits two clauses: first a synthetic null-rank key ascending, then
    /// the attribute itself in the requested direction. The null-rank key
    /// is -1 for null rows when ascending and 1 when descending, 0
    /// otherwise, so nulls sort first ascending and last descending
    /// regardless of the storage engine's default null placement.
    pub fn produce(&self, ctx: &mut QueryContext<'_>) -> SpecResult<OrderingContribution> {
        let resolved = ctx.resolve(&self.attribute)?;
        let column = resolved.expr();

        let rank = match self.direction {
            SortDirection::Asc => -1,
            SortDirection::Desc => 1,
        };
        let null_rank = Expr::case(column.clone().is_null(), Expr::val(rank))
            .finally(Expr::val(0));

        Ok(vec![
            (null_rank.into(), Order::Asc),
            (column, self.direction.to_sea()),
        ])
    }
}
