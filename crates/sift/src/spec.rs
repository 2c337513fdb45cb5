//! The produced specification artifact.
//!
//! A `QuerySpecification` bundles the final filter and order-by item
//! lists and knows how to realize them against a select statement:
//! predicates are AND-combined, ordering contributions are appended in
//! item order, joins registered during resolution are applied once, and
//! DISTINCT is added when the configuration demands it.

use sea_query::{Cond, SelectStatement};

use crate::context::QueryContext;
use crate::error::SpecResult;
use crate::item::{FilterItem, OrderByItem, OrderingContribution};
use crate::value::ValueConverter;

/// Composable predicate/ordering specification for one query build.
#[derive(Debug, Clone, Default)]
pub struct QuerySpecification {
    filter_items: Vec<FilterItem>,
    order_by_items: Vec<OrderByItem>,
}

impl QuerySpecification {
    /// Bundle produced item lists into a specification.
    pub fn new(filter_items: Vec<FilterItem>, order_by_items: Vec<OrderByItem>) -> Self {
        Self {
            filter_items,
            order_by_items,
        }
    }

    /// The filter items, in aggregation order.
    pub fn filter_items(&self) -> &[FilterItem] {
        &self.filter_items
    }

    /// The order-by items, in aggregation order.
    pub fn order_by_items(&self) -> &[OrderByItem] {
        &self.order_by_items
    }

    /// AND-fold every filter item's predicate into one condition.
    ///
    /// An empty item list yields an empty condition, which renders as no
    /// WHERE clause at all.
    pub fn to_condition(
        &self,
        ctx: &mut QueryContext<'_>,
        converter: &ValueConverter,
    ) -> SpecResult<Cond> {
        let mut condition = Cond::all();
        for item in &self.filter_items {
            condition = condition.add(item.produce(ctx, converter)?);
        }
        Ok(condition)
    }

    /// The concatenated ordering clauses of every order-by item, in item
    /// order.
    pub fn to_ordering(&self, ctx: &mut QueryContext<'_>) -> SpecResult<OrderingContribution> {
        let mut ordering = Vec::with_capacity(self.order_by_items.len() * 2);
        for item in &self.order_by_items {
            ordering.extend(item.produce(ctx)?);
        }
        Ok(ordering)
    }

    /// Apply the whole specification to a select statement.
    ///
    /// Production runs first so every join the items need is registered
    /// in the context before joins are rendered; the statement is only
    /// touched once nothing can fail anymore.
    pub fn apply(
        &self,
        select: &mut SelectStatement,
        ctx: &mut QueryContext<'_>,
        converter: &ValueConverter,
    ) -> SpecResult<()> {
        let condition = self.to_condition(ctx, converter)?;
        let ordering = self.to_ordering(ctx)?;

        ctx.apply_joins(select);
        select.cond_where(condition);
        for (expr, order) in ordering {
            select.order_by_expr(expr, order);
        }
        if ctx.distinct() {
            select.distinct();
        }
        Ok(())
    }
}
