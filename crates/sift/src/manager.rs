//! Specification request aggregation.
//!
//! A request can deliver filtering and sorting intent over three parallel
//! channels each: a single combined expression, a list of independent
//! expressions, and pre-built items. The manager parses whichever
//! channels are populated and concatenates the results in fixed
//! precedence order: combined expression first, then the expression list,
//! then supplied items.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::item::{FilterItem, OrderByItem};
use crate::parser::{MultiFilterParser, MultiSortParser, SingleFilterParser, SingleSortParser};
use crate::spec::QuerySpecification;

/// Raw filtering and sorting intent, typically bound from HTTP query
/// parameters. Every channel is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificationRequest {
    /// Single combined filter expression.
    pub filter_param: Option<String>,

    /// Independent filter expressions.
    pub filter_params: Option<Vec<String>>,

    /// Pre-built filter items.
    pub filter_items: Option<Vec<FilterItem>>,

    /// Single combined sort expression.
    pub sort_param: Option<String>,

    /// Independent sort expressions.
    pub sort_params: Option<Vec<String>>,

    /// Pre-built order-by items.
    pub sort_items: Option<Vec<OrderByItem>>,
}

impl SpecificationRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the combined filter expression.
    pub fn with_filter_param(mut self, raw: impl Into<String>) -> Self {
        self.filter_param = Some(raw.into());
        self
    }

    /// Set the independent filter expressions.
    pub fn with_filter_params(mut self, raws: Vec<String>) -> Self {
        self.filter_params = Some(raws);
        self
    }

    /// Set the pre-built filter items.
    pub fn with_filter_items(mut self, items: Vec<FilterItem>) -> Self {
        self.filter_items = Some(items);
        self
    }

    /// Set the combined sort expression.
    pub fn with_sort_param(mut self, raw: impl Into<String>) -> Self {
        self.sort_param = Some(raw.into());
        self
    }

    /// Set the independent sort expressions.
    pub fn with_sort_params(mut self, raws: Vec<String>) -> Self {
        self.sort_params = Some(raws);
        self
    }

    /// Set the pre-built order-by items.
    pub fn with_sort_items(mut self, items: Vec<OrderByItem>) -> Self {
        self.sort_items = Some(items);
        self
    }
}

/// Merges the request channels into final item lists.
///
/// Parsers are optional; a populated channel without its parser is a
/// configuration error, an absent channel is simply skipped.
#[derive(Default)]
pub struct SpecificationManager {
    single_filter_parser: Option<Box<dyn SingleFilterParser>>,
    multi_filter_parser: Option<Box<dyn MultiFilterParser>>,
    single_sort_parser: Option<Box<dyn SingleSortParser>>,
    multi_sort_parser: Option<Box<dyn MultiSortParser>>,
}

impl SpecificationManager {
    /// Start building a manager.
    pub fn builder() -> SpecificationManagerBuilder {
        SpecificationManagerBuilder::default()
    }

    /// Produce the filter item list for a request, in channel precedence
    /// order: parsed combined expression, parsed expression list,
    /// supplied items.
    pub fn produce_filter_items(
        &self,
        request: &SpecificationRequest,
    ) -> SpecResult<Vec<FilterItem>> {
        let mut items = Vec::new();

        if let Some(raw) = &request.filter_param {
            let parser = self
                .single_filter_parser
                .as_deref()
                .ok_or_else(|| missing_parser("filter_param"))?;
            items.extend(parser.parse_filter_param(raw)?);
        }
        if let Some(raws) = &request.filter_params {
            let parser = self
                .multi_filter_parser
                .as_deref()
                .ok_or_else(|| missing_parser("filter_params"))?;
            items.extend(parser.parse_filter_params(raws)?);
        }
        if let Some(supplied) = &request.filter_items {
            items.extend(supplied.iter().cloned());
        }

        tracing::debug!(count = items.len(), "produced filter items");
        Ok(items)
    }

    /// Produce the order-by item list for a request, with the same
    /// channel precedence as the filter side.
    pub fn produce_order_by_items(
        &self,
        request: &SpecificationRequest,
    ) -> SpecResult<Vec<OrderByItem>> {
        let mut items = Vec::new();

        if let Some(raw) = &request.sort_param {
            let parser = self
                .single_sort_parser
                .as_deref()
                .ok_or_else(|| missing_parser("sort_param"))?;
            items.extend(parser.parse_sort_param(raw)?);
        }
        if let Some(raws) = &request.sort_params {
            let parser = self
                .multi_sort_parser
                .as_deref()
                .ok_or_else(|| missing_parser("sort_params"))?;
            items.extend(parser.parse_sort_params(raws)?);
        }
        if let Some(supplied) = &request.sort_items {
            items.extend(supplied.iter().cloned());
        }

        tracing::debug!(count = items.len(), "produced order-by items");
        Ok(items)
    }

    /// Produce the complete specification artifact for a request.
    pub fn produce(&self, request: &SpecificationRequest) -> SpecResult<QuerySpecification> {
        Ok(QuerySpecification::new(
            self.produce_filter_items(request)?,
            self.produce_order_by_items(request)?,
        ))
    }
}

fn missing_parser(channel: &'static str) -> SpecError {
    tracing::error!(channel, "request channel populated but no parser configured");
    SpecError::ParserNotProvided { channel }
}

/// Builder for `SpecificationManager`.
#[derive(Default)]
pub struct SpecificationManagerBuilder {
    manager: SpecificationManager,
}

impl SpecificationManagerBuilder {
    /// Configure the combined filter expression parser.
    pub fn with_single_filter_parser<P: SingleFilterParser + 'static>(mut self, parser: P) -> Self {
        self.manager.single_filter_parser = Some(Box::new(parser));
        self
    }

    /// Configure the independent filter expressions parser.
    pub fn with_multi_filter_parser<P: MultiFilterParser + 'static>(mut self, parser: P) -> Self {
        self.manager.multi_filter_parser = Some(Box::new(parser));
        self
    }

    /// Configure the combined sort expression parser.
    pub fn with_single_sort_parser<P: SingleSortParser + 'static>(mut self, parser: P) -> Self {
        self.manager.single_sort_parser = Some(Box::new(parser));
        self
    }

    /// Configure the independent sort expressions parser.
    pub fn with_multi_sort_parser<P: MultiSortParser + 'static>(mut self, parser: P) -> Self {
        self.manager.multi_sort_parser = Some(Box::new(parser));
        self
    }

    /// Finish building.
    pub fn build(self) -> SpecificationManager {
        self.manager
    }
}
