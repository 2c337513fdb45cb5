//! Expression parsers for the four request channels.
//!
//! Two grammars ship with the crate:
//! - a combined JSON-array expression for the single-parameter channels,
//!   e.g. `[["name","eq","John"],["genre","in",["drama","noir"]]]` and
//!   `[["title","asc"],["year","desc"]]`;
//! - a delimited expression for the list channels, one filter or sort per
//!   entry, e.g. `year:between:1990,2000` and `title:asc` (separator
//!   configurable).
//!
//! Parsers only produce structured items; value typing and path
//! resolution happen later, at predicate production time.

use crate::error::{SpecError, SpecResult};
use crate::item::{FilterItem, OrderByItem, SortDirection};
use crate::operator::{FilterOperator, PredicateKind, ValueArity};

/// Parses the single combined filter expression channel.
pub trait SingleFilterParser: Send + Sync {
    fn parse_filter_param(&self, raw: &str) -> SpecResult<Vec<FilterItem>>;
}

/// Parses the list-of-independent-filter-expressions channel.
pub trait MultiFilterParser: Send + Sync {
    fn parse_filter_params(&self, raws: &[String]) -> SpecResult<Vec<FilterItem>>;
}

/// Parses the single combined sort expression channel.
pub trait SingleSortParser: Send + Sync {
    fn parse_sort_param(&self, raw: &str) -> SpecResult<Vec<OrderByItem>>;
}

/// Parses the list-of-independent-sort-expressions channel.
pub trait MultiSortParser: Send + Sync {
    fn parse_sort_params(&self, raws: &[String]) -> SpecResult<Vec<OrderByItem>>;
}

fn malformed(raw: &str, reason: impl Into<String>) -> SpecError {
    SpecError::MalformedExpression {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

/// One JSON scalar rendered as a raw string value.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build a filter item from an attribute, operator token, and raw values,
/// picking the variant that matches the operator's arity.
fn build_filter_item(
    raw: &str,
    attribute: &str,
    token: &str,
    values: Vec<String>,
) -> SpecResult<FilterItem> {
    let operator = FilterOperator::from_token(token)?;
    match operator.arity() {
        ValueArity::Single => {
            if values.len() > 1 {
                return Err(malformed(
                    raw,
                    format!("operator `{token}` takes a single value"),
                ));
            }
            let value = values.into_iter().next().unwrap_or_default();
            if value.is_empty()
                && !matches!(operator.predicate_kind(), PredicateKind::NullCheck { .. })
            {
                return Err(malformed(raw, format!("operator `{token}` requires a value")));
            }
            FilterItem::single(attribute, operator, value)
        }
        ValueArity::Pair | ValueArity::Many => {
            if values.is_empty() {
                return Err(malformed(raw, format!("operator `{token}` requires values")));
            }
            FilterItem::multi(attribute, operator, values)
        }
    }
}

/// Combined filter expression parser: a JSON array of
/// `[attribute, operator, value...]` entries. Multi-value operators may
/// carry their values either as trailing elements or as one nested array.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFilterParser;

impl JsonFilterParser {
    pub fn new() -> Self {
        Self
    }
}

impl SingleFilterParser for JsonFilterParser {
    fn parse_filter_param(&self, raw: &str) -> SpecResult<Vec<FilterItem>> {
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| malformed(raw, format!("invalid JSON: {e}")))?;
        let entries = parsed
            .as_array()
            .ok_or_else(|| malformed(raw, "expected a JSON array of filter entries"))?;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let parts = entry
                .as_array()
                .ok_or_else(|| malformed(raw, "each filter entry must be an array"))?;
            if parts.len() < 2 {
                return Err(malformed(
                    raw,
                    "each filter entry needs at least an attribute and an operator",
                ));
            }
            let attribute = parts[0]
                .as_str()
                .ok_or_else(|| malformed(raw, "attribute must be a string"))?;
            let token = parts[1]
                .as_str()
                .ok_or_else(|| malformed(raw, "operator must be a string"))?;

            let tail = &parts[2..];
            let values = if let [serde_json::Value::Array(nested)] = tail {
                nested.iter().map(scalar_to_string).collect::<Option<Vec<_>>>()
            } else {
                tail.iter().map(scalar_to_string).collect::<Option<Vec<_>>>()
            }
            .ok_or_else(|| malformed(raw, "values must be scalars"))?;

            items.push(build_filter_item(raw, attribute, token, values)?);
        }
        Ok(items)
    }
}

/// Independent filter expression parser: `attribute<sep>operator<sep>value`,
/// with multi values comma-separated inside the value part.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedFilterParser {
    separator: char,
}

impl DelimitedFilterParser {
    pub fn new() -> Self {
        Self { separator: ':' }
    }

    /// Use a custom part separator.
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }
}

impl Default for DelimitedFilterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiFilterParser for DelimitedFilterParser {
    fn parse_filter_params(&self, raws: &[String]) -> SpecResult<Vec<FilterItem>> {
        let mut items = Vec::with_capacity(raws.len());
        for raw in raws {
            let mut parts = raw.splitn(3, self.separator);
            let attribute = parts
                .next()
                .filter(|part| !part.is_empty())
                .ok_or_else(|| malformed(raw, "missing attribute"))?;
            let token = parts
                .next()
                .filter(|part| !part.is_empty())
                .ok_or_else(|| malformed(raw, "missing operator"))?;
            let value_part = parts.next().unwrap_or_default();

            let operator = FilterOperator::from_token(token)?;
            let values = match operator.arity() {
                ValueArity::Single => vec![value_part.to_string()],
                ValueArity::Pair | ValueArity::Many => value_part
                    .split(',')
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            };
            items.push(build_filter_item(raw, attribute, token, values)?);
        }
        Ok(items)
    }
}

/// Combined sort expression parser: a JSON array of `[attribute, direction]`
/// pairs; direction defaults to ascending when omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSortParser;

impl JsonSortParser {
    pub fn new() -> Self {
        Self
    }
}

impl SingleSortParser for JsonSortParser {
    fn parse_sort_param(&self, raw: &str) -> SpecResult<Vec<OrderByItem>> {
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| malformed(raw, format!("invalid JSON: {e}")))?;
        let entries = parsed
            .as_array()
            .ok_or_else(|| malformed(raw, "expected a JSON array of sort entries"))?;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let parts = entry
                .as_array()
                .ok_or_else(|| malformed(raw, "each sort entry must be an array"))?;
            if parts.is_empty() || parts.len() > 2 {
                return Err(malformed(raw, "each sort entry is [attribute, direction?]"));
            }
            let attribute = parts[0]
                .as_str()
                .ok_or_else(|| malformed(raw, "attribute must be a string"))?;
            let direction = match parts.get(1) {
                None => SortDirection::Asc,
                Some(value) => {
                    let token = value
                        .as_str()
                        .ok_or_else(|| malformed(raw, "direction must be a string"))?;
                    SortDirection::from_token(token)
                        .ok_or_else(|| malformed(raw, format!("unknown direction `{token}`")))?
                }
            };
            items.push(OrderByItem::new(attribute, direction)?);
        }
        Ok(items)
    }
}

/// Independent sort expression parser: `attribute<sep>direction`, with the
/// direction defaulting to ascending when omitted.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedSortParser {
    separator: char,
}

impl DelimitedSortParser {
    pub fn new() -> Self {
        Self { separator: ':' }
    }

    /// Use a custom part separator.
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }
}

impl Default for DelimitedSortParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSortParser for DelimitedSortParser {
    fn parse_sort_params(&self, raws: &[String]) -> SpecResult<Vec<OrderByItem>> {
        let mut items = Vec::with_capacity(raws.len());
        for raw in raws {
            let mut parts = raw.splitn(2, self.separator);
            let attribute = parts
                .next()
                .filter(|part| !part.is_empty())
                .ok_or_else(|| malformed(raw, "missing attribute"))?;
            let direction = match parts.next() {
                None | Some("") => SortDirection::Asc,
                Some(token) => SortDirection::from_token(token)
                    .ok_or_else(|| malformed(raw, format!("unknown direction `{token}`")))?,
            };
            items.push(OrderByItem::new(attribute, direction)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn json_filter_mixed_arities() {
        let items = JsonFilterParser::new()
            .parse_filter_param(
                r#"[["name","eq","John"],["year","between","1990","2000"],["genre","in",["drama","noir"]]]"#,
            )
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            FilterItem::single("name", FilterOperator::Equal, "John").unwrap()
        );
        assert_eq!(
            items[1],
            FilterItem::multi(
                "year",
                FilterOperator::Between,
                vec!["1990".into(), "2000".into()]
            )
            .unwrap()
        );
        assert_eq!(
            items[2],
            FilterItem::multi(
                "genre",
                FilterOperator::In,
                vec!["drama".into(), "noir".into()]
            )
            .unwrap()
        );
    }

    #[test]
    fn json_filter_numbers_become_raw_strings() {
        let items = JsonFilterParser::new()
            .parse_filter_param(r#"[["year","gte",1994]]"#)
            .unwrap();
        assert_eq!(
            items[0],
            FilterItem::single("year", FilterOperator::GreaterOrEqual, "1994").unwrap()
        );
    }

    #[test]
    fn json_filter_null_check_needs_no_value() {
        let items = JsonFilterParser::new()
            .parse_filter_param(r#"[["deleted_at","is_null"]]"#)
            .unwrap();
        assert_eq!(items[0].operator(), FilterOperator::IsNull);
    }

    #[test]
    fn json_filter_rejects_bad_json() {
        let err = JsonFilterParser::new()
            .parse_filter_param("not-json")
            .unwrap_err();
        assert!(matches!(err, SpecError::MalformedExpression { .. }));
    }

    #[test]
    fn json_filter_rejects_unknown_operator() {
        let err = JsonFilterParser::new()
            .parse_filter_param(r#"[["name","contains","x"]]"#)
            .unwrap_err();
        assert!(matches!(err, SpecError::UnsupportedOperator { .. }));
    }

    #[test]
    fn json_filter_rejects_missing_value() {
        let err = JsonFilterParser::new()
            .parse_filter_param(r#"[["name","eq"]]"#)
            .unwrap_err();
        assert!(matches!(err, SpecError::MalformedExpression { .. }));
    }

    #[test]
    fn delimited_filter_single_and_multi() {
        let raws = vec!["name:eq:John".to_string(), "year:in:1994,1999".to_string()];
        let items = DelimitedFilterParser::new().parse_filter_params(&raws).unwrap();

        assert_eq!(
            items[0],
            FilterItem::single("name", FilterOperator::Equal, "John").unwrap()
        );
        assert_eq!(
            items[1],
            FilterItem::multi(
                "year",
                FilterOperator::In,
                vec!["1994".into(), "1999".into()]
            )
            .unwrap()
        );
    }

    #[test]
    fn delimited_filter_custom_separator() {
        let raws = vec!["name|eq|Jo:hn".to_string()];
        let items = DelimitedFilterParser::with_separator('|')
            .parse_filter_params(&raws)
            .unwrap();
        assert_eq!(
            items[0],
            FilterItem::single("name", FilterOperator::Equal, "Jo:hn").unwrap()
        );
    }

    #[test]
    fn delimited_filter_missing_parts() {
        let err = DelimitedFilterParser::new()
            .parse_filter_params(&["name".to_string()])
            .unwrap_err();
        assert!(matches!(err, SpecError::MalformedExpression { .. }));
    }

    #[test]
    fn json_sort_defaults_direction() {
        let items = JsonSortParser::new()
            .parse_sort_param(r#"[["title"],["year","desc"]]"#)
            .unwrap();
        assert_eq!(items[0].direction(), SortDirection::Asc);
        assert_eq!(items[1].direction(), SortDirection::Desc);
    }

    #[test]
    fn json_sort_rejects_unknown_direction() {
        let err = JsonSortParser::new()
            .parse_sort_param(r#"[["title","down"]]"#)
            .unwrap_err();
        assert!(matches!(err, SpecError::MalformedExpression { .. }));
    }

    #[test]
    fn delimited_sort_parses_direction() {
        let raws = vec!["title:asc".to_string(), "year:desc".to_string()];
        let items = DelimitedSortParser::new().parse_sort_params(&raws).unwrap();
        assert_eq!(items[0].attribute(), "title");
        assert_eq!(items[1].direction(), SortDirection::Desc);
    }

    #[test]
    fn delimited_sort_defaults_direction() {
        let items = DelimitedSortParser::new()
            .parse_sort_params(&["title".to_string()])
            .unwrap();
        assert_eq!(items[0].direction(), SortDirection::Asc);
    }
}
