//! Attribute path resolution and join deduplication.
//!
//! A `SpecQueryConfig` describes how logical attribute names map onto the
//! queried tables: direct columns, dotted paths across relations, declared
//! value types, and whether the final query needs DISTINCT. A
//! `QueryContext` is created fresh for every query build and resolves
//! attribute paths against that configuration, creating each relation
//! join at most once per traversal prefix.

use std::collections::HashMap;

use sea_query::{Alias, Expr, SelectStatement, SimpleExpr};
use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::value::AttributeType;

/// SQL join types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn to_sea(self) -> sea_query::JoinType {
        match self {
            Self::Inner => sea_query::JoinType::InnerJoin,
            Self::Left => sea_query::JoinType::LeftJoin,
            Self::Right => sea_query::JoinType::RightJoin,
        }
    }
}

/// Join specification for one relation segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinDefinition {
    /// Relation name used in dotted attribute paths.
    pub relation: String,

    /// Target table to join.
    pub target_table: String,

    /// Join type.
    #[serde(default)]
    pub join_type: JoinKind,

    /// Column on the parent side of the ON condition.
    pub local_field: String,

    /// Column on the joined table side of the ON condition.
    pub foreign_field: String,
}

/// Static query configuration shared by all builds against one entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecQueryConfig {
    /// Join definitions keyed by relation name.
    #[serde(default)]
    joins: HashMap<String, JoinDefinition>,

    /// Logical attribute name to actual (possibly dotted) path.
    #[serde(default)]
    attribute_paths: HashMap<String, String>,

    /// Declared native types per logical attribute; unmapped attributes
    /// are treated as text.
    #[serde(default)]
    attribute_types: HashMap<String, AttributeType>,

    /// Whether the final query must select DISTINCT rows, typically to
    /// compensate for row multiplication introduced by joins.
    #[serde(default)]
    distinct: bool,
}

impl SpecQueryConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a join definition for a relation name.
    pub fn with_join(mut self, join: JoinDefinition) -> Self {
        self.joins.insert(join.relation.clone(), join);
        self
    }

    /// Map a logical attribute name to an actual path.
    pub fn with_attribute_path(
        mut self,
        attribute: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.attribute_paths.insert(attribute.into(), path.into());
        self
    }

    /// Declare the native type of a logical attribute.
    pub fn with_attribute_type(
        mut self,
        attribute: impl Into<String>,
        target: AttributeType,
    ) -> Self {
        self.attribute_types.insert(attribute.into(), target);
        self
    }

    /// Require DISTINCT on the final query.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// The declared type of a logical attribute, defaulting to text.
    pub fn attribute_type(&self, attribute: &str) -> AttributeType {
        self.attribute_types
            .get(attribute)
            .copied()
            .unwrap_or_default()
    }
}

/// A join registered by the context during path resolution.
#[derive(Debug, Clone)]
pub struct AppliedJoin {
    /// Join type.
    pub join_type: JoinKind,
    /// Target table.
    pub target_table: String,
    /// Alias the joined table is known by.
    pub alias: String,
    /// Parent side of the ON condition: (table or alias, column).
    pub on_parent: (String, String),
    /// Joined side of the ON condition: (alias, column).
    pub on_joined: (String, String),
}

/// Outcome of resolving a logical attribute path.
#[derive(Debug, Clone)]
pub struct ResolvedAttribute {
    /// Table or join alias the column lives on.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Whether this resolution registered at least one new join.
    pub created_join: bool,
}

impl ResolvedAttribute {
    /// Column expression for this attribute.
    pub fn expr(&self) -> SimpleExpr {
        Expr::col((Alias::new(&self.table), Alias::new(&self.column))).into()
    }
}

/// Per-build resolution state.
///
/// Owns a join cache keyed by relation traversal prefix so that sibling
/// attributes under the same relation chain reuse one join. Must not be
/// reused across independent query builds.
pub struct QueryContext<'a> {
    config: &'a SpecQueryConfig,
    base_table: String,
    join_cache: HashMap<String, String>,
    joins: Vec<AppliedJoin>,
}

impl<'a> QueryContext<'a> {
    /// Create a context for one query build rooted at `base_table`.
    pub fn new(config: &'a SpecQueryConfig, base_table: impl Into<String>) -> Self {
        Self {
            config,
            base_table: base_table.into(),
            join_cache: HashMap::new(),
            joins: Vec::new(),
        }
    }

    /// The table this build is rooted at.
    pub fn base_table(&self) -> &str {
        &self.base_table
    }

    /// Whether the configuration requires a DISTINCT query.
    pub fn distinct(&self) -> bool {
        self.config.distinct
    }

    /// The declared type of a logical attribute.
    pub fn attribute_type(&self, attribute: &str) -> AttributeType {
        self.config.attribute_type(attribute)
    }

    /// Joins registered so far, in creation order.
    pub fn joins(&self) -> &[AppliedJoin] {
        &self.joins
    }

    /// Resolve a logical attribute into a table/column pair, creating or
    /// reusing joins for every relation segment of its path.
    ///
    /// Attributes without a configured path mapping are treated as direct
    /// columns on the query root.
    pub fn resolve(&mut self, attribute: &str) -> SpecResult<ResolvedAttribute> {
        if attribute.is_empty() {
            return Err(SpecError::AttributeResolution {
                path: attribute.to_string(),
                reason: "attribute path is empty".to_string(),
            });
        }

        let path = self
            .config
            .attribute_paths
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| attribute.to_string());

        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SpecError::AttributeResolution {
                path: path.clone(),
                reason: "path contains an empty segment".to_string(),
            });
        }

        let mut parent = self.base_table.clone();
        let mut created_join = false;

        for depth in 0..segments.len() - 1 {
            let relation = segments[depth];
            let prefix = segments[..=depth].join(".");

            if let Some(alias) = self.join_cache.get(&prefix) {
                parent = alias.clone();
                continue;
            }

            let join = self.config.joins.get(relation).ok_or_else(|| {
                SpecError::AttributeResolution {
                    path: path.clone(),
                    reason: format!("no join configured for relation `{relation}`"),
                }
            })?;

            // Prefix-derived alias keeps nested chains distinct.
            let alias = segments[..=depth].join("_");
            tracing::debug!(prefix = %prefix, alias = %alias, "registering join");

            self.joins.push(AppliedJoin {
                join_type: join.join_type,
                target_table: join.target_table.clone(),
                alias: alias.clone(),
                on_parent: (parent.clone(), join.local_field.clone()),
                on_joined: (alias.clone(), join.foreign_field.clone()),
            });
            self.join_cache.insert(prefix, alias.clone());
            created_join = true;
            parent = alias;
        }

        Ok(ResolvedAttribute {
            table: parent,
            column: segments[segments.len() - 1].to_string(),
            created_join,
        })
    }

    /// Apply every registered join to a select statement, in creation order.
    pub fn apply_joins(&self, select: &mut SelectStatement) {
        for join in &self.joins {
            let on_condition = Expr::col((
                Alias::new(&join.on_parent.0),
                Alias::new(&join.on_parent.1),
            ))
            .equals((Alias::new(&join.on_joined.0), Alias::new(&join.on_joined.1)));

            select.join_as(
                join.join_type.to_sea(),
                Alias::new(&join.target_table),
                Alias::new(&join.alias),
                on_condition,
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn genre_join() -> JoinDefinition {
        JoinDefinition {
            relation: "genre".to_string(),
            target_table: "genres".to_string(),
            join_type: JoinKind::Left,
            local_field: "genre_id".to_string(),
            foreign_field: "id".to_string(),
        }
    }

    #[test]
    fn bare_attribute_resolves_on_root() {
        let config = SpecQueryConfig::new();
        let mut ctx = QueryContext::new(&config, "movie");

        let resolved = ctx.resolve("title").unwrap();
        assert_eq!(resolved.table, "movie");
        assert_eq!(resolved.column, "title");
        assert!(!resolved.created_join);
        assert!(ctx.joins().is_empty());
    }

    #[test]
    fn mapped_attribute_follows_configured_path() {
        let config = SpecQueryConfig::new()
            .with_join(genre_join())
            .with_attribute_path("genreName", "genre.name");
        let mut ctx = QueryContext::new(&config, "movie");

        let resolved = ctx.resolve("genreName").unwrap();
        assert_eq!(resolved.table, "genre");
        assert_eq!(resolved.column, "name");
        assert!(resolved.created_join);
        assert_eq!(ctx.joins().len(), 1);
        assert_eq!(ctx.joins()[0].target_table, "genres");
    }

    #[test]
    fn sibling_attributes_share_one_join() {
        let config = SpecQueryConfig::new().with_join(genre_join());
        let mut ctx = QueryContext::new(&config, "movie");

        let first = ctx.resolve("genre.name").unwrap();
        let second = ctx.resolve("genre.code").unwrap();

        assert!(first.created_join);
        assert!(!second.created_join);
        assert_eq!(ctx.joins().len(), 1);
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn nested_chain_joins_each_prefix_once() {
        let config = SpecQueryConfig::new()
            .with_join(genre_join())
            .with_join(JoinDefinition {
                relation: "category".to_string(),
                target_table: "categories".to_string(),
                join_type: JoinKind::Inner,
                local_field: "category_id".to_string(),
                foreign_field: "id".to_string(),
            });
        let mut ctx = QueryContext::new(&config, "movie");

        let resolved = ctx.resolve("genre.category.label").unwrap();
        assert_eq!(ctx.joins().len(), 2);
        assert_eq!(ctx.joins()[0].alias, "genre");
        assert_eq!(ctx.joins()[1].alias, "genre_category");
        assert_eq!(ctx.joins()[1].on_parent.0, "genre");
        assert_eq!(resolved.table, "genre_category");

        // Repeat resolution reuses both cached joins.
        let again = ctx.resolve("genre.category.label").unwrap();
        assert!(!again.created_join);
        assert_eq!(ctx.joins().len(), 2);
    }

    #[test]
    fn unconfigured_relation_fails_resolution() {
        let config = SpecQueryConfig::new();
        let mut ctx = QueryContext::new(&config, "movie");

        let err = ctx.resolve("genre.name").unwrap_err();
        assert!(matches!(err, SpecError::AttributeResolution { .. }));
        assert!(ctx.joins().is_empty());
    }

    #[test]
    fn applied_joins_render_in_creation_order() {
        let config = SpecQueryConfig::new().with_join(genre_join());
        let mut ctx = QueryContext::new(&config, "movie");
        ctx.resolve("genre.name").unwrap();

        let mut select = sea_query::Query::select();
        select
            .column(sea_query::Asterisk)
            .from(Alias::new("movie"));
        ctx.apply_joins(&mut select);

        let sql = select.to_string(sea_query::PostgresQueryBuilder);
        assert!(sql.contains("LEFT JOIN \"genres\" AS \"genre\""), "{sql}");
        assert!(
            sql.contains("\"movie\".\"genre_id\" = \"genre\".\"id\""),
            "{sql}"
        );
    }
}
