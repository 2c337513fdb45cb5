//! sift — typed filter/sort specification builder.
//!
//! Converts compact filter and sort expressions (typically HTTP query
//! parameters) into SeaQuery predicates and ordering clauses:
//! - SpecificationManager: merges the request channels into item lists
//! - FilterItem / OrderByItem: validated items awaiting production
//! - QueryContext: attribute path resolution with join deduplication
//! - ValueConverter: raw string to typed value coercion
//! - QuerySpecification: the artifact applied to a SelectStatement
//!
//! The crate only builds the predicate/ordering specification; executing
//! the resulting statement belongs to the caller.

pub mod context;
pub mod error;
pub mod item;
pub mod manager;
pub mod operator;
pub mod parser;
pub mod predicate;
pub mod spec;
pub mod value;

pub use context::{
    AppliedJoin, JoinDefinition, JoinKind, QueryContext, ResolvedAttribute, SpecQueryConfig,
};
pub use error::{SpecError, SpecResult};
pub use item::{FilterItem, OrderByItem, OrderingContribution, SortDirection};
pub use manager::{SpecificationManager, SpecificationManagerBuilder, SpecificationRequest};
pub use operator::{CompareOp, FilterOperator, PredicateKind, ValueArity};
pub use parser::{
    DelimitedFilterParser, DelimitedSortParser, JsonFilterParser, JsonSortParser,
    MultiFilterParser, MultiSortParser, SingleFilterParser, SingleSortParser,
};
pub use spec::QuerySpecification;
pub use value::{AttributeType, ValueConverter};
