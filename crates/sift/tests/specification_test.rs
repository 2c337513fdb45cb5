#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end specification pipeline tests.
//!
//! Exercise the full path: raw request channels through the manager,
//! item production against a configured context, and application to a
//! select statement.

use sea_query::{Alias, Asterisk, PostgresQueryBuilder, Query, SelectStatement};
use sift::{
    AttributeType, DelimitedFilterParser, DelimitedSortParser, FilterItem, FilterOperator,
    JoinDefinition, JoinKind, JsonFilterParser, JsonSortParser, OrderByItem, QueryContext,
    SortDirection, SpecError, SpecQueryConfig, SpecificationManager, SpecificationRequest,
    ValueConverter,
};

fn movie_config() -> SpecQueryConfig {
    SpecQueryConfig::new()
        .with_join(JoinDefinition {
            relation: "genre".to_string(),
            target_table: "genres".to_string(),
            join_type: JoinKind::Left,
            local_field: "genre_id".to_string(),
            foreign_field: "id".to_string(),
        })
        .with_attribute_path("genreName", "genre.name")
        .with_attribute_type("year", AttributeType::Integer)
        .with_attribute_type("released", AttributeType::Boolean)
}

fn movie_manager() -> SpecificationManager {
    SpecificationManager::builder()
        .with_single_filter_parser(JsonFilterParser::new())
        .with_multi_filter_parser(DelimitedFilterParser::new())
        .with_single_sort_parser(JsonSortParser::new())
        .with_multi_sort_parser(DelimitedSortParser::new())
        .build()
}

fn base_select() -> SelectStatement {
    let mut select = Query::select();
    select.column(Asterisk).from(Alias::new("movie"));
    select
}

#[test]
fn request_to_sql_round_trip() {
    let request = SpecificationRequest::new()
        .with_filter_param(r#"[["year","between","1990","2000"],["genreName","eq","drama"]]"#)
        .with_filter_params(vec!["released:eq:true".to_string()])
        .with_sort_param(r#"[["genreName","asc"]]"#)
        .with_sort_params(vec!["year:desc".to_string()]);

    let spec = movie_manager().produce(&request).unwrap();
    assert_eq!(spec.filter_items().len(), 3);
    assert_eq!(spec.order_by_items().len(), 2);

    let config = movie_config();
    let mut ctx = QueryContext::new(&config, "movie");
    let mut select = base_select();
    spec.apply(&mut select, &mut ctx, &ValueConverter::new())
        .unwrap();
    let sql = select.to_string(PostgresQueryBuilder);

    assert!(
        sql.contains("\"movie\".\"year\" BETWEEN 1990 AND 2000"),
        "{sql}"
    );
    assert!(sql.contains("\"genre\".\"name\" = 'drama'"), "{sql}");
    assert!(sql.contains("\"movie\".\"released\" = TRUE"), "{sql}");
    assert!(sql.contains("LEFT JOIN \"genres\" AS \"genre\""), "{sql}");

    // genreName is used by a filter and a sort but joins exactly once.
    assert_eq!(sql.matches("JOIN \"genres\"").count(), 1, "{sql}");

    // Sort side: null-rank key ascending before each attribute clause.
    assert!(sql.contains("THEN -1 ELSE 0 END"), "{sql}");
    assert!(sql.contains("\"genre\".\"name\" ASC"), "{sql}");
    assert!(sql.contains("THEN 1 ELSE 0 END"), "{sql}");
    assert!(sql.contains("\"movie\".\"year\" DESC"), "{sql}");
}

#[test]
fn produced_sql_is_deterministic() {
    let request = SpecificationRequest::new()
        .with_filter_param(r#"[["genreName","in",["drama","noir"]]]"#)
        .with_sort_params(vec!["genreName:asc".to_string()]);
    let manager = movie_manager();
    let config = movie_config();

    let mut renders = Vec::new();
    for _ in 0..2 {
        let spec = manager.produce(&request).unwrap();
        let mut ctx = QueryContext::new(&config, "movie");
        let mut select = base_select();
        spec.apply(&mut select, &mut ctx, &ValueConverter::new())
            .unwrap();
        renders.push(select.to_string(PostgresQueryBuilder));
    }
    assert_eq!(renders[0], renders[1]);
}

#[test]
fn supplied_items_are_appended_after_parsed_channels() {
    let request = SpecificationRequest::new()
        .with_filter_param(r#"[["name","eq","John"]]"#)
        .with_filter_items(vec![
            FilterItem::single("title", FilterOperator::Like, "noir").unwrap(),
        ])
        .with_sort_items(vec![OrderByItem::new("title", SortDirection::Asc).unwrap()]);

    let spec = movie_manager().produce(&request).unwrap();
    assert_eq!(spec.filter_items()[0].attribute(), "name");
    assert_eq!(spec.filter_items()[1].attribute(), "title");
    assert_eq!(spec.order_by_items()[0].attribute(), "title");
}

#[test]
fn missing_parser_for_populated_channel_fails_the_whole_call() {
    let manager = SpecificationManager::builder()
        .with_single_filter_parser(JsonFilterParser::new())
        .build();
    let request = SpecificationRequest::new()
        .with_filter_param(r#"[["name","eq","John"]]"#)
        .with_filter_params(vec!["year:gte:1990".to_string()]);

    let err = manager.produce_filter_items(&request).unwrap_err();
    assert!(matches!(
        err,
        SpecError::ParserNotProvided {
            channel: "filter_params"
        }
    ));
}

#[test]
fn arity_mismatch_from_supplied_item_fails_production() {
    let request = SpecificationRequest::new().with_filter_items(vec![
        FilterItem::multi(
            "year",
            FilterOperator::Equal,
            vec!["1990".to_string(), "2000".to_string()],
        )
        .unwrap(),
    ]);

    let spec = movie_manager().produce(&request).unwrap();
    let config = movie_config();
    let mut ctx = QueryContext::new(&config, "movie");
    let mut select = base_select();

    let err = spec
        .apply(&mut select, &mut ctx, &ValueConverter::new())
        .unwrap_err();
    assert!(matches!(err, SpecError::OperatorArityMismatch { .. }));
    assert!(ctx.joins().is_empty());
}
