//! End-to-end Tests for the Search Compiler
//!
//! Drives wire-format requests through compilation and into every backend
//! surface: the in-memory backend, RediSearch arguments and SQL.
//!
//! # Running Tests
//! ```bash
//! cargo test --test compile
//! ```
//!
//! # Test Organization
//! - `happy_*` - Requests that compile and execute
//! - `failure_*` - Requests rejected before reaching a backend

use std::sync::Arc;

use serde_json::json;

use search_compiler::backend::{BackendError, InMemoryBackend, SearchBackend};
use search_compiler::schema::{Analyzer, Document, Index, SortKind};
use search_compiler::search::{
    compile_filter, compile_sort, Bound, Filter, IndexMapping, Query, RediSearchTranslator,
    SearchRequest, Sort, SortDirection, SortField, SqlParam, SqlTranslator,
};
use search_compiler::{CompileError, CompilerConfig, ErrorKind};

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("search_compiler=debug")
        .with_test_writer()
        .try_init();
}

fn item_index() -> Index {
    let item = Document::builder("item")
        .keyword("userId")
        .keyword_list("tags")
        .number("createdTimestamp")
        .number("updatedTimestamp")
        .build()
        .unwrap();
    Index::build("items", vec![item])
}

async fn seeded_backend(index: &Index) -> InMemoryBackend {
    let backend = InMemoryBackend::for_index(index);
    let records = [
        ("r0", "Rob", 0),
        ("r1", "Rob", 1),
        ("r5", "Rob", 5),
        ("r9", "Rob", 9),
        ("k0", "Ken", 0),
        ("k7", "Ken", 7),
    ];
    for (id, user, ts) in records {
        backend
            .index(
                id,
                json!({"type": "item", "userId": user, "tags": "unix go", "createdTimestamp": ts}),
            )
            .await
            .unwrap();
    }
    backend
}

fn end_to_end_request() -> SearchRequest {
    serde_json::from_value(json!({
        "filter": {"and": [
            {"base": "userId:Rob"},
            {"or": [
                {"base": "createdTimestamp:<1"},
                {"base": "createdTimestamp:>=5"}
            ]}
        ]},
        "sort": {"fields": ["createdTimestamp:>"]}
    }))
    .unwrap()
}

// =============================================================================
// Happy Path
// =============================================================================

#[test]
fn happy_end_to_end_query_shape() {
    init_tracing();
    let index = item_index();
    let directive = end_to_end_request()
        .compile(&index, &CompilerConfig::default())
        .unwrap();

    let expected = Query::matching("userId", "Rob", Analyzer::Keyword).and(
        Query::numeric_range("createdTimestamp", None, Some(Bound::exclusive(1.0))).or(
            Query::numeric_range("createdTimestamp", Some(Bound::inclusive(5.0)), None),
        ),
    );
    assert_eq!(directive.query, expected);
}

#[tokio::test]
async fn happy_end_to_end_in_memory() {
    init_tracing();
    let index = item_index();
    let backend = seeded_backend(&index).await;

    let ids = backend
        .search_request(&end_to_end_request(), &index, &CompilerConfig::default())
        .await
        .unwrap();
    assert_eq!(ids, ["r9", "r5", "r0"]);
}

#[test]
fn happy_end_to_end_redis_and_sql() {
    let index = item_index();
    let config = CompilerConfig {
        redis_prefix: Some("app:".into()),
        ..Default::default()
    };
    let directive = end_to_end_request().compile(&index, &config).unwrap();

    let args = RediSearchTranslator::search_args(
        index.name(),
        &directive,
        config.redis_prefix.as_deref(),
    );
    assert_eq!(
        args,
        [
            "app:idx:items",
            "(@userId:{Rob} (@createdTimestamp:[-inf (1] | @createdTimestamp:[5 +inf]))",
            "NOCONTENT",
            "SORTBY",
            "createdTimestamp",
            "DESC",
            "LIMIT",
            "0",
            "10",
        ]
    );

    let (sql, params) = SqlTranslator::translate_directive(&directive, &config.json_column)
        .to_select("items", "id");
    assert_eq!(
        sql,
        "SELECT id FROM items WHERE (JSON_UNQUOTE(JSON_EXTRACT(data, '$.userId')) = ? AND \
         (JSON_EXTRACT(data, '$.createdTimestamp') < ? OR JSON_EXTRACT(data, '$.createdTimestamp') >= ?)) \
         ORDER BY JSON_EXTRACT(data, '$.createdTimestamp') DESC LIMIT ? OFFSET ?"
    );
    assert_eq!(
        params,
        [
            SqlParam::Text("Rob".into()),
            SqlParam::Numeric(1.0),
            SqlParam::Numeric(5.0),
            SqlParam::Integer(10),
            SqlParam::Integer(0),
        ]
    );
}

#[test]
fn happy_ft_create_matches_schema() {
    let mapping = IndexMapping::from_index(&item_index());
    let cmd = mapping.to_ft_create_args("item:").join(" ");
    assert!(cmd.starts_with("idx:items ON JSON PREFIX 1 item: SCHEMA"));
    assert!(cmd.contains("$.tags AS tags TAG SEPARATOR"));
    assert!(cmd.contains("$.updatedTimestamp AS updatedTimestamp NUMERIC SORTABLE"));
}

#[test]
fn happy_no_filter_is_match_all_for_any_index() {
    let empty = Index::build("empty", Vec::<Document>::new());
    assert!(compile_filter(None, &empty).unwrap().is_match_all());
    assert!(compile_filter(None, &item_index()).unwrap().is_match_all());
}

#[test]
fn happy_singleton_wrappers_collapse() {
    let index = item_index();
    let base = Filter::base("createdTimestamp:<=5");
    let plain = compile_filter(Some(&base), &index).unwrap();
    assert_eq!(compile_filter(Some(&Filter::and(vec![base.clone()])), &index).unwrap(), plain);
    assert_eq!(compile_filter(Some(&Filter::or(vec![base])), &index).unwrap(), plain);
}

#[tokio::test]
async fn happy_eq_ne_partition_records() {
    let index = item_index();
    let backend = seeded_backend(&index).await;
    let config = CompilerConfig::default();

    let search = |expr: &str| SearchRequest {
        filter: Some(Filter::base(expr)),
        ..Default::default()
    };
    let eq = backend.search_request(&search("createdTimestamp:==0"), &index, &config).await.unwrap();
    let ne = backend.search_request(&search("createdTimestamp:!=0"), &index, &config).await.unwrap();

    assert_eq!(eq, ["k0", "r0"]);
    assert_eq!(ne, ["k7", "r1", "r5", "r9"]);
}

#[tokio::test]
async fn happy_boundaries() {
    let index = item_index();
    let backend = seeded_backend(&index).await;
    let config = CompilerConfig::default();

    for (expr, includes_five) in [
        ("createdTimestamp:<=5", true),
        ("createdTimestamp:<5", false),
        ("createdTimestamp:>=5", true),
        ("createdTimestamp:>5", false),
    ] {
        let request = SearchRequest {
            filter: Some(Filter::base(expr)),
            ..Default::default()
        };
        let ids = backend.search_request(&request, &index, &config).await.unwrap();
        assert_eq!(ids.contains(&"r5".to_string()), includes_five, "{}", expr);
    }
}

#[tokio::test]
async fn happy_valueless_matches_agree_across_backends() {
    let index = item_index();
    let backend = seeded_backend(&index).await;
    let config = CompilerConfig::default();

    for expr in ["userId:", "tags:", "tags:   "] {
        let request = SearchRequest {
            filter: Some(Filter::base(expr)),
            ..Default::default()
        };
        let directive = request.compile(&index, &config).unwrap();

        let ids = backend.search(&directive).await.unwrap();
        assert!(ids.is_empty(), "{}", expr);

        let redis = RediSearchTranslator::translate(&directive.query);
        assert!(redis.contains("nomatch") && !redis.contains(":{}"), "{} -> {}", expr, redis);

        let sql = SqlTranslator::translate(&directive.query, "data");
        assert_eq!(sql.clause, "1=0", "{}", expr);
    }
}

#[test]
fn happy_sort_precedence() {
    let doc = Document::builder("d").number("a").keyword("b").build().unwrap();
    let index = Index::build("ab", vec![doc]);
    let ordering = compile_sort(Some(&Sort::new(["a:<", "b:>"])), &index)
        .unwrap()
        .unwrap();
    assert_eq!(
        ordering.fields,
        vec![
            SortField::new("a", SortDirection::Ascending, SortKind::Number),
            SortField::new("b", SortDirection::Descending, SortKind::String),
        ]
    );
}

#[tokio::test]
async fn happy_shared_index_across_tasks() {
    let index = Arc::new(item_index());
    let backend = Arc::new(seeded_backend(&index).await);

    let handles: Vec<_> = ["Rob", "Ken"]
        .into_iter()
        .map(|user| {
            let index = Arc::clone(&index);
            let backend = Arc::clone(&backend);
            tokio::spawn(async move {
                let request = SearchRequest {
                    filter: Some(Filter::base(format!("userId:{}", user))),
                    ..Default::default()
                };
                backend
                    .search_request(&request, &index, &CompilerConfig::default())
                    .await
                    .unwrap()
                    .len()
            })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap());
    }
    assert_eq!(counts, [4, 2]);
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_unknown_field_never_reaches_backend() {
    let index = item_index();
    let backend = seeded_backend(&index).await;
    let request = SearchRequest {
        filter: Some(Filter::base("zzz:foo")),
        ..Default::default()
    };

    let err = backend
        .search_request(&request, &index, &CompilerConfig::default())
        .await
        .unwrap_err();
    let BackendError::Compile(err) = err else {
        panic!("expected a compile error, got {:?}", err);
    };
    assert_eq!(err, CompileError::FieldNotFound("zzz".into()));
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert!(err.is_client_error());
}

#[test]
fn failure_missing_separator() {
    let err = compile_filter(Some(&Filter::base("userId")), &item_index()).unwrap_err();
    assert_eq!(err, CompileError::MissingFieldSeparator("userId".into()));
    assert!(err.to_string().contains("userId"));
}

#[test]
fn failure_bad_comparator() {
    let err = compile_filter(Some(&Filter::base("createdTimestamp:~~3")), &item_index())
        .unwrap_err();
    assert!(err.to_string().starts_with("incorrectly formatted range query"));
    assert_eq!(err.kind(), ErrorKind::MalformedExpression);
}

#[test]
fn failure_bad_sort_fails_whole_request() {
    let request: SearchRequest = serde_json::from_value(json!({
        "filter": {"base": "userId:Rob"},
        "sort": {"fields": ["createdTimestamp:>", "createdTimestamp"]}
    }))
    .unwrap();
    let err = request
        .compile(&item_index(), &CompilerConfig::default())
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingDirectionSeparator("createdTimestamp".into())
    );
}
