//! End-to-end scenarios run through the public API: build a spec once and
//! apply it in memory, against the table store and as SQL.

mod common;

use queryspec_core::{
    config::QueryConfig,
    error::{ErrorOrigin, QueryError},
    executor::apply_query,
    model::Row,
    obs::{EventReport, metrics_report, metrics_reset_all},
    provider::{
        apply_data_query,
        sql::{SqlProvider, SqlTable},
        table::{Table, TableProvider},
    },
    query::{Direction, QuerySpec, SortKey, field},
    record,
    value::Value,
};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct Num {
    n: i64,
}

record!(Num { n });

#[derive(Clone, Debug, PartialEq)]
struct User {
    id: u64,
    name: String,
    score: Option<f64>,
}

record!(User { id, name, score });

fn numbers() -> Vec<Num> {
    common::init_tracing();
    (0..12).map(|n| Num { n }).collect()
}

fn users() -> Vec<User> {
    common::init_tracing();
    [
        (1, "Charlie", Some(2.5)),
        (2, "alice", None),
        (3, "Alina", Some(9.0)),
        (4, "bob", Some(2.5)),
        (5, "Alina", Some(1.0)),
    ]
    .into_iter()
    .map(|(id, name, score)| User {
        id,
        name: name.to_string(),
        score,
    })
    .collect()
}

fn user_ids(spec: &QuerySpec<User>) -> Vec<u64> {
    apply_query(users(), spec)
        .expect("bind")
        .records()
        .expect("records")
        .into_iter()
        .map(|u| u.id)
        .collect()
}

#[test]
fn second_page_of_two_over_twelve_numbers() {
    let spec = QuerySpec::<Num>::new().page(2, 2).expect("page");

    let values: Vec<i64> = apply_query(numbers(), &spec)
        .expect("bind")
        .records()
        .expect("records")
        .into_iter()
        .map(|num| num.n)
        .collect();
    assert_eq!(values, vec![2, 3]);

    let config = QueryConfig::from_toml_str("[sql]\ndialect = \"sqlite\"").expect("config");
    let provider = SqlProvider::from_config(&config.sql);
    let stmt = apply_data_query(&provider, provider.query(&SqlTable::of::<Num>()), &spec)
        .expect("translate")
        .render();
    assert_eq!(stmt.sql, "SELECT * FROM \"Num\" LIMIT 2 OFFSET 2");
}

#[test]
fn permissive_sort_text_reads_misspelled_direction_as_descending() {
    let spec = QuerySpec::untyped().sort("name asc , id descendnig").expect("sort");

    let ops = spec.operations();
    let keys: Vec<&SortKey> = match ops.as_slice() {
        [queryspec_core::query::Operation::Sort(keys)] => keys.iter().collect(),
        other => panic!("expected one sort, got {other:?}"),
    };
    assert_eq!(keys[0].direction, Direction::Asc);
    assert_eq!(keys[1].direction, Direction::Desc);

    let ids: Vec<u64> = apply_query(users(), &spec)
        .expect("bind")
        .records()
        .expect("records")
        .into_iter()
        .map(|u| u.id)
        .collect();
    // ordinal text order: uppercase before lowercase; ties broken by id desc
    assert_eq!(ids, vec![5, 3, 1, 2, 4]);
}

#[test]
fn strict_mode_from_config_rejects_misspelled_direction() {
    let config = QueryConfig::from_toml_str("[sort]\nmode = \"strict\"").expect("config");
    let err = QuerySpec::untyped()
        .sort_with("id descendnig", config.sort.mode)
        .unwrap_err();

    assert!(matches!(err, QueryError::Parse(_)));
    assert_eq!(err.origin(), ErrorOrigin::Parser);
}

#[test]
fn like_matches_substring_case_sensitively() {
    let spec = QuerySpec::<User>::new()
        .filter(field("name").like("%li%"))
        .expect("filter");

    // "Alina" and "alice" contain "li"; "Charlie" as well
    assert_eq!(user_ids(&spec), vec![1, 2, 3, 5]);

    let upper = QuerySpec::<User>::new()
        .filter(field("name").like("%LI%"))
        .expect("filter");
    assert!(user_ids(&upper).is_empty());
}

#[test]
fn between_includes_min_and_excludes_max() {
    let half_open = QuerySpec::<User>::new()
        .filter(field("score").between(2.5, 9.0))
        .expect("filter");
    assert_eq!(user_ids(&half_open), vec![1, 4]);

    let closed = QuerySpec::<User>::new()
        .filter(field("score").between_inclusive(2.5, 9.0))
        .expect("filter");
    assert_eq!(user_ids(&closed), vec![1, 3, 4]);
}

#[test]
fn empty_membership_yields_nothing_everywhere() {
    let spec = QuerySpec::<User>::new()
        .filter(field("id").is_in(Vec::<u64>::new()))
        .expect("filter");

    assert!(user_ids(&spec).is_empty());

    let provider = TableProvider::new();
    let query = apply_data_query(
        &provider,
        provider.query(Arc::new(Table::from_records(users()))),
        &spec,
    )
    .expect("translate");
    assert!(provider.execute(&query).is_empty());
}

#[test]
fn spec_is_reusable_and_extension_does_not_alter_the_base() {
    let base = QuerySpec::<User>::new()
        .filter(field("score").is_not_null())
        .expect("filter");
    let sorted = base.sort_by("score", Direction::Desc).expect("sort");

    assert_eq!(base.len(), 1);
    assert_eq!(sorted.len(), 2);
    assert_eq!(user_ids(&base), vec![1, 3, 4, 5]);
    assert_eq!(user_ids(&sorted), vec![3, 1, 4, 5]);
    assert_eq!(user_ids(&base), vec![1, 3, 4, 5]);
}

#[test]
fn dynamic_rows_are_a_query_source() {
    common::init_tracing();
    let rows = vec![
        Row::new().with("sku", "a-1").with("qty", 3),
        Row::new().with("sku", "b-2").with("qty", 0),
        Row::new().with("sku", "c-3").with("qty", 7),
    ];
    let spec = QuerySpec::untyped()
        .filter(field("qty").gt(0))
        .expect("filter")
        .sort("qty desc")
        .expect("sort");

    let skus: Vec<Value> = apply_query(rows, &spec)
        .expect("bind")
        .records()
        .expect("records")
        .iter()
        .filter_map(|row| row.get("sku").cloned())
        .collect();

    assert_eq!(skus, vec![Value::from("c-3"), Value::from("a-1")]);
}

#[test]
fn metrics_count_one_query_and_its_rows() {
    metrics_reset_all();

    let spec = QuerySpec::<Num>::new().take(4);
    let emitted = apply_query(numbers(), &spec).expect("bind").count();
    assert_eq!(emitted, 4);

    let EventReport { counters, .. } = metrics_report(None);
    let counters = counters.expect("counters recorded");
    assert_eq!(counters.ops.memory_queries, 1);
    assert_eq!(counters.ops.rows_emitted, 4);
}
