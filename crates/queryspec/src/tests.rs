use crate::prelude::*;
use crate::{ErrorKind, ErrorOrigin, QueryErrorKind, load_config};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct Task {
    id: u64,
    title: String,
    done: bool,
}

record!(Task { id, title, done });

fn tasks() -> Vec<Task> {
    [(1, "write", false), (2, "review", true), (3, "ship", false)]
        .into_iter()
        .map(|(id, title, done)| Task {
            id,
            title: title.to_string(),
            done,
        })
        .collect()
}

#[test]
fn query_collects_elements() {
    let spec = QuerySpec::<Task>::new()
        .filter(field("done").eq(false))
        .expect("filter")
        .sort("id desc")
        .expect("sort");

    let ids: Vec<u64> = query(tasks(), &spec)
        .expect("query")
        .into_iter()
        .filter_map(Element::into_record)
        .map(|task| task.id)
        .collect();

    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn query_rows_flattens_groups() {
    let spec = QuerySpec::<Task>::new()
        .group_by(Expr::field("done"))
        .expect("group");
    let rows = query_rows(tasks(), &spec).expect("rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("key"), Some(&Value::Bool(false)));
    assert_eq!(rows[0].get("count"), Some(&Value::Int(2)));
}

#[test]
fn unknown_path_maps_to_path_not_found() {
    let spec = QuerySpec::untyped().filter(field("owner").eq("x")).expect("filter");
    let err = query(tasks(), &spec).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Query(QueryErrorKind::PathNotFound));
    assert_eq!(err.origin, ErrorOrigin::Executor);
    assert!(err.message.contains("owner"));
}

#[test]
fn parse_failure_maps_to_malformed() {
    let err: crate::Error = QuerySpec::<Task>::new().sort(" , ").unwrap_err().into();

    assert_eq!(err.kind, ErrorKind::Query(QueryErrorKind::Malformed));
    assert_eq!(err.origin, ErrorOrigin::Parser);
}

#[test]
fn translate_wraps_provider_errors() {
    let provider = TableProvider::with_capabilities(
        crate::core::provider::table::TableCapabilities::minimal(),
    );
    let table = Arc::new(Table::from_records(tasks()));
    let spec = QuerySpec::<Task>::new()
        .filter(field("title").like("s%"))
        .expect("filter");

    let err = translate(&provider, provider.query(table), &spec).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Query(QueryErrorKind::Unsupported));
    assert_eq!(err.origin, ErrorOrigin::Provider);
}

#[test]
fn translate_runs_on_table_provider() {
    let provider = TableProvider::new();
    let table = Arc::new(Table::from_records(tasks()));
    let spec = QuerySpec::<Task>::new().sort("title").expect("sort").take(2);

    let query = translate(&provider, provider.query(table), &spec).expect("translate");
    let titles: Vec<_> = provider
        .execute(&query)
        .iter()
        .filter_map(|row| row.get("title").cloned())
        .collect();

    assert_eq!(titles, vec![Value::from("review"), Value::from("ship")]);
}

#[test]
fn config_errors_keep_config_origin() {
    let err = load_config("[sort]\nmode = 3\n").unwrap_err();

    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.origin, ErrorOrigin::Config);
}

#[test]
fn errors_serialize_with_kind_and_origin() {
    let err = crate::Error::new(
        ErrorKind::Query(QueryErrorKind::Invalid),
        ErrorOrigin::Builder,
        "bad literal",
    );
    let json = serde_json::to_value(&err).expect("serialize");

    assert_eq!(json["origin"], "Builder");
    assert_eq!(json["kind"]["Query"], "Invalid");
    assert_eq!(json["message"], "bad literal");
}

#[test]
fn version_is_workspace_version() {
    assert!(!crate::VERSION.is_empty());
}
