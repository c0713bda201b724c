use super::*;
use crate::{
    error::ErrorClass,
    query::{Expr, Projection, QuerySpec, field},
    record,
};

#[derive(Clone, Debug)]
struct Item {
    sku: u64,
    label: String,
    price: Option<f64>,
    tags: i64,
}

record!(Item { sku, label, price, tags });

fn items() -> Arc<Table> {
    Arc::new(Table::from_records(vec![
        Item { sku: 1, label: "apple".into(), price: Some(1.5), tags: 0b01 },
        Item { sku: 2, label: "pear".into(), price: None, tags: 0b11 },
        Item { sku: 3, label: "plum".into(), price: Some(0.5), tags: 0b10 },
        Item { sku: 4, label: "apricot".into(), price: Some(1.5), tags: 0b11 },
    ]))
}

fn run(provider: &TableProvider, spec: &QuerySpec<Item>) -> Result<Vec<Row>, QueryError> {
    let query = crate::provider::apply_data_query(provider, provider.query(items()), spec)?;

    Ok(provider.execute(&query))
}

fn skus(rows: &[Row]) -> Vec<Value> {
    rows.iter().map(|r| r.get("sku").cloned().unwrap_or(Value::Null)).collect()
}

#[test]
fn from_records_declares_columns_and_rows() {
    let table = items();

    assert_eq!(table.name(), "Item");
    assert_eq!(table.columns()[2], ("price".to_string(), FieldKind::Float));
    assert_eq!(table.rows().len(), 4);
    assert_eq!(table.rows()[1].get("price"), Some(&Value::Null));
}

#[test]
fn each_operation_appends_one_native_stage() {
    let spec = QuerySpec::<Item>::new()
        .filter(field("price").gt(1.0))
        .unwrap()
        .sort_by("sku", Direction::Desc)
        .unwrap()
        .take(1);
    let provider = TableProvider::new();

    let query = crate::provider::apply_data_query(&provider, provider.query(items()), &spec).unwrap();
    assert_eq!(query.stages().len(), 3);
    assert!(matches!(query.stages()[2], StoreStage::Take(1)));
    assert_eq!(skus(&provider.execute(&query)), vec![Value::Uint(4)]);
}

#[test]
fn null_prices_never_pass_a_comparison() {
    let spec = QuerySpec::<Item>::new()
        .filter(!field("price").gt(1.0))
        .unwrap();

    let rows = run(&TableProvider::new(), &spec).unwrap();
    assert_eq!(skus(&rows), vec![Value::Uint(3)]);
}

#[test]
fn grouping_emits_key_ordered_groups_with_counts() {
    let spec = QuerySpec::<Item>::new()
        .group_by(Expr::field("price"))
        .unwrap();

    let rows = run(&TableProvider::new(), &spec).unwrap();
    let rendered: Vec<_> = rows.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "{key: null, count: 1}",
            "{key: 0.5, count: 1}",
            "{key: 1.5, count: 2}",
        ]
    );
}

#[test]
fn aggregates_fold_over_group_members() {
    let spec = QuerySpec::<Item>::new()
        .group_by(Expr::field("price"))
        .unwrap()
        .select(
            Projection::new()
                .field("key")
                .with("skus", Expr::sum("sku"))
                .with("first", Expr::min("label")),
        )
        .unwrap();

    let rows = run(&TableProvider::new(), &spec).unwrap();
    assert_eq!(rows[2].get("skus"), Some(&Value::Int(5)));
    assert_eq!(rows[2].get("first"), Some(&Value::Text("apple".into())));
}

#[test]
fn minimal_capabilities_reject_like_and_flags() {
    let provider = TableProvider::with_capabilities(TableCapabilities::minimal());

    let like = QuerySpec::<Item>::new().filter(field("label").like("ap%")).unwrap();
    let flag = QuerySpec::<Item>::new().filter(field("tags").has_flag(2_i64)).unwrap();

    for spec in [like, flag] {
        let err = run(&provider, &spec).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unsupported);
    }
}

#[test]
fn full_capabilities_evaluate_like_and_flags() {
    let provider = TableProvider::new();

    let like = QuerySpec::<Item>::new().filter(field("label").like("ap%")).unwrap();
    let flag = QuerySpec::<Item>::new().filter(field("tags").has_flag(2_i64)).unwrap();

    assert_eq!(skus(&run(&provider, &like).unwrap()), vec![Value::Uint(1), Value::Uint(4)]);
    assert_eq!(
        skus(&run(&provider, &flag).unwrap()),
        vec![Value::Uint(2), Value::Uint(3), Value::Uint(4)]
    );
}

#[test]
fn projected_scope_replaces_the_table_columns() {
    let spec = QuerySpec::<Item>::new()
        .select(Projection::new().with("name", Expr::field("label")))
        .unwrap();
    let provider = TableProvider::new();

    let query = crate::provider::apply_data_query(&provider, provider.query(items()), &spec).unwrap();
    assert_eq!(query.output_columns(), vec!["name".to_string()]);

    let unknown = QuerySpec::untyped().filter_by("label", |f| f.eq("x")).unwrap();
    let err = crate::provider::apply_data_query(&provider, query, &unknown).unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
}
