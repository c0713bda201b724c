//! The in-memory engine and the table provider agree on every spec both
//! can express: same rows, same order. Sorts before and after projections
//! are included so order carried across a reshape is compared too.

mod common;

use proptest::prelude::*;
use queryspec_core::{
    executor::apply_query,
    model::Row,
    provider::{
        apply_data_query,
        table::{Table, TableProvider},
    },
    query::{Direction, Expr, Predicate, Projection, QuerySpec, field},
    record,
    traits::AppliesTo,
};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct Person {
    id: u64,
    name: String,
    age: Option<i32>,
    flags: i64,
}

record!(Person { id, name, age, flags });

///
/// Step
/// One randomly chosen builder call.
///

#[derive(Clone, Debug)]
enum Step {
    Filter(Predicate),
    FilterAge(i32),
    FilterFlags(i64),
    Sort(&'static str, Direction),
    SortText(&'static str),
    Skip(i64),
    Take(i64),
    Project { swap: bool },
}

fn arb_person() -> impl Strategy<Value = Person> {
    (
        0..20_u64,
        prop::sample::select(vec!["Ann", "bob", "Cid", "alice", "Bea", "ann"]),
        prop::option::of(-5..60_i32),
        0..8_i64,
    )
        .prop_map(|(id, name, age, flags)| Person {
            id,
            name: name.to_string(),
            age,
            flags,
        })
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    let leaf = prop_oneof![
        (0..60_i32).prop_map(|n| field("age").gt(n)),
        (0..60_i32).prop_map(|n| field("age").lte(n)),
        (0..60_i32).prop_map(|n| field("age").ne(n)),
        Just(field("age").is_null()),
        Just(field("age").is_not_null()),
        (0..30_i32, 0..30_i32).prop_map(|(a, b)| field("age").between(a, a + b)),
        (0..30_i32, 0..30_i32).prop_map(|(a, b)| field("age").between_inclusive(a, a + b)),
        prop::collection::vec(0..20_u64, 0..4).prop_map(|ids| field("id").is_in(ids)),
        prop::sample::select(vec!["a%", "%n", "_ob", "%", "A%", "a_i%"])
            .prop_map(|p| field("name").like(p)),
        (1..8_i64).prop_map(|f| field("flags").has_flag(f)),
    ];

    leaf.prop_recursive(2, 6, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a & b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a | b),
            inner.prop_map(|p| !p),
        ]
    })
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_predicate().prop_map(Step::Filter),
        (
            prop::sample::select(vec!["id", "name", "age", "flags"]),
            prop::bool::ANY
        )
            .prop_map(|(path, desc)| {
                Step::Sort(path, if desc { Direction::Desc } else { Direction::Asc })
            }),
        prop::sample::select(vec![
            "name",
            "age desc, id",
            "flags asc, name desc",
            "name asc , id descendnig",
        ])
        .prop_map(Step::SortText),
        (0..60_i32).prop_map(Step::FilterAge),
        (1..8_i64).prop_map(Step::FilterFlags),
        (-2..6_i64).prop_map(Step::Skip),
        (-2..8_i64).prop_map(Step::Take),
        prop::bool::ANY.prop_map(|swap| Step::Project { swap }),
    ]
}

// Keeps the person field names so every later step stays valid; the swap
// moves order keys onto different output columns.
fn projection(swap: bool) -> Projection {
    let (age, flags) = if swap { ("flags", "age") } else { ("age", "flags") };

    Projection::new()
        .field("id")
        .field("name")
        .with("age", Expr::field(age))
        .with("flags", Expr::field(flags))
}

fn build(steps: &[Step]) -> QuerySpec<Person> {
    steps.iter().fold(QuerySpec::new(), |spec, step| match step {
        Step::Filter(predicate) => spec.filter(predicate.clone()).expect("filter"),
        Step::FilterAge(n) => spec.filter_by("age", |f| f.lte(*n)).expect("filter by"),
        Step::FilterFlags(n) => spec
            .filter_by("flags", |f| f.has_flag(*n))
            .expect("filter by"),
        Step::Sort(path, direction) => spec.sort_by(*path, *direction).expect("sort"),
        Step::SortText(text) => spec.sort(text).expect("sort text"),
        Step::Skip(n) => spec.skip(*n),
        Step::Take(n) => spec.take(*n),
        Step::Project { swap } => spec.select(projection(*swap)).expect("select"),
    })
}

fn in_memory<S: AppliesTo<Person>>(people: &[Person], spec: &QuerySpec<S>) -> Vec<Row> {
    common::init_tracing();
    apply_query(people.to_vec(), spec)
        .expect("bind")
        .rows()
        .expect("rows")
}

fn via_table<S: AppliesTo<Person>>(people: &[Person], spec: &QuerySpec<S>) -> Vec<Row> {
    let provider = TableProvider::new();
    let table = Arc::new(Table::from_records(people.to_vec()));
    let query = apply_data_query(&provider, provider.query(table), spec).expect("translate");

    provider.execute(&query)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn engines_agree_on_filter_sort_page_project(
        people in prop::collection::vec(arb_person(), 0..16),
        steps in prop::collection::vec(arb_step(), 0..6),
    ) {
        let spec = build(&steps);

        prop_assert_eq!(in_memory(&people, &spec), via_table(&people, &spec));
    }

    #[test]
    fn named_binding_matches_typed_binding(
        people in prop::collection::vec(arb_person(), 0..16),
        steps in prop::collection::vec(arb_step(), 0..6),
    ) {
        let typed = build(&steps);
        let untyped = typed.clone().into_untyped();

        let expected = in_memory(&people, &typed);
        prop_assert_eq!(&in_memory(&people, &untyped), &expected);
        prop_assert_eq!(&via_table(&people, &untyped), &expected);
    }

    #[test]
    fn engines_agree_on_grouped_aggregates(
        people in prop::collection::vec(arb_person(), 0..16),
        steps in prop::collection::vec(arb_step(), 0..4),
        predicate in arb_predicate(),
    ) {
        let spec = build(&steps)
            .filter(predicate)
            .expect("filter")
            .group_by(Expr::field("name"))
            .expect("group")
            .select(
                Projection::new()
                    .field("key")
                    .with("n", Expr::count())
                    .with("total", Expr::sum("flags"))
                    .with("oldest", Expr::max("age")),
            )
            .expect("select")
            .sort_by("n", Direction::Desc)
            .expect("sort");

        prop_assert_eq!(in_memory(&people, &spec), via_table(&people, &spec));
    }

    #[test]
    fn applying_a_spec_leaves_the_source_untouched(
        people in prop::collection::vec(arb_person(), 0..16),
        steps in prop::collection::vec(arb_step(), 0..6),
    ) {
        let before = people.clone();
        let spec = build(&steps);
        let _ = in_memory(&people, &spec);
        let _ = in_memory(&people, &spec);

        prop_assert_eq!(people, before);
    }
}
