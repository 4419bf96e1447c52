use crate::common::{library_schema, Author, AuthorContact, Loan};
use crate::mocks::MockEngine;
use chrono::NaiveDate;
use fluent_criteria::config::CompilerConfig;
use fluent_criteria::criteria::Row;
use fluent_criteria::path;
use fluent_criteria::prelude::*;

fn author_row(key: i32, name: &str, country: &str) -> Row {
    let born = NaiveDate::from_ymd_opt(1970 + key, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Row::new()
        .with("Key", key)
        .with("Name", name)
        .with("BirthDate", born)
        .with("City", "Mussoorie")
        .with("Country", country)
        .with("Phone", "555-0100")
        .with("Email", format!("author{key}@example.com"))
        .with("Nationality", "Indian")
}

fn executor(rows: Vec<Row>) -> QueryExecutor<MockEngine> {
    QueryExecutor::new(
        MockEngine::new().with_rows(rows),
        library_schema(),
        CompilerConfig::default(),
    )
}

#[test]
fn test_get_list_maps_rows_onto_entities() {
    let executor = executor(vec![
        author_row(1, "Author 1", "India"),
        author_row(2, "Author 2", "India"),
    ]);
    let mut spec = executor.spec_for::<Author>().unwrap();
    spec.equal(path!(Country), "India").unwrap();

    let authors: Vec<Author> = executor.get_list(&spec).unwrap();

    assert_eq!(authors.len(), 2);
    assert_eq!(authors[1].name, "Author 2");
    let listed = executor.engine().last_listed().unwrap();
    assert_eq!(listed.entity(), "Author");
    assert_eq!(listed.predicates().len(), 1);
}

#[test]
fn test_get_first_returns_first_or_none() {
    let executor = executor(vec![author_row(7, "Ruskin", "India")]);
    let spec = executor.spec_for::<Author>().unwrap();
    let first: Option<Author> = executor.get_first(&spec).unwrap();
    assert_eq!(first.map(|a| a.key), Some(7));

    let empty = self::executor(Vec::new());
    let spec = empty.spec_for::<Author>().unwrap();
    let none: Option<Author> = empty.get_first(&spec).unwrap();
    assert!(none.is_none());
}

#[test]
fn test_pagination_reaches_the_engine() {
    let executor = executor((1..=5).map(|k| author_row(k, "A", "India")).collect());
    let mut spec = executor.spec_for::<Author>().unwrap();
    spec.skip(1).unwrap();
    spec.take(2).unwrap();

    let authors: Vec<Author> = executor.get_list(&spec).unwrap();
    let keys: Vec<i32> = authors.iter().map(|a| a.key).collect();
    assert_eq!(keys, vec![2, 3]);
}

#[test]
fn test_projected_list_binds_result_type_on_a_copy() {
    let executor = executor(vec![author_row(3, "Author 3", "USA")]);
    let mut spec = executor.spec_for::<Author>().unwrap();
    spec.select(path!(Key, Name, Email)).unwrap();

    let contacts: Vec<AuthorContact> = executor.get_projected_list(&spec).unwrap();

    assert_eq!(
        contacts,
        vec![AuthorContact {
            key: 3,
            name: "Author 3".to_string(),
            email: "author3@example.com".to_string(),
        }]
    );
    assert!(spec.result_type().is_none());
    let listed = executor.engine().last_listed().unwrap();
    assert!(listed.result_type().unwrap().ends_with("AuthorContact"));
    assert_eq!(listed.projections().len(), 3);
}

#[test]
fn test_projected_rows_are_untyped() {
    let executor = executor(vec![Row::new().with("Name", "Author 9")]);
    let mut spec = executor.spec_for::<Author>().unwrap();
    spec.select(path!(Name)).unwrap();

    let rows = executor.get_projected_rows(&spec).unwrap();
    assert_eq!(rows[0].get("Name"), Some(&Value::from("Author 9")));
}

#[test]
fn test_get_count_compiles_filters() {
    let executor = executor((1..=4).map(|k| author_row(k, "A", "UK")).collect());
    let mut spec = executor.spec_for::<Author>().unwrap();
    spec.is_in(path!(Country), ["UK"]).unwrap();

    assert_eq!(executor.get_count(&spec).unwrap(), 4);
    let state = executor.engine().get_state();
    assert_eq!(state.counted.len(), 1);
    assert_eq!(state.created, vec!["Author".to_string()]);
}

#[test]
fn test_row_mapping_failure() {
    let executor = executor(vec![Row::new().with("Key", "not-a-number")]);
    let spec = executor.spec_for::<Author>().unwrap();

    let err = executor.get_list::<Author>(&spec).unwrap_err();
    assert!(matches!(err, CriteriaError::ResultMapping { .. }));
}

#[test]
fn test_engine_failure_is_surfaced() {
    let executor = QueryExecutor::new(
        MockEngine::new().failing("connection reset"),
        library_schema(),
        CompilerConfig::default(),
    );
    let spec = executor.spec_for::<Loan>().unwrap();

    match executor.get_count(&spec).unwrap_err() {
        CriteriaError::Engine { operation, message } => {
            assert_eq!(operation, "count");
            assert_eq!(message, "connection reset");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_default_join_kind_from_config() {
    let config = CompilerConfig {
        default_join_kind: JoinKind::LeftOuter,
        ..CompilerConfig::default()
    };
    let executor = QueryExecutor::new(MockEngine::new(), library_schema(), config);
    let mut spec = executor.spec("Loan").unwrap();
    spec.is_null(path!(Borrower.Email)).unwrap();

    let handle = executor.compile(&spec).unwrap();
    assert_eq!(handle.joins()[0].kind, JoinKind::LeftOuter);
    assert!(matches!(
        executor.spec("Publisher"),
        Err(CriteriaError::UnknownEntity { .. })
    ));
}
