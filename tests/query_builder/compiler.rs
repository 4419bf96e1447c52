use crate::common::{spec_for, Author, Book, Borrower, Loan};
use chrono::NaiveDate;
use fluent_criteria::config::CompilerConfig;
use fluent_criteria::criteria::{ComparisonOp, Order, Predicate, Projection};
use fluent_criteria::path;
use fluent_criteria::prelude::*;

fn single_term(spec: &QuerySpec) -> Predicate {
    let plan = CriteriaCompiler::default().compile_to_plan(spec).unwrap();
    match plan.where_clause() {
        Some(Predicate::Or { mut terms }) if terms.len() == 1 => terms.remove(0),
        other => panic!("expected a single-term disjunction, got {other:?}"),
    }
}

#[test]
fn test_predicate_kinds_map_to_engine_terms() {
    let mut spec = spec_for::<Author>();
    spec.not_equal(path!(City), "London").unwrap();
    assert_eq!(
        single_term(&spec),
        Predicate::not(Predicate::eq("this.City", "London".into()))
    );

    let mut spec = spec_for::<Author>();
    spec.is_not_like(path!(Name), "%Author%").unwrap();
    assert_eq!(
        single_term(&spec),
        Predicate::not(Predicate::like("this.Name", "%Author%".into()))
    );

    let mut spec = spec_for::<Author>();
    spec.is_not_in(path!(Country), ["India", "USA"]).unwrap();
    assert_eq!(
        single_term(&spec),
        Predicate::not(Predicate::is_in(
            "this.Country",
            vec!["India".into(), "USA".into()]
        ))
    );

    let mut spec = spec_for::<Author>();
    spec.less_than_or_equal(path!(Key), 5).unwrap();
    assert_eq!(
        single_term(&spec),
        Predicate::compare("this.Key", ComparisonOp::Le, Value::Int32(5))
    );

    let mut spec = spec_for::<Loan>();
    spec.is_null(path!(ReturnDate)).unwrap();
    assert_eq!(single_term(&spec), Predicate::is_null("this.ReturnDate"));
}

#[test]
fn test_membership_operands_are_converted() {
    let mut spec = spec_for::<Book>();
    spec.is_in(path!(PublishedYear), vec![1999i64, 2001i64]).unwrap();

    assert_eq!(
        single_term(&spec),
        Predicate::is_in("this.PublishedYear", vec![Value::Int32(1999), Value::Int32(2001)])
    );
}

#[test]
fn test_optional_temporal_compares_like_required() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let mut optional = spec_for::<Loan>();
    optional.equal(path!(ReturnDate), day).unwrap();
    let mut required = spec_for::<Loan>();
    required.equal(path!(LoanDate), day).unwrap();

    let expected = Value::DateTime(day.and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(
        single_term(&optional),
        Predicate::eq("this.ReturnDate", expected.clone())
    );
    assert_eq!(single_term(&required), Predicate::eq("this.LoanDate", expected));
}

#[test]
fn test_string_operands_parse_into_declared_types() {
    let mut spec = spec_for::<Author>();
    spec.between(path!(BirthDate), "1970-01-01", "1990-01-01T00:00:00").unwrap();

    let low = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let high = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(
        single_term(&spec),
        Predicate::between("this.BirthDate", Value::DateTime(low), Value::DateTime(high))
    );
}

#[test]
fn test_conversion_failure_names_the_path() {
    let mut spec = spec_for::<Book>();
    spec.equal(path!(IsAvailable), "sometimes").unwrap();

    let err = CriteriaCompiler::default().compile_to_plan(&spec).unwrap_err();
    match err {
        CriteriaError::OperandConversion { path, expected, .. } => {
            assert_eq!(path, "IsAvailable");
            assert_eq!(expected, "bool");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_projections_and_result_type() {
    let mut spec = spec_for::<Loan>();
    spec.select(path!(Key, Borrower.Name)).unwrap();
    spec.order_by_descending(path!(LoanDate)).unwrap();
    spec.set_result_type("LoanSummary");

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();
    assert_eq!(
        plan.projections(),
        &[
            Projection::new("this.Key", "Key"),
            Projection::new("alias_1.Name", "Name"),
        ]
    );
    assert_eq!(plan.orders(), &[Order::desc("this.LoanDate")]);
    assert_eq!(plan.result_type(), Some("LoanSummary"));
    assert_eq!(
        plan.to_sql(),
        "SELECT this.Key AS Key, alias_1.Name AS Name FROM Loan this \
         INNER JOIN this.Borrower alias_1 ORDER BY this.LoanDate DESC"
    );
}

#[test]
fn test_select_relationship_projects_scalar_columns_only() {
    let mut spec = spec_for::<Borrower>();
    spec.select(path!(Loans)).unwrap();

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();
    let aliases: Vec<&str> = plan.projections().iter().map(|p| p.alias.as_str()).collect();
    assert_eq!(aliases, vec!["Key", "LoanDate", "ReturnDate"]);
}

#[test]
fn test_outcome_counts() {
    let mut spec = spec_for::<Author>();
    spec.equal(path!(Country), "India")
        .unwrap()
        .or()
        .equal(path!(Country), "USA")
        .unwrap();
    spec.select(path!(Name, Books.Title)).unwrap();

    let mut plan = CompiledQuery::new("Author", "this");
    let outcome = CriteriaCompiler::default().compile(&spec, &mut plan).unwrap();
    assert_eq!(outcome.clauses, 1);
    assert_eq!(outcome.projections, 2);
    assert_eq!(outcome.join_tree.join_count(), 1);
    assert_eq!(plan.where_clause().map(|p| p.term_count()), Some(2));
}

#[test]
fn test_configured_aliases_flow_into_plan() {
    let config = CompilerConfig {
        root_alias: "a".to_string(),
        alias_prefix: "j".to_string(),
        log_compiled_sql: true,
        ..CompilerConfig::default()
    };
    let mut spec = spec_for::<Author>();
    spec.equal(path!(Books.Genre), "Poetry").unwrap();

    let plan = CriteriaCompiler::new(config).compile_to_plan(&spec).unwrap();
    assert_eq!(
        plan.to_sql(),
        "SELECT a.* FROM Author a INNER JOIN a.Books j1 WHERE j1.Genre = 'Poetry'"
    );
}
