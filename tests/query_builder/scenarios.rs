//! End-to-end compilation of the canonical library queries

use crate::common::{spec_for, Author, Book, Loan};
use chrono::NaiveDate;
use fluent_criteria::criteria::Predicate;
use fluent_criteria::path;
use fluent_criteria::prelude::*;
use fluent_criteria::{Entity, Pagination};

#[test]
fn scenario_a_two_groups_form_a_conjunction() {
    let mut spec = spec_for::<Author>();
    spec.equal(path!(Country), "India").unwrap();
    spec.is_not_null(path!(Email)).unwrap();

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();

    assert_eq!(spec.groups().len(), 2);
    assert!(plan.joins().is_empty());
    assert_eq!(
        plan.where_clause(),
        Some(Predicate::and(vec![
            Predicate::or(vec![Predicate::eq("this.Country", "India".into())]),
            Predicate::or(vec![Predicate::is_not_null("this.Email")]),
        ]))
    );
    assert_eq!(
        plan.to_sql(),
        "SELECT this.* FROM Author this WHERE this.Country = 'India' AND this.Email IS NOT NULL"
    );
}

#[test]
fn scenario_b_or_continued_group_joins_borrower_once() {
    let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

    let mut spec = spec_for::<Loan>();
    spec.between(path!(LoanDate), d1, d2)
        .unwrap()
        .or()
        .is_not_null(path!(Borrower.Name))
        .unwrap();

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();

    assert_eq!(spec.groups().len(), 1);
    assert_eq!(plan.joins().len(), 1);
    assert_eq!(plan.joins()[0].property, "Borrower");
    assert_eq!(plan.joins()[0].alias, "alias_1");
    assert_eq!(plan.predicates().len(), 1);
    assert_eq!(
        plan.predicates()[0],
        Predicate::or(vec![
            Predicate::between(
                "this.LoanDate",
                Value::DateTime(d1.and_hms_opt(0, 0, 0).unwrap()),
                Value::DateTime(d2.and_hms_opt(0, 0, 0).unwrap()),
            ),
            Predicate::is_not_null("alias_1.Name"),
        ])
    );
}

#[test]
fn scenario_c_select_collection_expands_to_book_columns() {
    let mut spec = spec_for::<Author>();
    spec.select(path!(Books)).unwrap();

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();
    let book_columns: Vec<String> = Book::entity_type()
        .scalar_properties()
        .map(|p| p.name.clone())
        .collect();

    assert_eq!(plan.joins().len(), 1);
    assert_eq!(plan.joins()[0].property, "Books");
    assert_eq!(plan.projections().len(), book_columns.len());
    assert_eq!(book_columns.len(), 6);
    assert!(plan
        .projections()
        .iter()
        .all(|p| p.property == format!("alias_1.{}", p.alias)));
    assert!(plan.predicates().is_empty());
}

#[test]
fn scenario_d_take_then_order_compiles() {
    let mut spec = spec_for::<Author>();
    spec.take(10).unwrap();
    spec.order_by_ascending(path!(Name)).unwrap();

    let plan = CriteriaCompiler::default().compile_to_plan(&spec).unwrap();

    assert_eq!(plan.pagination(), Pagination::limit_only(10));
    assert_eq!(plan.orders().len(), 1);
    assert_eq!(
        plan.to_sql(),
        "SELECT this.* FROM Author this ORDER BY this.Name ASC LIMIT 10"
    );
}

#[test]
fn scenario_e_filter_after_order_is_rejected() {
    let mut spec = spec_for::<Author>();
    spec.order_by_ascending(path!(Name)).unwrap();

    let err = spec.equal(path!(Country), "X").unwrap_err();
    assert!(matches!(err, CriteriaError::InvalidSequence { .. }));
}
