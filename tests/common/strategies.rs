use fluent_criteria::path::Expr;
use fluent_criteria::Value;
use proptest::prelude::*;

/// Scalar Author columns paired with a literal of a matching type
pub fn author_filter_strategy() -> impl Strategy<Value = (Expr, Value)> {
    prop_oneof![
        (0i32..1000).prop_map(|key| (fluent_criteria::path!(Key), Value::Int32(key))),
        "[A-Z][a-z]{1,12}".prop_map(|name| (fluent_criteria::path!(Name), Value::String(name))),
        "(India|USA|UK|France)".prop_map(|c| (fluent_criteria::path!(Country), Value::String(c))),
        "[a-z]{3,8}@example\\.com".prop_map(|e| (fluent_criteria::path!(Email), Value::String(e))),
    ]
}

/// Paths from Loan that walk at least one relationship
pub fn loan_relationship_path_strategy() -> impl Strategy<Value = Expr> {
    prop_oneof![
        Just(fluent_criteria::path!(Book.Title)),
        Just(fluent_criteria::path!(Book.Genre)),
        Just(fluent_criteria::path!(Book.Author.Name)),
        Just(fluent_criteria::path!(Book.Author.Country)),
        Just(fluent_criteria::path!(Borrower.Name)),
        Just(fluent_criteria::path!(Borrower.Email)),
    ]
}

/// Non-negative Skip/Take counts
pub fn row_count_strategy() -> impl Strategy<Value = i64> {
    0i64..=10_000
}
