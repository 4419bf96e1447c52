use crate::common::{spec_for, Author, Book, Borrower, Loan};
use fluent_criteria::path;
use fluent_criteria::prelude::*;
use fluent_criteria::query_builder::JoinTree;

fn compile(spec: &QuerySpec) -> (CompiledQuery, JoinTree) {
    let compiler = CriteriaCompiler::default();
    let mut plan = CompiledQuery::new(spec.root(), "this");
    let outcome = compiler.compile(spec, &mut plan).unwrap();
    (plan, outcome.join_tree)
}

#[test]
fn test_same_relationship_from_different_groups_shares_alias() {
    let mut spec = spec_for::<Loan>();
    spec.equal(path!(Borrower.Name), "Asha").unwrap();
    spec.is_not_null(path!(Borrower.Email)).unwrap();
    spec.order_by_ascending(path!(Borrower.Name)).unwrap();

    let (plan, tree) = compile(&spec);

    assert_eq!(tree.join_count(), 1);
    assert_eq!(plan.joins().len(), 1);
    assert_eq!(plan.orders()[0].property, "alias_1.Name");
    assert_eq!(tree.aliases(), vec!["alias_1"]);
}

#[test]
fn test_aliases_follow_first_traversal_order() {
    let mut spec = spec_for::<Loan>();
    spec.equal(path!(Borrower.Name), "Asha").unwrap();
    spec.equal(path!(Book.Author.Country), "India").unwrap();
    spec.equal(path!(Book.Genre), "Fiction").unwrap();

    let (plan, tree) = compile(&spec);

    let joined: Vec<(&str, &str, &str)> = plan
        .joins()
        .iter()
        .map(|j| (j.parent_alias.as_str(), j.property.as_str(), j.alias.as_str()))
        .collect();
    assert_eq!(
        joined,
        vec![
            ("this", "Borrower", "alias_1"),
            ("this", "Book", "alias_2"),
            ("alias_2", "Author", "alias_3"),
        ]
    );

    let book = tree.child(JoinTree::ROOT, "Book").unwrap();
    let author = tree.child(book, "Author").unwrap();
    assert_eq!(tree.path_of(author), "Book.Author");
    assert_eq!(tree.node(author).parent, Some(book));
}

#[test]
fn test_join_kind_comes_from_the_specification() {
    let mut spec = spec_for::<Book>().left_outer();
    spec.is_like(path!(Author.Name), "R%").unwrap();

    let (plan, tree) = compile(&spec);
    assert_eq!(plan.joins()[0].kind, JoinKind::LeftOuter);
    assert_eq!(tree.root().join_kind, JoinKind::LeftOuter);
    assert!(plan.to_sql().contains("LEFT OUTER JOIN this.Author alias_1"));
}

#[test]
fn test_fetch_registers_join_reused_by_filters() {
    let mut spec = spec_for::<Author>();
    spec.fetch(path!(Books)).unwrap();
    spec.greater_than(path!(Books.PublishedYear), 2000).unwrap();

    let (plan, tree) = compile(&spec);
    assert_eq!(tree.join_count(), 1);
    assert_eq!(
        plan.where_clause().map(|p| p.to_sql()),
        Some("alias_1.PublishedYear > 2000".to_string())
    );
}

#[test]
fn test_recompiling_derives_fresh_trees() {
    let mut spec = spec_for::<Borrower>();
    spec.equal(path!(Loans.Book.Title), "Dune").unwrap();

    let (first_plan, first_tree) = compile(&spec);
    let (second_plan, second_tree) = compile(&spec);

    assert_eq!(first_tree.aliases(), second_tree.aliases());
    assert_eq!(first_plan, second_plan);
    assert_eq!(second_tree.aliases(), vec!["alias_1", "alias_2"]);
}
