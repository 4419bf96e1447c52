//! Library domain used across the integration tests: authors write books,
//! borrowers take books out on loan.

use chrono::NaiveDateTime;
use fluent_criteria::schema::{Entity, EntityType, ScalarType, Schema, SchemaProvider};
use fluent_criteria::QuerySpec;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Author {
    pub key: i32,
    pub name: String,
    pub birth_date: NaiveDateTime,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub nationality: String,
}

impl Entity for Author {
    fn entity_type() -> EntityType {
        EntityType::new("Author")
            .scalar("Key", ScalarType::Int32)
            .scalar("Name", ScalarType::String)
            .scalar("BirthDate", ScalarType::DateTime)
            .scalar("City", ScalarType::String)
            .scalar("Country", ScalarType::String)
            .scalar("Phone", ScalarType::String)
            .scalar("Email", ScalarType::String)
            .scalar("Nationality", ScalarType::String)
            .collection("Books", "Book")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    pub key: i32,
    pub title: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub published_year: i32,
    pub genre: String,
    pub is_available: bool,
}

impl Entity for Book {
    fn entity_type() -> EntityType {
        EntityType::new("Book")
            .scalar("Key", ScalarType::Int32)
            .scalar("Title", ScalarType::String)
            .scalar("ISBN", ScalarType::String)
            .scalar("PublishedYear", ScalarType::Int32)
            .reference("Author", "Author")
            .scalar("Genre", ScalarType::String)
            .scalar("IsAvailable", ScalarType::Bool)
            .collection("Loans", "Loan")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Borrower {
    pub key: i32,
    pub name: String,
    pub email: String,
}

impl Entity for Borrower {
    fn entity_type() -> EntityType {
        EntityType::new("Borrower")
            .scalar("Key", ScalarType::Int32)
            .scalar("Name", ScalarType::String)
            .scalar("Email", ScalarType::String)
            .collection("Loans", "Loan")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Loan {
    pub key: i32,
    pub loan_date: NaiveDateTime,
    pub return_date: Option<NaiveDateTime>,
}

impl Entity for Loan {
    fn entity_type() -> EntityType {
        EntityType::new("Loan")
            .scalar("Key", ScalarType::Int32)
            .reference("Book", "Book")
            .reference("Borrower", "Borrower")
            .scalar("LoanDate", ScalarType::DateTime)
            .optional("ReturnDate", ScalarType::DateTime)
    }
}

/// Projection target for `select(path!(Key, Name, Email))` on authors
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorContact {
    pub key: i32,
    pub name: String,
    pub email: String,
}

pub fn library_schema() -> Arc<dyn SchemaProvider> {
    Arc::new(
        Schema::builder()
            .register::<Author>()
            .register::<Book>()
            .register::<Borrower>()
            .register::<Loan>()
            .build(),
    )
}

pub fn spec_for<T: Entity>() -> QuerySpec {
    QuerySpec::of::<T>(library_schema()).expect("library entity is registered")
}
