//! The book record and its on-disk schema.
//!
//! One `Book` is one line of the catalog file. The field set merges the two
//! schema generations the catalog has carried: the ratings/ISBN block and
//! the later description/category/price block. The header order here is the
//! fixed on-disk order; [`crate::codec`] renders and parses lines against it.

use serde::{Deserialize, Serialize};

/// Number of fields in the on-disk schema.
pub const FIELD_COUNT: usize = 15;

/// Field names in on-disk order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "id",
    "title",
    "authors",
    "avg_rating",
    "isbn",
    "isbn13",
    "language_code",
    "num_pages",
    "ratings_count",
    "text_reviews_count",
    "publication_date",
    "publisher",
    "description",
    "category",
    "price",
];

/// The catalog file's fixed header line.
pub const HEADER: &str = "id,title,authors,avg_rating,isbn,isbn13,language_code,num_pages,\
                          ratings_count,text_reviews_count,publication_date,publisher,\
                          description,category,price";

/// One book's persisted attribute set, identified by `id`.
///
/// All fields are scalar text. `id` is assigned by the store on create and
/// immutable afterwards; the numeric-looking fields (ratings, page counts,
/// price) are stored verbatim as text, never reformatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub avg_rating: String,
    pub isbn: String,
    pub isbn13: String,
    pub language_code: String,
    pub num_pages: String,
    pub ratings_count: String,
    pub text_reviews_count: String,
    /// Publication date as `MM/DD/YYYY`.
    pub publication_date: String,
    pub publisher: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

impl Book {
    /// Field values in on-disk order.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.id,
            &self.title,
            &self.authors,
            &self.avg_rating,
            &self.isbn,
            &self.isbn13,
            &self.language_code,
            &self.num_pages,
            &self.ratings_count,
            &self.text_reviews_count,
            &self.publication_date,
            &self.publisher,
            &self.description,
            &self.category,
            &self.price,
        ]
    }

    /// Build a record from field values in on-disk order.
    ///
    /// The caller (the codec) has already checked the count.
    pub(crate) fn from_fields(mut values: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), FIELD_COUNT);
        let mut next = || values.remove(0);
        Self {
            id: next(),
            title: next(),
            authors: next(),
            avg_rating: next(),
            isbn: next(),
            isbn13: next(),
            language_code: next(),
            num_pages: next(),
            ratings_count: next(),
            text_reviews_count: next(),
            publication_date: next(),
            publisher: next(),
            description: next(),
            category: next(),
            price: next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_field_names() {
        assert_eq!(HEADER, FIELD_NAMES.join(","));
    }

    #[test]
    fn fields_round_trip_through_from_fields() {
        let values: Vec<String> = (0..FIELD_COUNT).map(|i| format!("v{i}")).collect();
        let book = Book::from_fields(values.clone());
        let back: Vec<String> = book.fields().iter().map(|s| s.to_string()).collect();
        assert_eq!(back, values);
    }
}
