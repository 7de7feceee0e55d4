//! Filtering and date-range querying over loaded records.
//!
//! Filters are conjunctive: every supplied field must match its record
//! field exactly, except `authors`, which matches on substring containment
//! (a record usually lists several contributors in one field). Dates use
//! the catalog's fixed `MM/DD/YYYY` form; a stored value that does not
//! parse simply never matches a date query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::Book;

/// External date format for `publication_date` values and range bounds.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a catalog date. `None` for anything not in `MM/DD/YYYY` form.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Field filters for the listing operation, combined with logical AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    pub title: Option<String>,
    /// Substring match against the record's contributor list.
    pub authors: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub price: Option<String>,
    pub publication_date: Option<String>,
    pub language_code: Option<String>,
    pub isbn: Option<String>,
}

impl BookFilter {
    /// True when no field is supplied (matches everything).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.category.is_none()
            && self.publisher.is_none()
            && self.price.is_none()
            && self.publication_date.is_none()
            && self.language_code.is_none()
            && self.isbn.is_none()
    }

    /// Whether the record satisfies every supplied filter field.
    pub fn matches(&self, book: &Book) -> bool {
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().is_none_or(|f| f == value)
        }

        eq(&self.title, &book.title)
            && self
                .authors
                .as_deref()
                .is_none_or(|a| book.authors.contains(a))
            && eq(&self.category, &book.category)
            && eq(&self.publisher, &book.publisher)
            && eq(&self.price, &book.price)
            && eq(&self.publication_date, &book.publication_date)
            && eq(&self.language_code, &book.language_code)
            && eq(&self.isbn, &book.isbn)
    }
}

/// Sort direction for date-ordered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse the external `ASC` / `DESC` form (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Ascending),
            "DESC" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Records whose publication date parses and falls in `[start, end]`
/// inclusive, stably sorted by date in the given order.
///
/// Records with unparseable dates are excluded, never an error; ties keep
/// their original relative order.
pub fn range_query(
    books: Vec<Book>,
    start: NaiveDate,
    end: NaiveDate,
    order: SortOrder,
) -> Vec<Book> {
    let mut dated: Vec<(NaiveDate, Book)> = books
        .into_iter()
        .filter_map(|b| parse_date(&b.publication_date).map(|d| (d, b)))
        .filter(|(d, _)| *d >= start && *d <= end)
        .collect();

    // sort_by is stable, so equal dates preserve file order in both
    // directions.
    match order {
        SortOrder::Ascending => dated.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => dated.sort_by(|a, b| b.0.cmp(&a.0)),
    }
    dated.into_iter().map(|(_, b)| b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, authors: &str, date: &str) -> Book {
        Book {
            id: id.into(),
            title: title.into(),
            authors: authors.into(),
            publication_date: date.into(),
            ..Book::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = BookFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&book("1", "Dune", "Frank Herbert", "06/01/1965")));
    }

    #[test]
    fn filters_combine_with_and() {
        let b = book("1", "Dune", "Frank Herbert", "06/01/1965");
        let both = BookFilter {
            title: Some("Dune".into()),
            publication_date: Some("06/01/1965".into()),
            ..BookFilter::default()
        };
        assert!(both.matches(&b));

        // One matching and one non-matching field must reject.
        let mixed = BookFilter {
            title: Some("Dune".into()),
            publisher: Some("Tor".into()),
            ..BookFilter::default()
        };
        assert!(!mixed.matches(&b));
    }

    #[test]
    fn authors_matches_on_substring() {
        let b = book("1", "Good Omens", "Terry Pratchett/Neil Gaiman", "05/01/1990");
        let filter = BookFilter {
            authors: Some("Gaiman".into()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&b));

        let filter = BookFilter {
            authors: Some("Adams".into()),
            ..BookFilter::default()
        };
        assert!(!filter.matches(&b));
    }

    #[test]
    fn title_is_exact_not_substring() {
        let b = book("1", "Dune Messiah", "Frank Herbert", "01/01/1969");
        let filter = BookFilter {
            title: Some("Dune".into()),
            ..BookFilter::default()
        };
        assert!(!filter.matches(&b));
    }

    #[test]
    fn parse_date_accepts_only_the_fixed_format() {
        assert_eq!(
            parse_date("01/31/2020"),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(parse_date("2020-01-31"), None);
        assert_eq!(parse_date("13/01/2020"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn sort_order_parses_external_form() {
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Ascending));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Descending));
        assert_eq!(SortOrder::parse("upwards"), None);
    }

    #[test]
    fn range_query_filters_sorts_and_skips_bad_dates() {
        let books = vec![
            book("1", "A", "x", "01/01/2020"),
            book("2", "B", "x", "06/15/2021"),
            book("3", "C", "x", "12/31/2019"),
            book("4", "D", "x", "someday"),
        ];
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();

        let asc = range_query(books.clone(), start, end, SortOrder::Ascending);
        let ids: Vec<&str> = asc.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);

        let desc = range_query(books, start, end, SortOrder::Descending);
        let ids: Vec<&str> = desc.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn equal_dates_keep_file_order() {
        let books = vec![
            book("1", "first", "x", "03/03/2021"),
            book("2", "second", "x", "03/03/2021"),
            book("3", "third", "x", "03/03/2021"),
        ];
        let day = NaiveDate::from_ymd_opt(2021, 3, 3).unwrap();

        let asc = range_query(books.clone(), day, day, SortOrder::Ascending);
        let ids: Vec<&str> = asc.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        let desc = range_query(books, day, day, SortOrder::Descending);
        let ids: Vec<&str> = desc.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }
}
