//! Line codec for the catalog file.
//!
//! One record is one comma-delimited line. A field value containing the
//! delimiter or the quote character is wrapped in quotes with internal
//! quotes doubled, so `decode(encode(b)) == b` for every valid record.
//! Lines that do not decode to exactly [`FIELD_COUNT`] fields are rejected;
//! the caller decides whether to skip or abort.

use crate::error::CodecError;
use crate::record::{Book, FIELD_COUNT};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Escape a single field value for the line format.
///
/// Values without delimiters or quotes pass through unchanged.
fn escape(value: &str) -> String {
    if value.contains(DELIMITER) || value.contains(QUOTE) {
        let mut out = String::with_capacity(value.len() + 2);
        out.push(QUOTE);
        for c in value.chars() {
            if c == QUOTE {
                out.push(QUOTE);
            }
            out.push(c);
        }
        out.push(QUOTE);
        out
    } else {
        value.to_string()
    }
}

/// Render a record as one line, fields in header order.
pub fn encode(book: &Book) -> String {
    let fields = book.fields();
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&escape(field));
    }
    out
}

/// Parse one line into a record.
///
/// Splits on the delimiter respecting quoted spans. A doubled quote inside
/// a quoted span decodes to one literal quote.
pub fn decode(line: &str) -> Result<Book, CodecError> {
    let values = split_line(line)?;
    if values.len() != FIELD_COUNT {
        return Err(CodecError::FieldCount {
            expected: FIELD_COUNT,
            actual: values.len(),
        });
    }
    Ok(Book::from_fields(values))
}

/// Split a line into raw field values, undoing the escaping.
fn split_line(line: &str) -> Result<Vec<String>, CodecError> {
    let mut values = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    // Doubled quote: one literal quote.
                    chars.next();
                    current.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == QUOTE {
            in_quotes = true;
        } else if c == DELIMITER {
            values.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    if in_quotes {
        return Err(CodecError::UnterminatedQuote);
    }
    values.push(current);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book {
            id: "1".into(),
            title: "The Fellowship of the Ring".into(),
            authors: "J.R.R. Tolkien".into(),
            avg_rating: "4.38".into(),
            isbn: "0618346252".into(),
            isbn13: "9780618346257".into(),
            language_code: "eng".into(),
            num_pages: "398".into(),
            ratings_count: "2128944".into(),
            text_reviews_count: "33964".into(),
            publication_date: "07/28/1954".into(),
            publisher: "Houghton Mifflin".into(),
            description: "First part of the trilogy".into(),
            category: "Fantasy".into(),
            price: "12.99".into(),
        }
    }

    #[test]
    fn round_trip_plain() {
        let book = sample();
        assert_eq!(decode(&encode(&book)).unwrap(), book);
    }

    #[test]
    fn round_trip_delimiters_and_quotes() {
        let mut book = sample();
        book.title = "Jonathan Strange & Mr Norrell, Vol. 1".into();
        book.authors = "Clarke, Susanna".into();
        book.description = "He said \"impossible\", then did it".into();
        book.publisher = "\"".into();
        book.category = ",".into();
        assert_eq!(decode(&encode(&book)).unwrap(), book);
    }

    #[test]
    fn round_trip_empty_fields() {
        let book = Book {
            id: "9".into(),
            ..Book::default()
        };
        assert_eq!(decode(&encode(&book)).unwrap(), book);
    }

    #[test]
    fn encode_quotes_only_when_needed() {
        let mut book = sample();
        book.authors = "Clarke, Susanna".into();
        let line = encode(&book);
        assert!(line.contains("\"Clarke, Susanna\""));
        assert!(line.contains("The Fellowship of the Ring"));
        assert!(!line.contains("\"The Fellowship of the Ring\""));
    }

    #[test]
    fn decode_rejects_short_line() {
        let err = decode("1,only,three").unwrap_err();
        assert_eq!(
            err,
            CodecError::FieldCount {
                expected: FIELD_COUNT,
                actual: 3
            }
        );
    }

    #[test]
    fn decode_rejects_long_line() {
        let line = vec!["x"; FIELD_COUNT + 2].join(",");
        let err = decode(&line).unwrap_err();
        assert_eq!(
            err,
            CodecError::FieldCount {
                expected: FIELD_COUNT,
                actual: FIELD_COUNT + 2
            }
        );
    }

    #[test]
    fn decode_rejects_unterminated_quote() {
        let line = format!("1,\"open{}", ",x".repeat(FIELD_COUNT - 2));
        assert_eq!(decode(&line).unwrap_err(), CodecError::UnterminatedQuote);
    }

    #[test]
    fn doubled_quotes_decode_to_one() {
        let fields = split_line("a,\"say \"\"hi\"\"\",c").unwrap();
        assert_eq!(fields, vec!["a", "say \"hi\"", "c"]);
    }
}
