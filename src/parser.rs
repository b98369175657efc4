//! Delimited record parsing.
//!
//! Splits one logical record into raw field strings, honouring a single
//! quoting character inside which the delimiter is not a field boundary.
//! The functions here are pure; reading and folding physical lines is done
//! by [`crate::reader`].

use crate::config::ParserConfig;

/// Count delimiters that are not inside a quoted span
pub fn count_unquoted_delimiters(text: &str, delimiter: char, quote: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;

    for ch in text.chars() {
        if ch == quote {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            count += 1;
        }
    }

    count
}

/// Check whether the accumulated text still lacks field boundaries
///
/// A quoted value containing a line break leaves the record short of
/// `field_count - 1` unquoted delimiters until the next physical line is
/// appended.
pub fn needs_continuation(text: &str, config: &ParserConfig) -> bool {
    count_unquoted_delimiters(text, config.delimiter, config.quote)
        < config.field_count.saturating_sub(1)
}

/// Split a logical record into raw fields
///
/// Quote characters toggle the quoted state and are not part of the value.
/// An empty field (two consecutive delimiters, or a leading delimiter) is
/// `None`. A short record yields fewer fields than `field_count`; the caller
/// decides what to do with a record that yields more.
pub fn split_record(text: &str, config: &ParserConfig) -> Vec<Option<String>> {
    let mut fields = Vec::with_capacity(config.field_count);
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        if ch == config.quote {
            in_quotes = !in_quotes;
            continue;
        }

        if ch == config.delimiter && !in_quotes {
            fields.push(take_field(&mut current));
            continue;
        }

        current.push(ch);
    }
    fields.push(take_field(&mut current));

    fields
}

fn take_field(current: &mut String) -> Option<String> {
    if current.is_empty() {
        None
    } else {
        Some(std::mem::take(current))
    }
}
