// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Naming conventions: the configurable transform from a native field name
//! to a document key.
//!
//! A convention is a pure function applied once per field, at descriptor
//! construction time. It never runs during serialization or
//! deserialization, and an explicit rename bypasses it entirely.
use std::fmt;

/// The case rule applied after a name is split into segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Case {
    /// Keep the native casing.
    #[default]
    Preserve,
    /// Lowercase the whole key.
    Lower,
    /// Lowercase only the leading character.
    Camel,
}

/// A document-key naming convention: an optional delimiter inserted at
/// capitalization boundaries, plus a [`Case`] rule.
///
/// The default convention is the identity transform.
///
/// # Examples
///
/// ```rust
/// use docmap::NamingConvention;
///
/// let snake = NamingConvention::lower_case_delimiter('_');
/// assert_eq!(snake.resolve("MyGuid"), "my_guid");
/// assert_eq!(snake.resolve("ParseHTTPHeader"), "parse_http_header");
///
/// let camel = NamingConvention::camel_case();
/// assert_eq!(camel.resolve("MyGuid"), "myGuid");
///
/// assert_eq!(NamingConvention::default().resolve("MyGuid"), "MyGuid");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamingConvention {
    delimiter: Option<char>,
    case: Case,
}

impl NamingConvention {
    pub fn new(delimiter: Option<char>, case: Case) -> Self {
        Self { delimiter, case }
    }

    /// Lowercase with a delimiter at every word boundary, e.g.
    /// `MyGuid` → `my_guid`.
    pub fn lower_case_delimiter(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
            case: Case::Lower,
        }
    }

    /// Leading lowercase without delimiters, e.g. `MyGuid` → `myGuid`.
    pub fn camel_case() -> Self {
        Self {
            delimiter: None,
            case: Case::Camel,
        }
    }

    /// Transforms a native field name into its document key.
    pub fn resolve(&self, name: &str) -> String {
        let mut key = String::with_capacity(name.len() + 4);
        for (i, segment) in split_words(name).enumerate() {
            if i > 0
                && let Some(delimiter) = self.delimiter
            {
                key.push(delimiter);
            }
            match self.case {
                Case::Lower => key.extend(segment.chars().flat_map(char::to_lowercase)),
                Case::Preserve | Case::Camel => key.push_str(segment),
            }
        }
        if self.case == Case::Camel {
            lowercase_first(&mut key);
        }
        key
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.delimiter, self.case) {
            (None, Case::Preserve) => f.write_str("identity"),
            (delimiter, case) => write!(f, "{case:?} with delimiter {delimiter:?}"),
        }
    }
}

/// Splits a name at capitalization boundaries.
///
/// A boundary sits before an uppercase character that follows a lowercase
/// character or digit, and before the last uppercase character of an
/// uppercase run that is followed by a lowercase character (so `HTTPHeader`
/// splits as `HTTP` + `Header`).
fn split_words(name: &str) -> impl Iterator<Item = &str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut boundaries = vec![0];
    for w in 1..chars.len() {
        let (i, cur) = chars[w];
        if !cur.is_uppercase() {
            continue;
        }
        let (_, prev) = chars[w - 1];
        let follows_word = prev.is_lowercase() || prev.is_ascii_digit();
        let ends_upper_run = prev.is_uppercase()
            && chars.get(w + 1).is_some_and(|&(_, next)| next.is_lowercase());
        if follows_word || ends_upper_run {
            boundaries.push(i);
        }
    }
    boundaries.push(name.len());
    boundaries
        .windows(2)
        .map(|w| &name[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .into_iter()
}

fn lowercase_first(key: &mut String) {
    if let Some(first) = key.chars().next()
        && first.is_uppercase()
    {
        let lowered: String = first.to_lowercase().collect();
        key.replace_range(..first.len_utf8(), &lowered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_default() {
        let convention = NamingConvention::default();
        assert_eq!(convention.resolve("MyDateTimeNullable"), "MyDateTimeNullable");
    }

    #[test]
    fn lower_snake_inserts_delimiters_at_word_boundaries() {
        let convention = NamingConvention::lower_case_delimiter('_');
        assert_eq!(convention.resolve("MyId"), "my_id");
        assert_eq!(convention.resolve("MyGuid"), "my_guid");
        assert_eq!(convention.resolve("MyDateTimeNullable"), "my_date_time_nullable");
        assert_eq!(convention.resolve("MyNameValueCollection"), "my_name_value_collection");
    }

    #[test]
    fn uppercase_runs_stay_together() {
        let convention = NamingConvention::lower_case_delimiter('_');
        assert_eq!(convention.resolve("MyGUID"), "my_guid");
        assert_eq!(convention.resolve("ParseHTTPHeader"), "parse_http_header");
    }

    #[test]
    fn camel_case_only_lowers_the_first_character() {
        let convention = NamingConvention::camel_case();
        assert_eq!(convention.resolve("MyDateTime"), "myDateTime");
        assert_eq!(convention.resolve("already"), "already");
    }

    #[test]
    fn single_words_and_digits_survive() {
        let convention = NamingConvention::lower_case_delimiter('_');
        assert_eq!(convention.resolve("Id"), "id");
        assert_eq!(convention.resolve("Field2Name"), "field2_name");
    }
}
