//! Field tag microsyntax.
//!
//! A tag is a semicolon-separated list of `key:value` pairs. A bare `key`
//! without a colon maps to the empty string, and a later duplicate key
//! replaces an earlier one. Whitespace around keys and values is ignored.
//!
//! ```
//! use wasil_support::tag;
//!
//! let parsed = tag::parse("named:replica; optional").unwrap();
//! assert_eq!(parsed.get("named"), Some("replica"));
//! assert_eq!(parsed.get("optional"), Some(""));
//! ```

use std::collections::BTreeMap;

/// Key selecting the namespace a field is resolved from.
pub const NAMED: &str = "named";

/// Errors produced while parsing a tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// A segment had a value but no key, e.g. `":replica"`.
    #[error("tag segment {segment:?} has an empty key")]
    EmptyKey { segment: String },
}

/// Parsed tag options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    options: BTreeMap<String, String>,
}

impl Tag {
    /// Returns the value stored for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Returns the namespace requested through the `named` key.
    pub fn namespace(&self) -> Option<&str> {
        self.get(NAMED)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Parses a tag string into its options.
///
/// # Errors
/// Returns [`TagError::EmptyKey`] for segments such as `":value"`.
pub fn parse(raw: &str) -> Result<Tag, TagError> {
    let mut options = BTreeMap::new();

    for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = match segment.split_once(':') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (segment, ""),
        };

        if key.is_empty() {
            return Err(TagError::EmptyKey {
                segment: segment.to_string(),
            });
        }

        options.insert(key.to_string(), value.to_string());
    }

    Ok(Tag { options })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_directive() {
        let tag = parse("named:one").unwrap();
        assert_eq!(tag.namespace(), Some("one"));
    }

    #[test]
    fn bare_key_maps_to_empty_value() {
        let tag = parse("flag").unwrap();
        assert_eq!(tag.get("flag"), Some(""));
        assert_eq!(tag.namespace(), None);
    }

    #[test]
    fn value_may_contain_colons() {
        let tag = parse("named:db:replica").unwrap();
        assert_eq!(tag.namespace(), Some("db:replica"));
    }

    #[test]
    fn later_keys_win() {
        let tag = parse("named:one;named:two").unwrap();
        assert_eq!(tag.namespace(), Some("two"));
    }

    #[test]
    fn empty_segments_are_ignored() {
        let tag = parse(";; named:one ;").unwrap();
        assert_eq!(tag.namespace(), Some("one"));
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_eq!(
            parse(":one"),
            Err(TagError::EmptyKey { segment: ":one".to_string() })
        );
    }
}
