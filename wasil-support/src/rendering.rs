//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format resolution chains, type names,
//! and "did you mean?" suggestions in error output.

/// One frame of a resolution chain, prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Service label, e.g. `Arc<dyn Logger>` or `Arc<Database>["replica"]`.
    pub service: String,
    /// Lifetime of the binding that served the frame (`singleton`, ...).
    pub lifetime: String,
    /// Render the service label in uppercase.
    pub highlight: bool,
}

/// Renders a resolution chain on a single line.
///
/// # Examples
/// ```
/// use wasil_support::rendering::{render_chain, ChainEntry};
///
/// let chain = vec![
///     ChainEntry { service: "Foo".into(), lifetime: "transient".into(), highlight: true },
///     ChainEntry { service: "Bar".into(), lifetime: "singleton".into(), highlight: false },
///     ChainEntry { service: "Foo".into(), lifetime: "transient".into(), highlight: true },
/// ];
/// assert_eq!(
///     render_chain(&chain),
///     "FOO (transient) → Bar (singleton) → FOO (transient)"
/// );
/// ```
pub fn render_chain(chain: &[ChainEntry]) -> String {
    chain
        .iter()
        .map(|entry| {
            let service = if entry.highlight {
                entry.service.to_uppercase()
            } else {
                entry.service.clone()
            };
            format!("{service} ({})", entry.lifetime)
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use wasil_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Picks the registered names closest to `requested`.
///
/// Used to point at a likely typo when a namespace lookup misses.
/// Exact case-insensitive matches and substrings rank first, then names
/// sharing a common prefix of at least three characters.
pub fn suggest_similar<'a>(
    requested: &str,
    available: impl IntoIterator<Item = &'a str>,
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .into_iter()
        .filter(|name| *name != requested)
        .filter_map(|name| {
            let name_lower = name.to_lowercase();

            if name_lower == requested_lower {
                return Some((name, 200));
            }

            if !requested_lower.is_empty()
                && !name_lower.is_empty()
                && (name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower))
            {
                return Some((name, 100));
            }

            let common = name_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(service: &str, lifetime: &str, highlight: bool) -> ChainEntry {
        ChainEntry {
            service: service.to_string(),
            lifetime: lifetime.to_string(),
            highlight,
        }
    }

    #[test]
    fn render_plain_chain() {
        let chain = vec![entry("foo", "singleton", false), entry("bar", "singleton", false)];
        assert_eq!(render_chain(&chain), "foo (singleton) → bar (singleton)");
    }

    #[test]
    fn render_highlighted_chain() {
        let chain = vec![entry("foo", "singleton", false), entry("bar", "singleton", true)];
        assert_eq!(render_chain(&chain), "foo (singleton) → BAR (singleton)");
    }

    #[test]
    fn render_empty_chain() {
        assert_eq!(render_chain(&[]), "");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_type_name("alloc::sync::Arc<core::option::Option<my_app::Db>>"),
            "Arc<Option<Db>>"
        );
    }

    #[test]
    fn shorten_keeps_plain_names() {
        assert_eq!(shorten_type_name("i32"), "i32");
        assert_eq!(shorten_type_name("&str"), "&str");
    }

    #[test]
    fn suggests_case_variant_first() {
        let suggestions = suggest_similar("Primary", ["replica", "primary", "primary_old"], 2);
        assert_eq!(suggestions, vec!["primary".to_string(), "primary_old".to_string()]);
    }

    #[test]
    fn suggests_common_prefix() {
        let suggestions = suggest_similar("replika", ["replica", "cache"], 3);
        assert_eq!(suggestions, vec!["replica".to_string()]);
    }

    #[test]
    fn suggests_nothing_for_unrelated_names() {
        assert!(suggest_similar("xyz", ["replica", "cache"], 3).is_empty());
    }

    #[test]
    fn never_suggests_requested_name() {
        assert!(suggest_similar("one", ["one"], 3).is_empty());
    }
}
