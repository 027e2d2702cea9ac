//! Path normalization.
//!
//! # Responsibilities
//! - Strip one leading and one trailing separator
//! - Split a path into ordered segments
//! - Build route keys and the probe sequence for a path
//!
//! # Design Decisions
//! - Repeated internal separators are kept (empty segments are valid)
//! - Query strings and fragments are not stripped
//! - No error conditions: every input string is accepted

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// The route key that matches every page.
pub const GLOBAL_KEY: &str = "";

/// Strip exactly one leading and one trailing separator, if present.
pub fn trim_separators(raw: &str) -> &str {
    let trimmed = raw.strip_prefix(SEPARATOR).unwrap_or(raw);
    trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed)
}

/// Split a raw path into ordered segments.
///
/// An empty path yields a single empty segment.
pub fn normalize(raw: &str) -> Vec<&str> {
    trim_separators(raw).split(SEPARATOR).collect()
}

/// The route key a registration route is stored under.
pub fn route_key(raw: &str) -> String {
    trim_separators(raw).to_string()
}

/// The first segment of a path, used to key persistent view data.
pub fn top_segment(raw: &str) -> &str {
    normalize(raw).first().copied().unwrap_or(GLOBAL_KEY)
}

/// Route keys to check for a path, global key first, then each cumulative
/// prefix from shortest to longest.
///
/// The global key appears exactly once.
pub fn probe_sequence(raw: &str) -> Vec<String> {
    let segments = normalize(raw);
    let mut probes = Vec::with_capacity(segments.len() + 1);
    probes.push(GLOBAL_KEY.to_string());

    let mut prefix = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            prefix.push(SEPARATOR);
        }
        prefix.push_str(segment);
        if !prefix.is_empty() {
            probes.push(prefix.clone());
        }
    }

    probes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_outer_separators() {
        assert_eq!(normalize("/a/b/"), vec!["a", "b"]);
        assert_eq!(normalize("a/b"), vec!["a", "b"]);
        assert_eq!(normalize("/a/b/"), normalize("a/b"));
    }

    #[test]
    fn test_normalize_empty_path() {
        assert_eq!(normalize(""), vec![""]);
        assert_eq!(normalize("/"), vec![""]);
    }

    #[test]
    fn test_normalize_keeps_internal_empty_segments() {
        assert_eq!(normalize("/a//b/"), vec!["a", "", "b"]);
        // Only one separator is stripped on each side
        assert_eq!(normalize("//a//"), vec!["", "a", ""]);
    }

    #[test]
    fn test_route_key() {
        assert_eq!(route_key(""), "");
        assert_eq!(route_key("/"), "");
        assert_eq!(route_key("/blog/"), "blog");
        assert_eq!(route_key("blog/23"), "blog/23");
    }

    #[test]
    fn test_probe_sequence_order() {
        assert_eq!(
            probe_sequence("blog/23/edit"),
            vec!["", "blog", "blog/23", "blog/23/edit"]
        );
        assert_eq!(probe_sequence("/shop/"), vec!["", "shop"]);
    }

    #[test]
    fn test_probe_sequence_global_once() {
        assert_eq!(probe_sequence(""), vec![""]);
        assert_eq!(probe_sequence("/"), vec![""]);
        assert_eq!(probe_sequence("//a"), vec!["", "/a"]);
    }

    #[test]
    fn test_query_string_is_part_of_last_segment() {
        assert_eq!(normalize("/blog/5?tab=2#top"), vec!["blog", "5?tab=2#top"]);
        assert_eq!(probe_sequence("/blog?x=1"), vec!["", "blog?x=1"]);
    }

    #[test]
    fn test_top_segment() {
        assert_eq!(top_segment("/shop/42"), "shop");
        assert_eq!(top_segment(""), "");
    }
}
