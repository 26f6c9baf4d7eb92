//! Canonical request paths.
//!
//! The upstream URL is built with [`Url`], which resolves `.` and `..`
//! segments (including `%2e` spellings) and treats `\` as a separator. Routing
//! has to see the same path the upstream will, so dispatch canonicalises the
//! inbound path once with the same parser and uses the result for both route
//! matching and forwarding.

use reqwest::Url;

const BASE: &str = "http://gateway.invalid";

/// Resolve dot segments and separators in an origin-form `path`.
///
/// Returns `None` when the path cannot be parsed as a URL path. Query and
/// fragment are never part of the input.
pub fn canonical_path(path: &str) -> Option<String> {
    if !path.starts_with('/') {
        return None;
    }
    let url = Url::parse(&format!("{BASE}{path}")).ok()?;
    if url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    Some(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(canonical_path("/products/42").as_deref(), Some("/products/42"));
        assert_eq!(canonical_path("/").as_deref(), Some("/"));
        assert_eq!(canonical_path("/products/").as_deref(), Some("/products/"));
    }

    #[test]
    fn dot_segments_are_resolved() {
        assert_eq!(canonical_path("/products/./42").as_deref(), Some("/products/42"));
        assert_eq!(canonical_path("/products/%2e/42").as_deref(), Some("/products/42"));
        assert_eq!(canonical_path("/products/%2E/42").as_deref(), Some("/products/42"));
        assert_eq!(canonical_path("/products/42/x/..").as_deref(), Some("/products/42/"));
        assert_eq!(canonical_path("/auth/%2e%2e/products/42").as_deref(), Some("/products/42"));
    }

    #[test]
    fn parent_segments_stop_at_root() {
        assert_eq!(canonical_path("/../../products/42").as_deref(), Some("/products/42"));
    }

    #[test]
    fn backslash_is_a_separator() {
        assert_eq!(canonical_path("/products\\42").as_deref(), Some("/products/42"));
    }

    #[test]
    fn canonical_form_is_stable() {
        let once = canonical_path("/products/%2e/./42/x/..").unwrap();
        assert_eq!(canonical_path(&once).as_deref(), Some(once.as_str()));
    }

    #[test]
    fn non_origin_form_is_refused() {
        assert_eq!(canonical_path("*"), None);
        assert_eq!(canonical_path("products"), None);
        assert_eq!(canonical_path("/a?b"), None);
    }
}
