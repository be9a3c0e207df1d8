//! Path templating and resource-key derivation.
//!
//! Route paths arrive in the host framework's notation: `:name` placeholders,
//! an optional `(.:format)` suffix and an optional leading `:version` segment.
//! Swagger 1.2 wants `{name}` placeholders and a `.{format}` suffix.

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([a-zA-Z_]\w*)").expect("valid placeholder regex"));

/// First segment terminated by `.`, `/` or `(`
static SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([\w|-]*?)[./(]").expect("valid segment regex"));

/// A trailing segment
static TRAILING_SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([\w|-]*)$").expect("valid trailing segment regex"));

const FORMAT_SUFFIX: &str = "(.:format)";

/// Renders a route path in Swagger notation.
///
/// `(.:format)` becomes `.{format}` (or disappears when `hide_format` is set),
/// every `:token` becomes `{token}`, and `{version}` is replaced with the API
/// version when one is given.
pub fn parse_path(path: &str, version: Option<&str>, hide_format: bool) -> String {
    let with_format = path.replace(FORMAT_SUFFIX, if hide_format { "" } else { ".{format}" });
    let templated = PLACEHOLDER_REGEX.replace_all(&with_format, "{$1}").into_owned();

    match version {
        Some(version) => templated.replace("{version}", version),
        None => templated,
    }
}

/// Derives the resource key of a route: its first plain path segment after the
/// route prefix, lower-cased.
///
/// Segments that are placeholders (such as `:version`) never match, so the key
/// of `/:version/widgets(.:format)` is `widgets`. Returns `None` when no
/// non-empty segment can be found.
pub fn resource_key(path: &str, prefix: Option<&str>) -> Option<String> {
    let relevant = strip_route_prefix(path, prefix);

    let captured = SEGMENT_REGEX
        .captures(relevant)
        .or_else(|| TRAILING_SEGMENT_REGEX.captures(relevant))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())?;

    if captured.is_empty() {
        None
    } else {
        Some(captured)
    }
}

/// Everything after the first occurrence of the route prefix
fn strip_route_prefix<'a>(path: &'a str, prefix: Option<&str>) -> &'a str {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => match path.find(prefix) {
            Some(pos) => &path[pos + prefix.len()..],
            None => path,
        },
        None => path,
    }
}

/// Normalizes a namespace path to its key form: no leading slash.
pub fn namespace_name(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}

/// Resource key of a namespace: the first segment of its name, lower-cased.
pub fn namespace_key(name: &str) -> String {
    let trimmed = name.strip_prefix('/').unwrap_or(name);
    trimmed
        .split('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Whether namespace `child` is nested below namespace `parent` (segment-wise).
pub fn is_nested_namespace(child: &str, parent: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'/'
}

/// Whether a route's owning namespace is the namespace `name`, with or
/// without a leading `:version` segment.
pub fn route_in_namespace(route_namespace: Option<&str>, name: &str) -> bool {
    match route_namespace {
        Some(ns) => {
            let plain = format!("/{}", name);
            let versioned = format!("/:version/{}", name);
            ns == plain || ns == versioned
        }
        None => false,
    }
}

/// Placeholder names declared in a route path (`/widgets/:id` yields `id`)
pub fn placeholders(path: &str) -> Vec<&str> {
    PLACEHOLDER_REGEX
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
