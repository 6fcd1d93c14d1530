//! Route access policy
//!
//! Each route declares who may call it with an [`Access`] rule. Rules are
//! compiled into a [`RouteMatcher`] that supports exact paths, method
//! prefixes, `{id}` placeholders, `*`/`**` wildcards and automatic id
//! normalization. Routes without a rule require authentication.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::auth::{PolicyOverride, Principal};
use crate::domain::Role;
use crate::error::{Error, Result};

/// Regex for matching UUIDs in paths
static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("UUID regex is valid")
});

const METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Who may call a route
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Access {
    /// Anyone, with or without credentials
    Public,
    /// Any authenticated user
    Authenticated,
    /// Authenticated users holding this role
    Role(String),
}

/// Outcome of checking a caller against an [`Access`] rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No caller identity; answer 401
    Unauthenticated,
    /// Caller lacks the role; answer 403
    Forbidden,
}

impl Access {
    pub fn role(name: impl AsRef<str>) -> Self {
        Self::Role(Role::new(name).as_str().to_string())
    }

    pub fn decide(&self, principal: Option<&Principal>) -> Decision {
        match (self, principal) {
            (Self::Public, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Self::Authenticated, Some(_)) => Decision::Allow,
            (Self::Role(role), Some(principal)) if principal.has_role(role) => Decision::Allow,
            (Self::Role(_), Some(_)) => Decision::Forbidden,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Role(role) => f.write_str(role),
        }
    }
}

impl TryFrom<String> for Access {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err("access rule must not be empty".to_string());
        }
        if value.eq_ignore_ascii_case("public") {
            Ok(Self::Public)
        } else if value.eq_ignore_ascii_case("authenticated") {
            Ok(Self::Authenticated)
        } else {
            Ok(Self::role(value))
        }
    }
}

impl From<Access> for String {
    fn from(access: Access) -> Self {
        access.to_string()
    }
}

/// Compiled route patterns for efficient matching
///
/// Routes are matched in priority order:
/// 1. Method-prefixed exact matches (e.g., `POST /anime/batch`)
/// 2. Exact path matches (e.g., `/health`)
/// 3. Wildcard and placeholder patterns sorted by specificity (most specific first)
#[derive(Debug, Clone)]
pub struct RouteMatcher<T> {
    method_exact: HashMap<String, T>,
    exact: HashMap<String, T>,
    patterns: Vec<CompiledPattern<T>>,
}

#[derive(Debug, Clone)]
struct CompiledPattern<T> {
    method: Option<String>,
    path: String,
    regex: Regex,
    value: T,
    specificity: usize,
}

impl<T> RouteMatcher<T> {
    /// Compile `(pattern, value)` pairs; a later pair for the same pattern
    /// replaces an earlier one
    pub fn compile(routes: impl IntoIterator<Item = (String, T)>) -> Result<Self> {
        let mut method_exact = HashMap::new();
        let mut exact = HashMap::new();
        let mut patterns: Vec<CompiledPattern<T>> = Vec::new();

        for (pattern, value) in routes {
            let (method, path) = parse_method_prefix(&pattern);

            if path.contains('*') || path.contains('{') {
                if let Some(existing) = patterns
                    .iter_mut()
                    .find(|p| p.method == method && p.path == path)
                {
                    existing.value = value;
                    continue;
                }

                patterns.push(CompiledPattern {
                    regex: compile_pattern_to_regex(&path)?,
                    specificity: calculate_specificity(&path),
                    method,
                    path,
                    value,
                });
            } else if let Some(m) = method {
                method_exact.insert(format!("{} {}", m, path), value);
            } else {
                exact.insert(path, value);
            }
        }

        patterns.sort_by(|a, b| b.specificity.cmp(&a.specificity));

        Ok(Self {
            method_exact,
            exact,
            patterns,
        })
    }

    /// The value of the most specific pattern matching the request
    pub fn match_route(&self, method: &str, path: &str) -> Option<&T> {
        let normalized = normalize_path(path);

        if let Some(value) = self.method_exact.get(&format!("{} {}", method, normalized)) {
            return Some(value);
        }

        if let Some(value) = self.exact.get(&normalized) {
            return Some(value);
        }

        self.patterns
            .iter()
            .filter(|p| p.method.as_deref().map_or(true, |m| m == method))
            .find(|p| p.regex.is_match(&normalized))
            .map(|p| &p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.method_exact.is_empty() && self.exact.is_empty() && self.patterns.is_empty()
    }
}

/// Access rules for every route
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: RouteMatcher<Access>,
    fallback: Access,
}

impl AccessPolicy {
    /// Compile rules; unmatched routes require authentication
    pub fn new(rules: impl IntoIterator<Item = (String, Access)>) -> Result<Self> {
        Ok(Self {
            rules: RouteMatcher::compile(rules)?,
            fallback: Access::Authenticated,
        })
    }

    /// Compile route-table rules, then configuration overrides on top
    pub fn with_overrides(
        rules: impl IntoIterator<Item = (String, Access)>,
        overrides: &[PolicyOverride],
    ) -> Result<Self> {
        let overrides = overrides
            .iter()
            .map(|o| (o.route.clone(), o.access.clone()));
        Self::new(rules.into_iter().chain(overrides))
    }

    /// The rule that applies to a request
    pub fn required(&self, method: &str, path: &str) -> &Access {
        self.rules.match_route(method, path).unwrap_or(&self.fallback)
    }

    pub fn decide(&self, method: &str, path: &str, principal: Option<&Principal>) -> Decision {
        self.required(method, path).decide(principal)
    }
}

/// Split `"POST /anime"` into `(Some("POST"), "/anime")`
fn parse_method_prefix(pattern: &str) -> (Option<String>, String) {
    let trimmed = pattern.trim();

    for method in METHODS {
        if let Some(rest) = trimmed.strip_prefix(method) {
            let rest = rest.trim_start();
            if rest.starts_with('/') {
                return (Some(method.to_string()), rest.to_string());
            }
        }
    }

    (None, trimmed.to_string())
}

fn compile_pattern_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex_str = String::from("^");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    regex_str.push_str(".*");
                } else {
                    regex_str.push_str("[^/]+");
                }
            }
            '{' => {
                let catch_all = chars.peek() == Some(&'*');
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
                regex_str.push_str(if catch_all { ".+" } else { "[^/]+" });
            }
            '.' | '+' | '?' | '(' | ')' | '[' | ']' | '^' | '$' | '|' | '\\' => {
                regex_str.push('\\');
                regex_str.push(c);
            }
            _ => regex_str.push(c),
        }
    }

    regex_str.push('$');

    Regex::new(&regex_str)
        .map_err(|e| Error::Internal(format!("Invalid route pattern '{}': {}", pattern, e)))
}

/// Higher scores win: literal segments beat placeholders beat wildcards
fn calculate_specificity(pattern: &str) -> usize {
    let segments: usize = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "**" => 1,
            "*" => 5,
            s if s.contains('{') => 7,
            s if s.contains('*') => 3,
            _ => 10,
        })
        .sum();

    segments + pattern.len()
}

/// Replace numeric and UUID path segments with `{id}`
///
/// ```
/// use anime_service::middleware::normalize_path;
///
/// assert_eq!(normalize_path("/anime/42"), "/anime/{id}");
/// assert_eq!(normalize_path("/anime/batch"), "/anime/batch");
/// ```
pub fn normalize_path(path: &str) -> String {
    let normalized = UUID_REGEX.replace_all(path, "{id}");

    normalized
        .split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            username: "mehedi".to_string(),
            roles: roles.iter().map(Role::new).collect(),
        }
    }

    fn anime_policy() -> AccessPolicy {
        AccessPolicy::new([
            ("GET /anime".to_string(), Access::role("USER")),
            ("GET /anime/{id}".to_string(), Access::Authenticated),
            ("POST /anime".to_string(), Access::role("ADMIN")),
            ("POST /anime/batch".to_string(), Access::role("ADMIN")),
            ("PUT /anime".to_string(), Access::role("ADMIN")),
            ("DELETE /anime/{id}".to_string(), Access::role("ADMIN")),
            ("/health".to_string(), Access::Public),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/anime/123"), "/anime/{id}");
        assert_eq!(
            normalize_path("/anime/550e8400-e29b-41d4-a716-446655440000"),
            "/anime/{id}"
        );
        assert_eq!(normalize_path("/api/v1/anime"), "/api/v1/anime");
        assert_eq!(normalize_path("/anime/-1"), "/anime/-1");
    }

    #[test]
    fn test_parse_method_prefix() {
        assert_eq!(
            parse_method_prefix("POST  /anime/batch"),
            (Some("POST".to_string()), "/anime/batch".to_string())
        );
        assert_eq!(parse_method_prefix("/anime"), (None, "/anime".to_string()));
    }

    #[test]
    fn test_wildcards() {
        let regex = compile_pattern_to_regex("/anime/*").unwrap();
        assert!(regex.is_match("/anime/{id}"));
        assert!(!regex.is_match("/anime/1/episodes"));

        let regex = compile_pattern_to_regex("/anime/**").unwrap();
        assert!(regex.is_match("/anime/1/episodes"));

        let regex = compile_pattern_to_regex("/swagger-ui/{*file}").unwrap();
        assert!(regex.is_match("/swagger-ui/index.html"));
        assert!(regex.is_match("/swagger-ui/assets/swagger-ui.css"));
        assert!(!regex.is_match("/swagger-ui/"));
    }

    #[test]
    fn test_specificity_ordering() {
        let matcher = RouteMatcher::compile([
            ("/anime/**".to_string(), "any"),
            ("/anime/{id}".to_string(), "one"),
            ("/anime/*/episodes".to_string(), "episodes"),
        ])
        .unwrap();

        assert_eq!(matcher.match_route("GET", "/anime/1"), Some(&"one"));
        assert_eq!(matcher.match_route("GET", "/anime/1/episodes"), Some(&"episodes"));
        assert_eq!(matcher.match_route("GET", "/anime/1/cast/2"), Some(&"any"));
        assert_eq!(matcher.match_route("GET", "/manga/1"), None);
    }

    #[test]
    fn test_later_rule_replaces_earlier() {
        let matcher = RouteMatcher::compile([
            ("GET /anime/{id}".to_string(), 1),
            ("GET /anime/{id}".to_string(), 2),
            ("GET /anime".to_string(), 1),
            ("GET /anime".to_string(), 2),
        ])
        .unwrap();

        assert_eq!(matcher.match_route("GET", "/anime/5"), Some(&2));
        assert_eq!(matcher.match_route("GET", "/anime"), Some(&2));
    }

    #[test]
    fn test_anime_policy() {
        let policy = anime_policy();
        let user = principal(&["USER"]);
        let admin = principal(&["ADMIN", "USER"]);

        assert_eq!(policy.decide("GET", "/anime", None), Decision::Unauthenticated);
        assert_eq!(policy.decide("GET", "/anime", Some(&user)), Decision::Allow);
        assert_eq!(policy.decide("GET", "/anime/1", Some(&principal(&[]))), Decision::Allow);
        assert_eq!(policy.decide("DELETE", "/anime/1", Some(&user)), Decision::Forbidden);
        assert_eq!(policy.decide("DELETE", "/anime/1", Some(&admin)), Decision::Allow);
        assert_eq!(policy.decide("POST", "/anime/batch", Some(&user)), Decision::Forbidden);
        assert_eq!(policy.decide("GET", "/health", None), Decision::Allow);
    }

    #[test]
    fn test_unlisted_routes_require_authentication() {
        let policy = anime_policy();
        assert_eq!(policy.required("PATCH", "/anime/1"), &Access::Authenticated);
        assert_eq!(policy.decide("GET", "/unknown", None), Decision::Unauthenticated);
    }

    #[test]
    fn test_overrides_win() {
        let policy = AccessPolicy::with_overrides(
            [("GET /anime".to_string(), Access::role("USER"))],
            &[PolicyOverride {
                route: "GET /anime".to_string(),
                access: Access::role("ADMIN"),
            }],
        )
        .unwrap();

        assert_eq!(policy.required("GET", "/anime"), &Access::role("ADMIN"));
    }

    #[test]
    fn test_access_parsing() {
        assert_eq!(Access::try_from("Public".to_string()), Ok(Access::Public));
        assert_eq!(
            Access::try_from("authenticated".to_string()),
            Ok(Access::Authenticated)
        );
        assert_eq!(
            Access::try_from("ROLE_ADMIN".to_string()),
            Ok(Access::Role("ADMIN".to_string()))
        );
        assert!(Access::try_from("  ".to_string()).is_err());
    }
}
