//! Route pattern parsing and request matching.
//!
//! Matches intercepted requests against registered route patterns.

use std::collections::HashMap;

/// Errors from parsing a route pattern string.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern is not of the form `"METHOD /path"`.
    #[error("route pattern '{0}' must be of the form \"METHOD /path[?query]\"")]
    Malformed(String),

    /// Path does not start with `/`.
    #[error("route pattern '{0}' has a path that does not start with '/'")]
    RelativePath(String),
}

/// A parsed route pattern: method, exact path, and required query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    /// HTTP method, uppercase
    pub method: String,
    /// Exact path to match
    pub path: String,
    /// Query parameters that must be present with these exact values
    pub required_query: HashMap<String, String>,
}

impl RoutePattern {
    /// Parse a pattern of the form `"METHOD /path[?query]"`.
    ///
    /// A query string, if present, lists literal parameters the request must
    /// carry; extra parameters on the request are ignored during matching.
    pub fn parse(spec: &str) -> Result<Self, PatternError> {
        let (method, target) = spec
            .trim()
            .split_once(' ')
            .ok_or_else(|| PatternError::Malformed(spec.to_string()))?;
        let target = target.trim();
        if method.is_empty() || target.is_empty() {
            return Err(PatternError::Malformed(spec.to_string()));
        }

        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        if !path.starts_with('/') {
            return Err(PatternError::RelativePath(spec.to_string()));
        }

        Ok(Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            required_query: query.map(parse_query_string).unwrap_or_default(),
        })
    }

    /// Test this pattern against a request line.
    ///
    /// Method comparison is case-insensitive, the path must be equal, and
    /// every required query parameter must be present with an equal value.
    pub fn matches(&self, method: &str, path: &str, query_string: Option<&str>) -> bool {
        if !self.method.eq_ignore_ascii_case(method) {
            return false;
        }
        if self.path != path {
            return false;
        }
        if self.required_query.is_empty() {
            return true;
        }

        let query_params = parse_query_string(query_string.unwrap_or(""));
        self.required_query
            .iter()
            .all(|(name, value)| query_params.get(name) == Some(value))
    }
}

/// Parse a query string into key-value pairs.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for part in query.split('&') {
        if part.is_empty() {
            continue;
        }
        if let Some((key, value)) = part.split_once('=') {
            params.insert(percent_decode(key), percent_decode(value));
        } else {
            params.insert(percent_decode(part), String::new());
        }
    }

    params
}

/// Simple URL decoding.
fn percent_decode(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2 {
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    result.push(byte as char);
                    continue;
                }
            }
            result.push('%');
            result.push_str(&hex);
        } else if ch == '+' {
            result.push(' ');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_and_path() {
        let pattern = RoutePattern::parse("GET /api/users").unwrap();
        assert_eq!(pattern.method, "GET");
        assert_eq!(pattern.path, "/api/users");
        assert!(pattern.required_query.is_empty());
    }

    #[test]
    fn test_parse_lowercase_method_uppercased() {
        let pattern = RoutePattern::parse("delete /sessions/current").unwrap();
        assert_eq!(pattern.method, "DELETE");
    }

    #[test]
    fn test_parse_with_query() {
        let pattern = RoutePattern::parse("GET /search?q=rust&page=2").unwrap();
        assert_eq!(pattern.required_query.get("q"), Some(&"rust".to_string()));
        assert_eq!(pattern.required_query.get("page"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            RoutePattern::parse("GET"),
            Err(PatternError::Malformed(_))
        ));
        assert!(matches!(
            RoutePattern::parse("GET   "),
            Err(PatternError::Malformed(_))
        ));
        assert!(matches!(
            RoutePattern::parse("GET users"),
            Err(PatternError::RelativePath(_))
        ));
    }

    #[test]
    fn test_exact_path_matching() {
        let pattern = RoutePattern::parse("GET /api/users").unwrap();
        assert!(pattern.matches("GET", "/api/users", None));
        assert!(!pattern.matches("GET", "/api/posts", None));
        assert!(!pattern.matches("GET", "/api/users/1", None));
    }

    #[test]
    fn test_method_matching_case_insensitive() {
        let pattern = RoutePattern::parse("GET /api/users").unwrap();
        assert!(pattern.matches("get", "/api/users", None));
        assert!(!pattern.matches("POST", "/api/users", None));
    }

    #[test]
    fn test_query_matching_requires_all_params() {
        let pattern = RoutePattern::parse("GET /api/users?page=1&size=10").unwrap();
        assert!(pattern.matches("GET", "/api/users", Some("page=1&size=10")));
        assert!(!pattern.matches("GET", "/api/users", Some("page=1")));
        assert!(!pattern.matches("GET", "/api/users", Some("page=2&size=10")));
        assert!(!pattern.matches("GET", "/api/users", None));
    }

    #[test]
    fn test_query_matching_ignores_extra_params() {
        let pattern = RoutePattern::parse("GET /api/users?page=1").unwrap();
        assert!(pattern.matches("GET", "/api/users", Some("page=1&debug=true")));
    }

    #[test]
    fn test_no_required_query_ignores_request_query() {
        let pattern = RoutePattern::parse("GET /api/users").unwrap();
        assert!(pattern.matches("GET", "/api/users", Some("anything=goes")));
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("foo=bar&baz=qux");
        assert_eq!(params.get("foo"), Some(&"bar".to_string()));
        assert_eq!(params.get("baz"), Some(&"qux".to_string()));

        let params = parse_query_string("name=John%20Doe");
        assert_eq!(params.get("name"), Some(&"John Doe".to_string()));

        let params = parse_query_string("flag");
        assert_eq!(params.get("flag"), Some(&String::new()));
    }
}
