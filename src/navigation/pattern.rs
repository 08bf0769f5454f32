//! Route patterns — `/`-separated literal segments and `:name` parameters.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern such as `/adoptions/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            match part.strip_prefix(':') {
                Some("") => return Err(invalid("parameter without a name")),
                Some(name) => {
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name))
                    {
                        return Err(invalid("repeated parameter name"));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern has no parameters.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Match already-split path segments, capturing parameters.
    pub fn matches(&self, path: &[&str]) -> Option<RouteParams> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = RouteParams::default();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) if lit == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.0.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }

    /// Canonical form used for duplicate detection (`/a/:x` == `/a/:y`).
    pub(crate) fn shape(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Param(_) => ":",
            })
            .collect();
        format!("/{}", parts.join("/"))
    }
}

/// Captured route parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split a URL path into segments.
///
/// Drops the query string and fragment, and collapses empty segments so
/// `/adoptions/`, `//adoptions` and `/adoptions?page=2` all match `/adoptions`.
pub fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// `split_path` rejoined, with a leading slash.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        let p = RoutePattern::parse("/help/ask").unwrap();
        assert!(p.is_literal());
        assert!(p.matches(&["help", "ask"]).unwrap().is_empty());
        assert!(p.matches(&["help"]).is_none());
        assert!(p.matches(&["help", "ask", "more"]).is_none());
    }

    #[test]
    fn param_capture() {
        let p = RoutePattern::parse("/adoptions/:id").unwrap();
        assert!(!p.is_literal());
        let params = p.matches(&["adoptions", "42"]).unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(p.matches(&["lost", "42"]).is_none());
    }

    #[test]
    fn root_pattern() {
        let p = RoutePattern::parse("/").unwrap();
        assert!(p.matches(&[]).is_some());
        assert!(p.matches(&["x"]).is_none());
    }

    #[test]
    fn invalid_patterns() {
        assert!(RoutePattern::parse("adoptions").is_err());
        assert!(RoutePattern::parse("/adoptions/:").is_err());
        assert!(RoutePattern::parse("/a/:id/b/:id").is_err());
    }

    #[test]
    fn shape_ignores_param_names() {
        let a = RoutePattern::parse("/lost/:id").unwrap();
        let b = RoutePattern::parse("/lost/:pet").unwrap();
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn split_path_normalizes() {
        assert_eq!(split_path("/adoptions/?page=2"), vec!["adoptions"]);
        assert_eq!(split_path("//lost//7#photo"), vec!["lost", "7"]);
        assert!(split_path("").is_empty());
        assert!(split_path("/").is_empty());
        assert_eq!(normalize_path("help//ask/"), "/help/ask");
        assert_eq!(normalize_path("?x=1"), "/");
    }
}
