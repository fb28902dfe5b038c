//! Route matching logic.
//!
//! # Responsibilities
//! - Parse route path patterns (`/prefix/**`, `/**`, `/exact`)
//! - Match request paths on segment boundaries
//! - Expose the literal prefix used for longest-prefix ranking
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `**` is only allowed as the final segment
//! - No regex to guarantee O(n) matching

/// Error produced for an unsupported path pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} may only use '**' as its final segment")]
    UnsupportedWildcard(String),
}

/// A compiled route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// `/prefix/**`: the prefix itself and everything below it.
    /// Stored without the trailing `/**`; `/**` compiles to an empty prefix.
    Prefix(String),
    /// A path without wildcards matches only itself.
    Exact(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        match pattern.strip_suffix("/**") {
            Some(prefix) if !prefix.contains('*') => {
                Ok(PathPattern::Prefix(prefix.trim_end_matches('/').to_string()))
            }
            Some(_) => Err(PatternError::UnsupportedWildcard(pattern.to_string())),
            None if pattern.contains('*') => {
                Err(PatternError::UnsupportedWildcard(pattern.to_string()))
            }
            None => Ok(PathPattern::Exact(pattern.to_string())),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
            PathPattern::Exact(exact) => path == exact,
        }
    }

    /// The literal part of the pattern that a matching path starts with.
    pub fn literal(&self) -> &str {
        match self {
            PathPattern::Prefix(prefix) => prefix,
            PathPattern::Exact(exact) => exact,
        }
    }

    /// Ranking key: longer literals win, and an exact pattern beats a
    /// wildcard with the same literal.
    pub fn specificity(&self) -> (usize, bool) {
        (self.literal().len(), matches!(self, PathPattern::Exact(_)))
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Prefix(prefix) => write!(f, "{}/**", prefix),
            PathPattern::Exact(exact) => f.write_str(exact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern() {
        let pattern = PathPattern::parse("/api/auth/**").unwrap();
        assert_eq!(pattern, PathPattern::Prefix("/api/auth".into()));

        assert!(pattern.matches("/api/auth"));
        assert!(pattern.matches("/api/auth/"));
        assert!(pattern.matches("/api/auth/login"));
        assert!(!pattern.matches("/api/authz"));
        assert!(!pattern.matches("/api"));
        assert!(!pattern.matches("/API/auth/login")); // Case sensitive
    }

    #[test]
    fn test_catch_all() {
        let pattern = PathPattern::parse("/**").unwrap();
        assert_eq!(pattern.literal(), "");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::parse("/hello").unwrap();
        assert!(pattern.matches("/hello"));
        assert!(!pattern.matches("/hello/personal"));
        assert!(pattern.specificity() > PathPattern::parse("/hello/**").unwrap().specificity());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("api/**"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/**/b"),
            Err(PatternError::UnsupportedWildcard(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/*"),
            Err(PatternError::UnsupportedWildcard(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for raw in ["/api/auth/**", "/hello", "/**"] {
            assert_eq!(PathPattern::parse(raw).unwrap().to_string(), raw);
        }
    }
}
