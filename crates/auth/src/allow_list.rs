//! Public endpoint allow-list.
//!
//! Entries have the form `[METHOD ]<pattern>`:
//! - `/health` matches exactly `/health`
//! - `/public/**` matches `/public` and anything below it
//! - `POST /auth/login` matches only POST requests to `/auth/login`
//!
//! A request that matches skips authentication entirely.

use core::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllowListError {
    #[error("empty allow-list entry")]
    Empty,

    #[error("allow-list path must start with '/': {0}")]
    RelativePath(String),

    #[error("invalid allow-list entry: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    /// Segment-boundary prefix (stored without the trailing `/**`).
    Prefix(String),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Prefix(p) if p.is_empty() => true,
            PathPattern::Prefix(p) => match path.strip_prefix(p.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// One allow-listed path, optionally restricted to a single method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowRule {
    method: Option<String>,
    pattern: PathPattern,
}

impl AllowRule {
    /// A `GET` rule also covers `HEAD`, which the router answers from the same handler.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        let method_ok = self.method.as_deref().is_none_or(|m| {
            m.eq_ignore_ascii_case(method)
                || (m.eq_ignore_ascii_case("GET") && method.eq_ignore_ascii_case("HEAD"))
        });
        method_ok && self.pattern.matches(path)
    }
}

impl FromStr for AllowRule {
    type Err = AllowListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AllowListError::Empty);
        }

        let mut parts = s.split_whitespace();
        let (method, path) = match (parts.next(), parts.next(), parts.next()) {
            (Some(path), None, None) => (None, path),
            (Some(method), Some(path), None) => (Some(method.to_ascii_uppercase()), path),
            _ => return Err(AllowListError::Invalid(s.to_string())),
        };

        if !path.starts_with('/') {
            return Err(AllowListError::RelativePath(path.to_string()));
        }

        let pattern = match path.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None if path.contains('*') => return Err(AllowListError::Invalid(s.to_string())),
            None => PathPattern::Exact(path.to_string()),
        };

        Ok(Self { method, pattern })
    }
}

/// Configured set of public endpoints.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    rules: Vec<AllowRule>,
    permit_preflight: bool,
}

impl AllowList {
    pub fn new(rules: Vec<AllowRule>) -> Self {
        Self {
            rules,
            permit_preflight: false,
        }
    }

    /// Parse a list of `[METHOD ]<pattern>` entries.
    pub fn parse<I, S>(entries: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<AllowRule>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Also let every `OPTIONS` request through (CORS preflight).
    pub fn with_preflight(mut self, permit: bool) -> Self {
        self.permit_preflight = permit;
        self
    }

    pub fn is_allowed(&self, method: &str, path: &str) -> bool {
        if self.permit_preflight && method.eq_ignore_ascii_case("OPTIONS") {
            return true;
        }
        self.rules.iter().any(|r| r.matches(method, path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
