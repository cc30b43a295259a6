//! Static path → required role table.
//!
//! Loaded once from config at startup and only read afterwards. Changing the
//! mapping means redeploying.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScopeError(pub String);

impl fmt::Display for PathScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path scope entry: {}", self.0)
    }
}

impl std::error::Error for PathScopeError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathScopeTable {
    scopes: HashMap<String, String>,
}

impl PathScopeTable {
    pub fn new<P, R>(entries: impl IntoIterator<Item = (P, R)>) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        Self {
            scopes: entries
                .into_iter()
                .map(|(p, r)| (p.into(), r.into()))
                .collect(),
        }
    }

    /// Parse `"/vault=GetSecret,/other=Role"`.
    pub fn parse(raw: &str) -> Result<Self, PathScopeError> {
        let mut entries = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (path, role) = entry
                .split_once('=')
                .ok_or_else(|| PathScopeError(entry.to_string()))?;
            let (path, role) = (path.trim(), role.trim());
            if !path.starts_with('/') || role.is_empty() {
                return Err(PathScopeError(entry.to_string()));
            }
            entries.push((path, role));
        }
        Ok(Self::new(entries))
    }

    pub fn required_role(&self, path: &str) -> Option<&str> {
        self.scopes.get(path).map(String::as_str)
    }

    /// Protected paths that have no entry. Non-empty means the deployment is misconfigured.
    pub fn unmapped<'a>(&self, protected: &[&'a str]) -> Vec<&'a str> {
        protected
            .iter()
            .copied()
            .filter(|p| !self.scopes.contains_key(*p))
            .collect()
    }

    /// `Some(true)` iff the role required for `path` is among `roles`.
    /// `None` when the path has no entry at all.
    pub fn check(&self, roles: &[String], path: &str) -> Option<bool> {
        let required = self.required_role(path)?;
        Some(roles.iter().any(|r| r == required))
    }
}
