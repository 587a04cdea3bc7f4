//! Tenant identity
//!
//! A tenant is one JupyterHub user. Its name becomes a Postgres schema and an
//! object-key segment, so it is checked against an allow-list up front.

use std::fmt;

use crate::error::AppError;

/// Postgres truncates identifiers beyond NAMEDATALEN - 1 bytes
const MAX_TENANT_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TenantId(String);

impl TenantId {
    pub(crate) fn parse(raw: &str) -> Result<Self, AppError> {
        let name = raw.trim();
        let reject = |reason: &'static str| AppError::InvalidTenant {
            input: raw.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(reject("name is empty"));
        }
        if name.len() > MAX_TENANT_LEN {
            return Err(reject("name is longer than 63 bytes"));
        }
        if name.starts_with("pg_") {
            return Err(reject("the pg_ prefix is reserved by Postgres"));
        }
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(reject("uppercase letters are not allowed"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        {
            return Err(reject("only a-z, 0-9, '.', '_' and '-' are allowed"));
        }
        if !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(reject("must start with a letter or digit"));
        }

        Ok(TenantId(name.to_string()))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted SQL identifier. Allow-listed names never contain quotes,
    /// but escaping keeps the statement well-formed regardless.
    pub(crate) fn quoted_identifier(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
