//! Allow-list validation for caller-supplied identifiers and filters
//!
//! Everything that ends up in a storage query, a remote request body or a
//! generated command line is checked here first. Rejections surface as
//! [`Error::Validation`] before any I/O happens.

use crate::error::{Error, Result};
use crate::types::{ComponentQuery, JobFilters, JobKey, PagedJobQuery};
use regex::Regex;
use std::sync::LazyLock;

// Literal patterns; a compile failure is a programming error caught by the tests below
#[allow(clippy::expect_used)]
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z\-_]+$").expect("identifier pattern compiles"));

// Whitespace is the ASCII set only; `\s` would also admit Unicode spaces
#[allow(clippy::expect_used)]
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-zA-Z\-_\x{4e00}-\x{9fa5} \t\n\x0B\f\r]+$")
        .expect("description pattern compiles")
});

/// Validate a required identifier (job id, role, party id, component name)
pub fn identifier(field: &str, value: &str) -> Result<()> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(field, value))
    }
}

/// Validate every part of a job key
pub fn job_key(key: &JobKey) -> Result<()> {
    identifier("job_id", &key.job_id)?;
    identifier("role", &key.role)?;
    identifier("party_id", &key.party_id)
}

/// Validate every part of a component reference
pub fn component(query: &ComponentQuery) -> Result<()> {
    identifier("job_id", &query.job_id)?;
    identifier("role", &query.role)?;
    identifier("party_id", &query.party_id)?;
    identifier("component_name", &query.component_name)
}

/// Turn a listing request into validated filters
///
/// Blank filters are dropped. Any other value that fails its allow-list
/// rejects the whole request.
pub fn filters(query: &PagedJobQuery) -> Result<JobFilters> {
    Ok(JobFilters {
        job_id: optional("job_id", query.job_id.as_deref(), &IDENTIFIER)?,
        party_id: optional("party_id", query.party_id.as_deref(), &IDENTIFIER)?,
        partner: optional("partner", query.partner.as_deref(), &IDENTIFIER)?,
        description: optional("description", query.description.as_deref(), &DESCRIPTION)?,
    })
}

fn optional(field: &str, value: Option<&str>, pattern: &Regex) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) if pattern.is_match(v) => Ok(Some(v.to_string())),
        Some(v) => Err(Error::validation(field, v)),
    }
}
