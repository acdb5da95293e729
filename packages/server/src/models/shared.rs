use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Offset/limit paging shared by the plain list endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Number of records to skip. Default: 0.
    pub skip: Option<u64>,
    /// Maximum number of records to return (1-100). Default: 100.
    pub limit: Option<u64>,
}

pub const MAX_LIST_LIMIT: u64 = 100;

/// Resolve `skip`/`limit`, rejecting a limit outside 1..=`MAX_LIST_LIMIT`.
pub fn resolve_paging(skip: Option<u64>, limit: Option<u64>) -> Result<(u64, u64), AppError> {
    let limit = limit.unwrap_or(MAX_LIST_LIMIT);
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be 1-{MAX_LIST_LIMIT}"
        )));
    }
    Ok((skip.unwrap_or(0), limit))
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed name (1-256 Unicode characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation("Name must be 1-256 characters".into()));
    }
    Ok(())
}

/// Validate an optional free-text description (at most 10 000 characters).
pub fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    if let Some(desc) = description
        && desc.chars().count() > 10_000
    {
        return Err(AppError::Validation(
            "Description must be at most 10000 characters".into(),
        ));
    }
    Ok(())
}

/// Validate a tag list (max 50 tags, each 1-64 characters, no duplicates).
pub fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.len() > 50 {
        return Err(AppError::Validation("At most 50 tags are allowed".into()));
    }
    let mut seen = HashSet::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || tag.chars().count() > 64 {
            return Err(AppError::Validation("Tags must be 1-64 characters".into()));
        }
        if !seen.insert(tag.to_lowercase()) {
            return Err(AppError::Validation(format!("Duplicate tag: {tag}")));
        }
    }
    Ok(())
}

/// Trim every tag.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().map(|t| t.trim().to_string()).collect()
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
