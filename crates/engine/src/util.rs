//! Internal helpers for input validation and normalisation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim + NFKC a mandatory display string, rejecting empty values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfkc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidRequest(format!(
            "{label} must not be empty"
        )));
    }
    Ok(normalized)
}

/// Same as [`normalize_required`] but maps blank values to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().nfkc().collect::<String>())
        .filter(|s| !s.is_empty())
}

/// Canonical SKU: normalised, upper-case, inner whitespace removed.
pub(crate) fn normalize_sku(value: &str) -> ResultEngine<String> {
    let sku = normalize_required(value, "sku")?;
    Ok(sku
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect())
}

/// Case-insensitive key used for uniqueness checks on names.
pub(crate) fn name_key(value: &str) -> String {
    value.to_lowercase()
}
