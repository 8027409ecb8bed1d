use crate::error::{AppError, Res};

/// Returns the value unchanged, or a `BadRequest` naming the field when it
/// is missing or empty. Whitespace counts as a value.
pub fn require<'a>(value: Option<&'a str>, field: &str) -> Res<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("Missing {}", field))),
    }
}

/// Checks several required fields at once and names every missing one,
/// e.g. `Missing required fields: planId, subscriberEmail`. On success the
/// values come back unchanged, in order.
pub fn require_all<'a, const N: usize>(fields: [(&str, Option<&'a str>); N]) -> Res<[&'a str; N]> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(str::is_empty))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(fields.map(|(_, value)| value.unwrap_or_default()))
}
