//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies in handlers. Shared field checks for pack size
//! lists live here so the calculation and configuration routes agree.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Longest accepted configuration name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// A rule violation tied to one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Trait for request types that validate business rules beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Validate business rules, naming the first field that fails.
    fn validate(&self) -> Result<(), FieldError>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(|err| {
        tracing::warn!(field = err.field, reason = %err, "request validation failed");
        AppError::from(err)
    })?;
    Ok(value)
}

/// A caller-supplied pack size list must be non-empty with every size `>= 1`.
pub fn validate_pack_sizes(field: &'static str, sizes: &[i64]) -> Result<(), FieldError> {
    if sizes.is_empty() {
        return Err(FieldError::new(
            field,
            format!("{field} must contain at least one pack size"),
        ));
    }
    if let Some(bad) = sizes.iter().find(|&&s| s < 1) {
        return Err(FieldError::new(
            field,
            format!("{field} must contain only positive sizes, got {bad}"),
        ));
    }
    Ok(())
}

/// Configuration names must be non-blank and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::new("name", "name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new(
            "name",
            format!("name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_sizes_must_be_non_empty() {
        let err = validate_pack_sizes("pack_sizes", &[]).unwrap_err();
        assert_eq!(err.field, "pack_sizes");
        assert!(err.message.contains("at least one"));
    }

    #[test]
    fn pack_sizes_must_be_positive() {
        let err = validate_pack_sizes("pack_sizes", &[250, 0]).unwrap_err();
        assert!(err.message.contains("got 0"));
        assert!(validate_pack_sizes("pack_sizes", &[250, 500]).is_ok());
    }

    #[test]
    fn name_rules() {
        assert_eq!(validate_name("  ").unwrap_err().field, "name");
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name("Standard").is_ok());
    }

    struct AlwaysInvalid;

    impl Validate for AlwaysInvalid {
        fn validate(&self) -> Result<(), FieldError> {
            Err(FieldError::new("items", "nope"))
        }
    }

    #[test]
    fn validated_extraction_maps_to_validation_error() {
        let result = extract_validated_json(Ok(Json(AlwaysInvalid)));
        assert!(matches!(
            result,
            Err(AppError::Validation { field: "items", message }) if message == "nope"
        ));
    }
}
