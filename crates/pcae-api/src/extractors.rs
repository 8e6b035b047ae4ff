//! # Request Body Extraction
//!
//! JSON body helpers mapping deserialization failures to
//! [`AppError::BadRequest`] and business-rule failures to
//! [`AppError::Validation`].

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business rules a request DTO must satisfy beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Shared check for the tenant pair carried by several request bodies.
pub(crate) fn require_tenant(country: &str, industry: &str) -> Result<(), String> {
    if country.trim().is_empty() {
        return Err("country_code must not be empty".to_string());
    }
    if industry.trim().is_empty() {
        return Err("industry_code must not be empty".to_string());
    }
    Ok(())
}
