//! Classification and validation endpoints
//!
//! Both are pure functions of the input string and never fail: an
//! unrecognized or malformed variant is reported in the body, not as an
//! HTTP error.

use axum::response::Json;

use crate::notation::{classify, validate_input, ValidationOutcome};
use crate::service::types::{ClassifyResponse, VariantRequest};

/// Detect the notation of a variant string
pub async fn classify_variant(Json(request): Json<VariantRequest>) -> Json<ClassifyResponse> {
    let format = classify(request.variant.trim());
    Json(ClassifyResponse {
        input: request.variant,
        format,
    })
}

/// Validate a variant string and suggest corrections
pub async fn validate_variant(Json(request): Json<VariantRequest>) -> Json<ValidationOutcome> {
    Json(validate_input(&request.variant))
}
