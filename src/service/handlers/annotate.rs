//! Annotation endpoint

use axum::{extract::State, response::Json};

use crate::error::VariantError;
use crate::notation::parse_variant;
use crate::service::{
    server::{request_timeout, AppState},
    types::{AnnotateResponse, ServiceError, VariantRequest},
};
use crate::variant::AssembledVariant;

/// Annotate a variant, serving from the cache when possible
pub async fn annotate_variant(
    State(state): State<AppState>,
    Json(request): Json<VariantRequest>,
) -> Result<Json<AnnotateResponse>, ServiceError> {
    let assembly = state.assembly(request.assembly.as_deref())?;
    let variant = AssembledVariant::new(parse_variant(&request.variant)?, assembly);

    let timeout = request_timeout(&state);
    let lookup = tokio::time::timeout(timeout, state.annotator.annotate(&variant))
        .await
        .map_err(|_| {
            VariantError::upstream(format!(
                "annotation did not finish within {}s",
                timeout.as_secs()
            ))
        })??;

    Ok(Json(AnnotateResponse::new(request.variant, lookup)))
}
