//! Recoding endpoint

use axum::{extract::State, response::Json};

use crate::notation::parse_variant;
use crate::service::{
    server::AppState,
    types::{RecodeResponse, ServiceError, VariantRequest},
};
use crate::variant::AssembledVariant;

/// Translate a variant into every notation it can be written in
pub async fn recode_variant(
    State(state): State<AppState>,
    Json(request): Json<VariantRequest>,
) -> Result<Json<RecodeResponse>, ServiceError> {
    let assembly = state.assembly(request.assembly.as_deref())?;
    let id = parse_variant(&request.variant)?;
    let recoding = state
        .annotator
        .recoder()
        .recode(&AssembledVariant::new(id, assembly))?;

    let mut response = RecodeResponse::from(recoding);
    response.input = request.variant;
    Ok(Json(response))
}
