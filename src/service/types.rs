//! Request and response types for the variant web service

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotate::{
    AnnotationLookup, ColocatedVariant, Impact, Provenance, TranscriptConsequence,
};
use crate::error::VariantError;
use crate::notation::NotationKind;
use crate::recode::Recoding;
use crate::reference::GenomeBuild;
use crate::variant::CanonicalKey;

/// Body shared by all variant endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VariantRequest {
    /// Variant in any supported notation
    pub variant: String,
    /// "GRCh37" or "GRCh38" (aliases hg19/hg38); defaults to the configured assembly
    #[serde(default)]
    pub assembly: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub input: String,
    pub format: NotationKind,
}

/// Derived notations, without the echo of the input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecodingBody {
    pub id: Vec<String>,
    pub hgvsg: Vec<String>,
    pub hgvsc: Vec<String>,
    pub hgvsp: Vec<String>,
    pub vcf_string: Vec<String>,
    pub spdi: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecodeResponse {
    pub input: String,
    pub assembly: GenomeBuild,
    pub recoding: RecodingBody,
}

impl From<Recoding> for RecodeResponse {
    fn from(recoding: Recoding) -> Self {
        Self {
            input: recoding.input,
            assembly: recoding.assembly,
            recoding: RecodingBody {
                id: recoding.id,
                hgvsg: recoding.hgvsg,
                hgvsc: recoding.hgvsc,
                hgvsp: recoding.hgvsp,
                vcf_string: recoding.vcf_string,
                spdi: recoding.spdi,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationBody {
    pub most_severe_consequence: String,
    pub impact: Option<Impact>,
    pub cadd_phred: Option<f64>,
    pub gnomad_af: Option<f64>,
    pub transcript_consequences: Vec<TranscriptConsequence>,
    pub colocated_variants: Vec<ColocatedVariant>,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateResponse {
    pub input: String,
    pub key: CanonicalKey,
    /// Whether the annotation came from the cache
    pub cached: bool,
    pub annotation: AnnotationBody,
}

impl AnnotateResponse {
    pub fn new(input: impl Into<String>, lookup: AnnotationLookup) -> Self {
        let record = lookup.record;
        Self {
            input: input.into(),
            key: record.key,
            cached: lookup.served_from_cache,
            annotation: AnnotationBody {
                most_severe_consequence: record.most_severe_consequence,
                impact: record.impact,
                cadd_phred: record.cadd_phred,
                gnomad_af: record.gnomad_af,
                transcript_consequences: record.transcript_consequences,
                colocated_variants: record.colocated_variants,
                provenance: record.provenance,
                fetched_at: record.fetched_at,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearedResponse {
    pub cleared: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded" (upstream unreachable)
    pub status: String,
    pub version: String,
    pub predictor: String,
    pub upstream_version: Option<String>,
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Service error types
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Variant(#[from] VariantError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Variant(e) => e.status_code(),
            ServiceError::BadRequest(_) => 400,
            ServiceError::InternalError(_) => 500,
        }
    }

    /// Convert to error response
    pub fn to_response(&self) -> ErrorResponse {
        let (error, suggestions) = match self {
            ServiceError::Variant(e) => (e.kind().to_string(), e.suggestions().to_vec()),
            ServiceError::BadRequest(_) => ("bad_request".to_string(), Vec::new()),
            ServiceError::InternalError(_) => ("internal_error".to_string(), Vec::new()),
        };
        ErrorResponse {
            error,
            message: self.to_string(),
            suggestions,
        }
    }

    /// Seconds to send in `Retry-After`
    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ServiceError::Variant(VariantError::RateLimited { retry_after }) => {
                Some(retry_after.map_or(1, |d| d.as_secs_f64().ceil().max(1.0) as u64))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        let retry_after = self.retry_after_secs();
        let mut response = (status, Json(self.to_response())).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
