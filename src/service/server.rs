//! Web server setup using Axum framework

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};

use crate::annotate::{Annotator, ConsequencePredictor, MockPredictor, VepClient};
use crate::cache::{AnnotationCache, TtlCache};
use crate::config::{PredictorKind, ServiceConfig};
use crate::error::VariantError;
use crate::recode::Recoder;
use crate::reference::{GenomeBuild, ReferenceProvider, ReferenceStore};
use crate::rsid::{InMemoryRsIdLookup, RsIdLookup};
use crate::service::{
    handlers,
    types::{ErrorResponse, ServiceError},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub annotator: Arc<Annotator>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig, annotator: Annotator) -> Self {
        Self {
            annotator: Arc::new(annotator),
            config: Arc::new(config),
        }
    }

    /// Build providers, predictor and cache from configuration
    pub fn from_config(config: ServiceConfig) -> Result<Self, VariantError> {
        let reference: Arc<dyn ReferenceProvider> = match &config.reference.data_path {
            Some(path) => {
                let store = ReferenceStore::from_json(path)?;
                tracing::info!(
                    "Loaded {} transcripts from {}",
                    store.transcript_count(),
                    path.display()
                );
                Arc::new(store)
            }
            None => {
                tracing::warn!("No reference data configured; using built-in demo transcripts");
                Arc::new(ReferenceStore::with_test_data())
            }
        };
        let rsids: Arc<dyn RsIdLookup> = match &config.reference.rsid_path {
            Some(path) => {
                let lookup = InMemoryRsIdLookup::from_json(path)?;
                tracing::info!("Loaded {} dbSNP records from {}", lookup.len(), path.display());
                Arc::new(lookup)
            }
            None => {
                tracing::warn!("No dbSNP data configured; using built-in demo records");
                Arc::new(InMemoryRsIdLookup::with_test_data())
            }
        };
        let predictor: Arc<dyn ConsequencePredictor> = match config.upstream.predictor {
            PredictorKind::Vep => Arc::new(VepClient::new(&config.upstream)?),
            PredictorKind::Mock => {
                tracing::warn!("Using the mock consequence predictor");
                Arc::new(MockPredictor::with_test_data())
            }
        };
        let cache: Arc<dyn AnnotationCache> =
            Arc::new(TtlCache::new(config.cache.ttl(), config.cache.capacity));

        let annotator = Annotator::new(Recoder::new(reference, rsids), predictor, cache);
        Ok(Self::new(config, annotator))
    }

    /// Assembly named in a request, or the configured default
    pub fn assembly(&self, requested: Option<&str>) -> Result<GenomeBuild, ServiceError> {
        match requested {
            None => Ok(self.config.reference.default_assembly),
            Some(name) => name
                .parse()
                .map_err(|_| ServiceError::BadRequest(format!("unknown assembly '{}'", name))),
        }
    }
}

/// Create the Axum application with all routes and middleware
pub fn create_app(config: ServiceConfig) -> Result<(Router, AppState), VariantError> {
    let state = AppState::from_config(config)?;
    let app = router(state.clone())?;
    Ok((app, state))
}

/// Routes over an existing state
pub fn router(state: AppState) -> Result<Router, VariantError> {
    let max_size = parse_size(&state.config.server.max_request_size).map_err(|e| {
        VariantError::Config {
            msg: format!("Invalid max_request_size: {}", e),
        }
    })?;

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/variants/classify",
            post(handlers::notation::classify_variant),
        )
        .route(
            "/api/v1/variants/validate",
            post(handlers::notation::validate_variant),
        )
        .route(
            "/api/v1/variants/recode",
            post(handlers::recode::recode_variant),
        )
        .route(
            "/api/v1/variants/annotate",
            post(handlers::annotate::annotate_variant),
        )
        .route("/api/v1/cache/stats", get(handlers::cache::cache_stats))
        .route("/api/v1/cache", delete(handlers::cache::clear_cache))
        .fallback(handle_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_size));

    Ok(app)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: ServiceConfig) -> Result<(), VariantError> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| VariantError::Config {
            msg: format!("invalid listen address: {}", e),
        })?;
    let (app, state) = create_app(config)?;

    match state.annotator.sync_upstream_version().await {
        Ok(version) => tracing::info!(
            "{} release {}",
            state.annotator.predictor_name(),
            version
        ),
        Err(e) => tracing::warn!("could not reach {}: {}", state.annotator.predictor_name(), e),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HNF1B variant service running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Handle 404 errors
async fn handle_404() -> (StatusCode, Json<ErrorResponse>) {
    let error = ServiceError::BadRequest("Endpoint not found".to_string());
    (StatusCode::NOT_FOUND, Json(error.to_response()))
}

/// Upper bound for one request handler, from `server.request_timeout_seconds`
pub(crate) fn request_timeout(state: &AppState) -> Duration {
    Duration::from_secs(state.config.server.request_timeout_seconds)
}

/// Parse size strings like "10MB", "1GB", etc.
fn parse_size(size_str: &str) -> Result<usize, String> {
    let size_str = size_str.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = size_str.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = size_str.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = size_str.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = size_str.strip_suffix('B') {
        (n, 1)
    } else {
        (size_str.as_str(), 1)
    };
    num_str
        .trim()
        .parse::<usize>()
        .map(|n| n * multiplier)
        .map_err(|_| format!("Invalid size format: {}", size_str))
}
