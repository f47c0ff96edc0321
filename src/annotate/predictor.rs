//! Consequence predictor seam

use std::fmt;

use async_trait::async_trait;

use crate::annotate::types::ConsequenceResult;
use crate::error::VariantError;
use crate::reference::GenomeBuild;
use crate::variant::{CanonicalKey, GenomicChange};

/// A variant in the region/allele form consequence predictors accept
///
/// Coordinates are 1-based and inclusive. An insertion between bases `n`
/// and `n+1` is written with `start = n+1` and `end = n`; a deletion uses
/// `-` as the allele.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionQuery {
    pub key: CanonicalKey,
    pub build: GenomeBuild,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub allele: String,
}

impl PredictionQuery {
    pub fn from_change(change: &GenomicChange) -> Self {
        let allele = if change.inserted.is_empty() {
            "-".to_string()
        } else {
            change.inserted.clone()
        };
        Self {
            key: change.canonical_key(),
            build: change.build,
            chromosome: change.chromosome.clone(),
            start: change.start + 1,
            end: change.end(),
            allele,
        }
    }

    /// Region string, e.g. `17:36459258-36459258:1`
    pub fn region(&self) -> String {
        format!("{}:{}-{}:1", self.chromosome, self.start, self.end)
    }
}

impl fmt::Display for PredictionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.region(), self.allele, self.build)
    }
}

/// Upstream service predicting variant consequences
///
/// Implementations make at most one upstream call per `predict` and never
/// retry; throttling surfaces as [`VariantError::RateLimited`].
#[async_trait]
pub trait ConsequencePredictor: Send + Sync {
    /// Predict the consequences of one variant
    async fn predict(&self, query: &PredictionQuery) -> Result<ConsequenceResult, VariantError>;

    /// Current release of the predictor
    async fn version(&self) -> Result<String, VariantError>;

    /// Short name recorded in annotation provenance
    fn name(&self) -> &str;
}
