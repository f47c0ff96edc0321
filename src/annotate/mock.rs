//! Mock consequence predictor for testing and offline use
//!
//! Answers from canned results keyed by canonical key and mimics the
//! upstream throttle: more than `max_per_second` calls inside any one-second
//! window are refused with [`VariantError::RateLimited`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::annotate::predictor::{ConsequencePredictor, PredictionQuery};
use crate::annotate::types::{ColocatedVariant, ConsequenceResult, Impact, TranscriptConsequence};
use crate::error::VariantError;
use crate::reference::GenomeBuild;
use crate::variant::{CanonicalKey, GenomicChange};

/// Default throttle, matching the public Ensembl REST limit
pub const DEFAULT_MAX_PER_SECOND: usize = 15;

const WINDOW: Duration = Duration::from_secs(1);

/// In-memory [`ConsequencePredictor`]
pub struct MockPredictor {
    responses: Mutex<HashMap<CanonicalKey, ConsequenceResult>>,
    default_response: Option<ConsequenceResult>,
    version: Mutex<String>,
    max_per_second: Option<usize>,
    window: Mutex<VecDeque<Instant>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl MockPredictor {
    /// Create a predictor with no canned results; every query is `NotFound`
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            default_response: None,
            version: Mutex::new("mock-1".to_string()),
            max_per_second: Some(DEFAULT_MAX_PER_SECOND),
            window: Mutex::new(VecDeque::new()),
            unavailable: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every unregistered key with `result`
    pub fn with_default(mut self, result: ConsequenceResult) -> Self {
        self.default_response = Some(result);
        self
    }

    /// Change the throttle; `None` disables it
    pub fn with_max_per_second(mut self, max_per_second: Option<usize>) -> Self {
        self.max_per_second = max_per_second;
        self
    }

    /// Register the result for one key
    pub fn add_response(&self, key: CanonicalKey, result: ConsequenceResult) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, result);
    }

    /// Simulate a new predictor release
    pub fn set_version(&self, version: impl Into<String>) {
        *self.version.lock().unwrap_or_else(PoisonError::into_inner) = version.into();
    }

    /// Make every call fail with `UpstreamUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Number of `predict` calls received, including refused ones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn current_version(&self) -> String {
        self.version
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn throttle(&self) -> Result<(), VariantError> {
        let Some(limit) = self.max_per_second else {
            return Ok(());
        };
        let now = Instant::now();
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            window.pop_front();
        }
        if window.len() >= limit {
            let retry_after = window
                .front()
                .map(|oldest| WINDOW.saturating_sub(now.duration_since(*oldest)));
            return Err(VariantError::RateLimited { retry_after });
        }
        window.push_back(now);
        Ok(())
    }

    /// Predictor with canned results for the built-in reference fixtures
    pub fn with_test_data() -> Self {
        let predictor = Self::new();
        let fixtures: [(&str, u64, &str, &str, ConsequenceResult); 4] = [
            ("17", 36459257, "A", "G", splice_donor()),
            ("1", 1049, "G", "A", missense("NM_999999.1:c.30G>A", 23.1)),
            ("1", 1049, "G", "T", missense("NM_999999.1:c.30G>T", 24.6)),
            ("1", 1046, "TC", "", frameshift()),
        ];
        for (chromosome, start, deleted, inserted, result) in fixtures {
            match GenomicChange::new(GenomeBuild::GRCh38, chromosome, start, deleted, inserted) {
                Ok(change) => predictor.add_response(change.canonical_key(), result),
                Err(e) => tracing::error!("invalid mock fixture: {}", e),
            }
        }
        predictor
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsequencePredictor for MockPredictor {
    async fn predict(&self, query: &PredictionQuery) -> Result<ConsequenceResult, VariantError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.throttle()?;
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(VariantError::upstream("mock predictor is unavailable"));
        }

        let canned = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query.key)
            .cloned();
        let mut result = canned
            .or_else(|| self.default_response.clone())
            .ok_or_else(|| VariantError::not_found(format!("no consequence for {}", query)))?;
        result.predictor_version = self.current_version();
        Ok(result)
    }

    async fn version(&self) -> Result<String, VariantError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(VariantError::upstream("mock predictor is unavailable"));
        }
        Ok(self.current_version())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn consequence(
    transcript_id: &str,
    gene: &str,
    term: &str,
    impact: Impact,
    hgvsc: Option<&str>,
    cadd_phred: Option<f64>,
) -> TranscriptConsequence {
    TranscriptConsequence {
        transcript_id: transcript_id.to_string(),
        gene_symbol: Some(gene.to_string()),
        consequence_terms: vec![term.to_string()],
        impact,
        hgvsc: hgvsc.map(str::to_string),
        hgvsp: None,
        cadd_phred,
        canonical: true,
    }
}

fn splice_donor() -> ConsequenceResult {
    ConsequenceResult {
        most_severe_consequence: "splice_donor_variant".to_string(),
        transcript_consequences: vec![consequence(
            "NM_000458.4",
            "HNF1B",
            "splice_donor_variant",
            Impact::High,
            Some("NM_000458.4:c.544+1G>A"),
            Some(33.0),
        )],
        colocated_variants: vec![ColocatedVariant {
            id: "rs56116432".to_string(),
            gnomad_af: Some(0.00002),
        }],
        predictor_version: String::new(),
    }
}

fn missense(hgvsc: &str, cadd_phred: f64) -> ConsequenceResult {
    ConsequenceResult {
        most_severe_consequence: "missense_variant".to_string(),
        transcript_consequences: vec![consequence(
            "NM_999999.1",
            "TESTPLUS",
            "missense_variant",
            Impact::Moderate,
            Some(hgvsc),
            Some(cadd_phred),
        )],
        colocated_variants: vec![ColocatedVariant {
            id: "rs999000001".to_string(),
            gnomad_af: None,
        }],
        predictor_version: String::new(),
    }
}

fn frameshift() -> ConsequenceResult {
    ConsequenceResult {
        most_severe_consequence: "frameshift_variant".to_string(),
        transcript_consequences: vec![consequence(
            "NM_999999.1",
            "TESTPLUS",
            "frameshift_variant",
            Impact::High,
            Some("NM_999999.1:c.27_28del"),
            None,
        )],
        colocated_variants: Vec::new(),
        predictor_version: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(chromosome: &str, start: u64, deleted: &str, inserted: &str) -> PredictionQuery {
        let change =
            GenomicChange::new(GenomeBuild::GRCh38, chromosome, start, deleted, inserted).unwrap();
        PredictionQuery::from_change(&change)
    }

    #[tokio::test]
    async fn test_canned_and_missing() {
        let predictor = MockPredictor::with_test_data();
        let result = predictor.predict(&query("17", 36459257, "A", "G")).await.unwrap();
        assert_eq!(result.most_severe_consequence, "splice_donor_variant");
        assert_eq!(result.predictor_version, "mock-1");

        let err = predictor
            .predict(&query("17", 100, "A", "G"))
            .await
            .unwrap_err();
        assert!(matches!(err, VariantError::NotFound { .. }));
        assert_eq!(predictor.calls(), 2);
    }

    #[tokio::test]
    async fn test_throttle_refuses_sixteenth_call() {
        let predictor = MockPredictor::new().with_default(splice_donor());
        let q = query("17", 36459257, "A", "G");
        for _ in 0..DEFAULT_MAX_PER_SECOND {
            predictor.predict(&q).await.unwrap();
        }
        match predictor.predict(&q).await {
            Err(VariantError::RateLimited { retry_after }) => {
                assert!(retry_after.is_some_and(|d| d <= WINDOW));
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_version_and_unavailable() {
        let predictor = MockPredictor::new();
        predictor.set_version("115");
        assert_eq!(predictor.version().await.unwrap(), "115");
        predictor.set_unavailable(true);
        assert!(matches!(
            predictor.version().await,
            Err(VariantError::UpstreamUnavailable { .. })
        ));
    }
}
