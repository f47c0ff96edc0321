//! Cached annotation of variants
//!
//! Every notation of a change resolves to the same [`CanonicalKey`]; the
//! annotator serves that key from the cache or asks the predictor exactly
//! once. Lookups of one key are serialized through a per-key gate, so
//! concurrent misses for the same change share a single upstream call.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tokio::sync::Mutex;

use crate::annotate::predictor::{ConsequencePredictor, PredictionQuery};
use crate::annotate::types::{AnnotationLookup, AnnotationRecord};
use crate::cache::AnnotationCache;
use crate::error::VariantError;
use crate::recode::Recoder;
use crate::variant::{AssembledVariant, CanonicalKey};

/// Annotator combining a recoder, a predictor and a cache
pub struct Annotator {
    recoder: Recoder,
    predictor: Arc<dyn ConsequencePredictor>,
    cache: Arc<dyn AnnotationCache>,
    inflight: std::sync::Mutex<HashMap<CanonicalKey, Arc<Mutex<()>>>>,
    /// Predictor release seen most recently
    last_version: std::sync::Mutex<Option<String>>,
}

impl Annotator {
    pub fn new(
        recoder: Recoder,
        predictor: Arc<dyn ConsequencePredictor>,
        cache: Arc<dyn AnnotationCache>,
    ) -> Self {
        Self {
            recoder,
            predictor,
            cache,
            inflight: std::sync::Mutex::new(HashMap::new()),
            last_version: std::sync::Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<dyn AnnotationCache> {
        &self.cache
    }

    pub fn recoder(&self) -> &Recoder {
        &self.recoder
    }

    /// Name of the predictor answering cache misses
    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Predictor release seen most recently, if any
    pub fn last_version(&self) -> Option<String> {
        self.last_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Annotate one variant
    ///
    /// Resolution errors (invalid or unconvertible input) are returned before
    /// the cache or predictor is touched. Failed lookups are not cached.
    pub async fn annotate(
        &self,
        variant: &AssembledVariant,
    ) -> Result<AnnotationLookup, VariantError> {
        let change = self.recoder.resolve(variant)?;
        let key = change.canonical_key();

        // locals drop in reverse order: the gate is released before its entry is cleaned up
        let _cleanup = GateCleanup {
            annotator: self,
            key: &key,
        };
        let gate = self.gate(&key);
        let _held = gate.lock().await;
        let result = self
            .lookup_locked(variant, &key, PredictionQuery::from_change(&change))
            .await;
        result
    }

    async fn lookup_locked(
        &self,
        variant: &AssembledVariant,
        key: &CanonicalKey,
        query: PredictionQuery,
    ) -> Result<AnnotationLookup, VariantError> {
        if let Some(record) = self.cache.get(key) {
            tracing::debug!("cache hit for {}", key);
            return Ok(AnnotationLookup {
                record,
                served_from_cache: true,
            });
        }

        tracing::debug!("cache miss for {}, querying {}", key, self.predictor.name());
        let result = self.predictor.predict(&query).await.map_err(|e| {
            tracing::warn!("annotation of {} failed: {}", key, e);
            e
        })?;

        self.observe_version(&result.predictor_version);
        let record = AnnotationRecord::from_result(
            key.clone(),
            variant.id.to_string(),
            variant.assembly,
            self.predictor.name(),
            result,
        );
        self.cache.put(key.clone(), record.clone());
        Ok(AnnotationLookup {
            record,
            served_from_cache: false,
        })
    }

    /// Ask the predictor for its release and apply the version check
    pub async fn sync_upstream_version(&self) -> Result<String, VariantError> {
        let version = self.predictor.version().await?;
        self.observe_version(&version);
        Ok(version)
    }

    /// Record a predictor release; a change empties the cache
    fn observe_version(&self, version: &str) {
        let mut last = self
            .last_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match last.as_deref() {
            Some(previous) if previous == version => {}
            Some(previous) => {
                tracing::info!(
                    "predictor version changed from {} to {}, invalidating cache",
                    previous,
                    version
                );
                self.cache.invalidate_all();
                *last = Some(version.to_string());
            }
            None => {
                tracing::info!("predictor version {}", version);
                *last = Some(version.to_string());
            }
        }
    }

    fn gate(&self, key: &CanonicalKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Removes the gate for `key` on drop once nobody else holds it
///
/// Runs on normal return and when the lookup future is cancelled.
struct GateCleanup<'a> {
    annotator: &'a Annotator,
    key: &'a CanonicalKey,
}

impl Drop for GateCleanup<'_> {
    fn drop(&mut self) {
        let mut inflight = self
            .annotator
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if inflight
            .get(self.key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            inflight.remove(self.key);
        }
    }
}
