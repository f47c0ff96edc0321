//! Variant annotation
//!
//! [`Annotator`] resolves a variant to its canonical key, consults the
//! [`AnnotationCache`](crate::cache::AnnotationCache) and falls back to a
//! [`ConsequencePredictor`]: the Ensembl VEP REST service ([`VepClient`])
//! or the offline [`MockPredictor`].

pub mod annotator;
pub mod mock;
pub mod predictor;
pub mod types;
pub mod vep;

pub use annotator::Annotator;
pub use mock::MockPredictor;
pub use predictor::{ConsequencePredictor, PredictionQuery};
pub use types::{
    AnnotationLookup, AnnotationRecord, ColocatedVariant, ConsequenceResult, Impact, Provenance,
    TranscriptConsequence,
};
pub use vep::VepClient;
