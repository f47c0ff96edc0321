//! Reference provider trait
//!
//! Defines the interface the recoder uses to reach transcript models and
//! genomic sequence.

use crate::error::VariantError;
use crate::reference::assembly::GenomeBuild;
use crate::reference::transcript::Transcript;

/// Trait for providing reference data
///
/// Implementations might include:
/// - [`ReferenceStore`](crate::reference::ReferenceStore) for in-memory data loaded from JSON
/// - a cdot/UTA-backed provider for full transcript sets
pub trait ReferenceProvider: Send + Sync {
    /// Get a transcript by its versioned accession in one assembly
    fn get_transcript(&self, id: &str, build: GenomeBuild) -> Result<Transcript, VariantError>;

    /// All transcripts overlapping the genomic interval `[start, end]` (1-based, inclusive)
    fn overlapping_transcripts(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Vec<Transcript>;

    /// Known versions of an unversioned transcript accession (e.g., "NM_000458")
    fn transcript_versions(&self, base: &str, build: GenomeBuild) -> Vec<String> {
        let _ = (base, build);
        Vec::new()
    }

    /// Get genomic sequence
    ///
    /// # Arguments
    ///
    /// * `chromosome` - Bare chromosome name (e.g., "17")
    /// * `start` - 0-based start position
    /// * `end` - 0-based end position (exclusive)
    ///
    /// The default implementation reports that genomic data is not available.
    fn get_genomic_sequence(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<String, VariantError> {
        Err(VariantError::not_found(format!(
            "no genomic sequence for {}:{}-{} ({})",
            chromosome, start, end, build
        )))
    }

    /// Check if this provider has genomic sequence data
    fn has_genomic_data(&self) -> bool {
        false
    }
}
