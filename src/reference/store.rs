//! In-memory reference store
//!
//! Holds transcript models and genomic sequence windows, loaded from a JSON
//! file or built programmatically.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "transcripts": [ { "id": "NM_000458.4", "build": "GRCh38", "chromosome": "17",
//!                      "strand": "-", "exons": [...], "cds_start": 101, "cds_end": 1774 } ],
//!   "sequences": [ { "build": "GRCh38", "chromosome": "17", "start": 36459199, "bases": "GCTA..." } ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::assembly::{normalize_chromosome, GenomeBuild};
use crate::reference::provider::ReferenceProvider;
use crate::reference::transcript::{Exon, Strand, Transcript};

/// A contiguous stretch of genomic sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceWindow {
    pub build: GenomeBuild,
    pub chromosome: String,
    /// 0-based position of the first base
    pub start: u64,
    pub bases: String,
}

impl SequenceWindow {
    fn end(&self) -> u64 {
        self.start + self.bases.len() as u64
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ReferenceFile {
    #[serde(default)]
    transcripts: Vec<Transcript>,
    #[serde(default)]
    sequences: Vec<SequenceWindow>,
}

/// In-memory [`ReferenceProvider`]
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    transcripts: HashMap<(GenomeBuild, String), Transcript>,
    sequences: Vec<SequenceWindow>,
}

impl ReferenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load transcripts and sequence windows from a JSON file
    pub fn from_json(path: &Path) -> Result<Self, VariantError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load transcripts and sequence windows from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, VariantError> {
        let file: ReferenceFile = serde_json::from_str(content)?;
        let mut store = Self::new();
        for transcript in file.transcripts {
            store.add_transcript(transcript)?;
        }
        for window in file.sequences {
            store.add_sequence(window)?;
        }
        Ok(store)
    }

    /// Add a transcript, checking its exon layout
    pub fn add_transcript(&mut self, mut transcript: Transcript) -> Result<(), VariantError> {
        transcript.check()?;
        transcript.chromosome = normalize_chromosome(&transcript.chromosome).ok_or_else(|| {
            VariantError::Config {
                msg: format!(
                    "transcript {} is on unknown chromosome '{}'",
                    transcript.id, transcript.chromosome
                ),
            }
        })?;
        self.transcripts
            .insert((transcript.build, transcript.id.clone()), transcript);
        Ok(())
    }

    /// Add a genomic sequence window
    pub fn add_sequence(&mut self, mut window: SequenceWindow) -> Result<(), VariantError> {
        window.chromosome =
            normalize_chromosome(&window.chromosome).ok_or_else(|| VariantError::Config {
                msg: format!("sequence on unknown chromosome '{}'", window.chromosome),
            })?;
        window.bases = window.bases.to_ascii_uppercase();
        self.sequences.push(window);
        Ok(())
    }

    /// Number of transcripts held
    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }

    /// Store with synthetic fixtures used across the test suite
    ///
    /// The exon layouts are invented for tests; they are not real gene models.
    /// - `NM_000458.4` (HNF1B), chr17 minus strand on GRCh38, with `c.544+1`
    ///   placed at 17:36459258
    /// - `NM_999999.1` (TESTPLUS), chr1 plus strand on GRCh38
    pub fn with_test_data() -> Self {
        let mut store = Self::new();
        let fixtures = [
            Transcript {
                id: "NM_000458.4".to_string(),
                gene_symbol: Some("HNF1B".to_string()),
                build: GenomeBuild::GRCh38,
                chromosome: "17".to_string(),
                strand: Strand::Minus,
                exons: vec![
                    exon(1, 1, 444, 36460459, 36460902),
                    exon(2, 445, 644, 36459259, 36459458),
                    exon(3, 645, 1000, 36456903, 36457258),
                    exon(4, 1001, 2800, 36453603, 36455402),
                ],
                cds_start: Some(101),
                cds_end: Some(1774),
            },
            Transcript {
                id: "NM_999999.1".to_string(),
                gene_symbol: Some("TESTPLUS".to_string()),
                build: GenomeBuild::GRCh38,
                chromosome: "1".to_string(),
                strand: Strand::Plus,
                exons: vec![exon(1, 1, 100, 1001, 1100), exon(2, 101, 200, 2001, 2100)],
                cds_start: Some(21),
                cds_end: Some(170),
            },
        ];
        let windows = [
            SequenceWindow {
                build: GenomeBuild::GRCh38,
                chromosome: "17".to_string(),
                start: 36459199,
                bases: "GCTAAAGACAATTACATAACATACACGTCAGCACGAAACTTGTTGGCCCAGTGTGAACAGCTTAAGGGTGTTTTCAGTGTGATGCATACGCCTTTACTTGCTGTGTCCACCCCATCGGACT".to_string(),
            },
            SequenceWindow {
                build: GenomeBuild::GRCh38,
                chromosome: "1".to_string(),
                start: 980,
                bases: "GGCATTTTTATTACACTCAGAAACAGAACTCGGGTAATTTTGACAGGTCACGCAGAGGCTCAGCAGTCTGAAGTGCGTGGACACTCGCTATGAATCTCTGATTTACCCACTCTGCCAAACTCCAGCGCGGTCAGTTCCAT".to_string(),
            },
            SequenceWindow {
                build: GenomeBuild::GRCh38,
                chromosome: "1".to_string(),
                start: 1980,
                bases: "CACCCTAAGTAACCGAATAATGCGTTCGCTCTATTGACTACGACGCGCTCATTCCCTTGTCGGAGAGTTATGGAACAAGGACGCTGTCTGAGACTAGAAGACAGATAGTGCACACGACCGGCGTCGGAGAAACTCTATTT".to_string(),
            },
        ];
        for transcript in fixtures {
            if let Err(e) = store.add_transcript(transcript) {
                tracing::error!("invalid test transcript: {}", e);
            }
        }
        for window in windows {
            if let Err(e) = store.add_sequence(window) {
                tracing::error!("invalid test sequence: {}", e);
            }
        }
        store
    }
}

fn exon(number: u32, tx_start: u64, tx_end: u64, genomic_start: u64, genomic_end: u64) -> Exon {
    Exon {
        number,
        tx_start,
        tx_end,
        genomic_start,
        genomic_end,
    }
}

impl ReferenceProvider for ReferenceStore {
    fn get_transcript(&self, id: &str, build: GenomeBuild) -> Result<Transcript, VariantError> {
        self.transcripts
            .get(&(build, id.to_string()))
            .cloned()
            .ok_or_else(|| VariantError::not_found(format!("transcript {} ({})", id, build)))
    }

    fn overlapping_transcripts(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Vec<Transcript> {
        let mut found: Vec<Transcript> = self
            .transcripts
            .values()
            .filter(|tx| tx.build == build && tx.overlaps(chromosome, start, end))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    fn transcript_versions(&self, base: &str, build: GenomeBuild) -> Vec<String> {
        let prefix = format!("{}.", base);
        let mut versions: Vec<String> = self
            .transcripts
            .keys()
            .filter(|(b, id)| *b == build && id.starts_with(&prefix))
            .map(|(_, id)| id.clone())
            .collect();
        versions.sort();
        versions
    }

    fn get_genomic_sequence(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<String, VariantError> {
        self.sequences
            .iter()
            .find(|w| {
                w.build == build && w.chromosome == chromosome && w.start <= start && end <= w.end()
            })
            .and_then(|w| {
                let from = (start - w.start) as usize;
                let to = (end - w.start) as usize;
                w.bases.get(from..to).map(str::to_string)
            })
            .ok_or_else(|| {
                VariantError::not_found(format!(
                    "no genomic sequence for {}:{}-{} ({})",
                    chromosome, start, end, build
                ))
            })
    }

    fn has_genomic_data(&self) -> bool {
        !self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_transcripts_load() {
        let store = ReferenceStore::with_test_data();
        assert_eq!(store.transcript_count(), 2);
        let tx = store
            .get_transcript("NM_000458.4", GenomeBuild::GRCh38)
            .unwrap();
        assert_eq!(tx.strand, Strand::Minus);
        assert!(store
            .get_transcript("NM_000458.4", GenomeBuild::GRCh37)
            .is_err());
    }

    #[test]
    fn test_overlapping() {
        let store = ReferenceStore::with_test_data();
        let hits = store.overlapping_transcripts(GenomeBuild::GRCh38, "17", 36459258, 36459258);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "NM_000458.4");
        assert!(store
            .overlapping_transcripts(GenomeBuild::GRCh38, "17", 1, 10)
            .is_empty());
    }

    #[test]
    fn test_transcript_versions() {
        let store = ReferenceStore::with_test_data();
        assert_eq!(
            store.transcript_versions("NM_000458", GenomeBuild::GRCh38),
            vec!["NM_000458.4".to_string()]
        );
    }

    #[test]
    fn test_genomic_sequence() {
        let store = ReferenceStore::with_test_data();
        // 1-based 36459257..36459259
        let seq = store
            .get_genomic_sequence(GenomeBuild::GRCh38, "17", 36459256, 36459259)
            .unwrap();
        assert_eq!(seq, "CAG");
        assert!(store
            .get_genomic_sequence(GenomeBuild::GRCh38, "17", 1, 5)
            .is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "transcripts": [{
                "id": "NR_000001.1", "build": "GRCh37", "chromosome": "chr2", "strand": "+",
                "exons": [{"number": 1, "tx_start": 1, "tx_end": 10, "genomic_start": 101, "genomic_end": 110}]
            }],
            "sequences": [{"build": "GRCh37", "chromosome": "2", "start": 100, "bases": "acgtacgtac"}]
        }"#;
        let store = ReferenceStore::from_json_str(json).unwrap();
        let tx = store.get_transcript("NR_000001.1", GenomeBuild::GRCh37).unwrap();
        assert_eq!(tx.chromosome, "2");
        assert!(!tx.is_coding());
        assert_eq!(
            store
                .get_genomic_sequence(GenomeBuild::GRCh37, "2", 100, 104)
                .unwrap(),
            "ACGT"
        );
    }
}
