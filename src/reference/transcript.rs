//! Transcript models
//!
//! Exons are stored in transcript order (5' to 3'), each with its
//! transcript and genomic span. All coordinates are 1-based and inclusive.

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::assembly::GenomeBuild;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// An exon in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    /// Exon number (1-based)
    pub number: u32,
    /// Start position in transcript coordinates
    pub tx_start: u64,
    /// End position in transcript coordinates
    pub tx_end: u64,
    /// Lowest genomic position covered by the exon
    pub genomic_start: u64,
    /// Highest genomic position covered by the exon
    pub genomic_end: u64,
}

impl Exon {
    /// Length of the exon in bases
    pub fn len(&self) -> u64 {
        self.tx_end - self.tx_start + 1
    }

    /// An exon always covers at least one base
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether a genomic position falls inside this exon
    pub fn contains_genomic(&self, pos: u64) -> bool {
        pos >= self.genomic_start && pos <= self.genomic_end
    }

    /// Whether a transcript position falls inside this exon
    pub fn contains_tx(&self, pos: u64) -> bool {
        pos >= self.tx_start && pos <= self.tx_end
    }
}

/// A transcript aligned to a chromosome of one assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Versioned accession (e.g., "NM_000458.4")
    pub id: String,
    /// Gene symbol (e.g., "HNF1B")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_symbol: Option<String>,
    /// Assembly the genomic coordinates refer to
    pub build: GenomeBuild,
    /// Bare chromosome name (e.g., "17")
    pub chromosome: String,
    /// Strand
    pub strand: Strand,
    /// Exons in transcript order
    pub exons: Vec<Exon>,
    /// First base of the start codon, in transcript coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds_start: Option<u64>,
    /// Last base of the stop codon, in transcript coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds_end: Option<u64>,
}

impl Transcript {
    /// Whether the transcript has a coding sequence
    pub fn is_coding(&self) -> bool {
        self.cds_start.is_some() && self.cds_end.is_some()
    }

    /// HGVS coordinate type for this transcript (`c` or `n`)
    pub fn coordinate_prefix(&self) -> char {
        if self.is_coding() {
            'c'
        } else {
            'n'
        }
    }

    /// Total transcript length
    pub fn len(&self) -> u64 {
        self.exons.last().map(|e| e.tx_end).unwrap_or(0)
    }

    /// Whether the transcript has no exons
    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }

    /// Lowest and highest genomic position covered
    pub fn genomic_span(&self) -> Option<(u64, u64)> {
        let start = self.exons.iter().map(|e| e.genomic_start).min()?;
        let end = self.exons.iter().map(|e| e.genomic_end).max()?;
        Some((start, end))
    }

    /// Whether the genomic interval `[start, end]` overlaps the transcript
    pub fn overlaps(&self, chromosome: &str, start: u64, end: u64) -> bool {
        if self.chromosome != chromosome {
            return false;
        }
        match self.genomic_span() {
            Some((tx_start, tx_end)) => start <= tx_end && end >= tx_start,
            None => false,
        }
    }

    /// Check the exon layout for internal consistency
    ///
    /// Exons must be contiguous in transcript space, have matching transcript
    /// and genomic lengths, and walk the genome in strand order.
    pub fn check(&self) -> Result<(), VariantError> {
        let fail = |msg: String| VariantError::Config {
            msg: format!("transcript {}: {}", self.id, msg),
        };
        if self.exons.is_empty() {
            return Err(fail("no exons".to_string()));
        }
        let mut expected_tx = 1;
        for exon in &self.exons {
            if exon.tx_start != expected_tx || exon.tx_end < exon.tx_start {
                return Err(fail(format!(
                    "exon {} does not start at transcript position {}",
                    exon.number, expected_tx
                )));
            }
            if exon.genomic_end < exon.genomic_start
                || exon.genomic_end - exon.genomic_start != exon.tx_end - exon.tx_start
            {
                return Err(fail(format!(
                    "exon {} has mismatched genomic and transcript lengths",
                    exon.number
                )));
            }
            expected_tx = exon.tx_end + 1;
        }
        for pair in self.exons.windows(2) {
            let ordered = match self.strand {
                Strand::Plus => pair[0].genomic_end < pair[1].genomic_start,
                Strand::Minus => pair[0].genomic_start > pair[1].genomic_end,
            };
            if !ordered {
                return Err(fail(format!(
                    "exons {} and {} overlap or are out of order",
                    pair[0].number, pair[1].number
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.cds_start, self.cds_end) {
            if start > end || end > self.len() {
                return Err(fail("CDS lies outside the transcript".to_string()));
            }
        }
        Ok(())
    }
}
