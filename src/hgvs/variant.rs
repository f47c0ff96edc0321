//! Parsed HGVS variant

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hgvs::edit::NaEdit;
use crate::hgvs::location::HgvsInterval;

/// HGVS coordinate type (the letter before the dot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateType {
    /// `g.` linear genomic
    Genomic,
    /// `m.` mitochondrial
    Mitochondrial,
    /// `c.` coding DNA
    Coding,
    /// `n.` non-coding DNA
    NonCoding,
    /// `p.` protein
    Protein,
}

impl CoordinateType {
    /// Prefix letter
    pub fn prefix(&self) -> char {
        match self {
            CoordinateType::Genomic => 'g',
            CoordinateType::Mitochondrial => 'm',
            CoordinateType::Coding => 'c',
            CoordinateType::NonCoding => 'n',
            CoordinateType::Protein => 'p',
        }
    }

    /// Parse from the prefix letter
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'g' => Some(CoordinateType::Genomic),
            'm' => Some(CoordinateType::Mitochondrial),
            'c' => Some(CoordinateType::Coding),
            'n' => Some(CoordinateType::NonCoding),
            'p' => Some(CoordinateType::Protein),
            _ => None,
        }
    }

    /// Whether positions are on a transcript (`c.`/`n.`)
    pub fn is_transcript(&self) -> bool {
        matches!(self, CoordinateType::Coding | CoordinateType::NonCoding)
    }

    /// Whether positions are on a chromosome (`g.`/`m.`)
    pub fn is_genomic(&self) -> bool {
        matches!(self, CoordinateType::Genomic | CoordinateType::Mitochondrial)
    }
}

/// Body of an HGVS description after the coordinate type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HgvsChange {
    /// Nucleotide edit at an interval
    Nucleotide { interval: HgvsInterval, edit: NaEdit },
    /// Protein consequence, kept verbatim (e.g., "Arg137Trp", "(Arg137Trp)")
    Protein { description: String },
}

/// A parsed HGVS variant description
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HgvsVariant {
    /// Versioned reference accession (e.g., "NM_000458.4")
    pub accession: String,
    pub coordinate: CoordinateType,
    pub change: HgvsChange,
}

impl HgvsVariant {
    /// Interval and edit for nucleotide-level descriptions
    pub fn nucleotide(&self) -> Option<(&HgvsInterval, &NaEdit)> {
        match &self.change {
            HgvsChange::Nucleotide { interval, edit } => Some((interval, edit)),
            HgvsChange::Protein { .. } => None,
        }
    }
}

impl fmt::Display for HgvsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.", self.accession, self.coordinate.prefix())?;
        match &self.change {
            HgvsChange::Nucleotide { interval, edit } => write!(f, "{}{}", interval, edit),
            HgvsChange::Protein { description } => write!(f, "{}", description),
        }
    }
}
