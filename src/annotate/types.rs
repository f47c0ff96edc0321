//! Annotation data model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::GenomeBuild;
use crate::variant::CanonicalKey;

/// Predicted impact class, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    Modifier,
    Low,
    Moderate,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impact::Modifier => "MODIFIER",
            Impact::Low => "LOW",
            Impact::Moderate => "MODERATE",
            Impact::High => "HIGH",
        };
        f.write_str(s)
    }
}

impl FromStr for Impact {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MODIFIER" => Ok(Impact::Modifier),
            "LOW" => Ok(Impact::Low),
            "MODERATE" => Ok(Impact::Moderate),
            "HIGH" => Ok(Impact::High),
            other => Err(VariantError::upstream(format!("unknown impact '{}'", other))),
        }
    }
}

/// Consequence of a variant on one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptConsequence {
    pub transcript_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_symbol: Option<String>,
    pub consequence_terms: Vec<String>,
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hgvsc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hgvsp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadd_phred: Option<f64>,
    #[serde(default)]
    pub canonical: bool,
}

/// A known variant at the same position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColocatedVariant {
    /// e.g. "rs56116432"
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gnomad_af: Option<f64>,
}

/// What a consequence predictor returns for one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceResult {
    pub most_severe_consequence: String,
    #[serde(default)]
    pub transcript_consequences: Vec<TranscriptConsequence>,
    #[serde(default)]
    pub colocated_variants: Vec<ColocatedVariant>,
    /// Predictor release that produced the result
    pub predictor_version: String,
}

/// Where an annotation came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub version: String,
    pub assembly: GenomeBuild,
}

/// A cached annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub key: CanonicalKey,
    pub input: String,
    pub assembly: GenomeBuild,
    pub most_severe_consequence: String,
    /// Most severe impact across transcript consequences
    pub impact: Option<Impact>,
    /// Highest CADD PHRED score across transcript consequences
    pub cadd_phred: Option<f64>,
    /// gnomAD allele frequency of a colocated variant
    pub gnomad_af: Option<f64>,
    pub transcript_consequences: Vec<TranscriptConsequence>,
    pub colocated_variants: Vec<ColocatedVariant>,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

impl AnnotationRecord {
    /// Summarize a predictor result
    pub fn from_result(
        key: CanonicalKey,
        input: impl Into<String>,
        assembly: GenomeBuild,
        source: impl Into<String>,
        result: ConsequenceResult,
    ) -> Self {
        let impact = result
            .transcript_consequences
            .iter()
            .map(|tc| tc.impact)
            .max();
        let cadd_phred = result
            .transcript_consequences
            .iter()
            .filter_map(|tc| tc.cadd_phred)
            .reduce(f64::max);
        let gnomad_af = result
            .colocated_variants
            .iter()
            .filter_map(|cv| cv.gnomad_af)
            .reduce(f64::max);
        Self {
            key,
            input: input.into(),
            assembly,
            most_severe_consequence: result.most_severe_consequence,
            impact,
            cadd_phred,
            gnomad_af,
            transcript_consequences: result.transcript_consequences,
            colocated_variants: result.colocated_variants,
            provenance: Provenance {
                source: source.into(),
                version: result.predictor_version,
                assembly,
            },
            fetched_at: Utc::now(),
        }
    }
}

/// Result of an annotation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLookup {
    pub record: AnnotationRecord,
    pub served_from_cache: bool,
}
