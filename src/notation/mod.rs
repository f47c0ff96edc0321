//! Notation classification, validation and correction
//!
//! The front of the pipeline: [`classify`] decides which notation a raw
//! string is written in, [`validate`] checks it against that notation's
//! grammar and proposes corrections, and [`parse_variant`] turns it into a
//! [`VariantId`] for the recoder and annotator.

pub mod classify;
pub mod corrections;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::variant::VariantId;

pub use classify::classify;
pub use corrections::{candidates, suggest};
pub use validate::{validate, validate_input, ValidationOutcome};

/// Notation family of a raw variant string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotationKind {
    Hgvs,
    Vcf,
    RsId,
    Spdi,
    Unknown,
}

impl NotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotationKind::Hgvs => "hgvs",
            NotationKind::Vcf => "vcf",
            NotationKind::RsId => "rsid",
            NotationKind::Spdi => "spdi",
            NotationKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw string, attaching correction suggestions to notation errors
///
/// ```
/// use hnf1b_variants::notation::parse_variant;
///
/// let err = parse_variant("NM_000458.4c.544+1G>A").unwrap_err();
/// assert_eq!(err.suggestions(), ["NM_000458.4:c.544+1G>A"]);
/// ```
pub fn parse_variant(raw: &str) -> Result<VariantId, VariantError> {
    VariantId::parse(raw).map_err(|e| match e {
        VariantError::InvalidNotation { msg, .. } => VariantError::InvalidNotation {
            msg,
            suggestions: suggest(raw),
        },
        other => other,
    })
}
