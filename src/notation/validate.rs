//! Rule-based validation
//!
//! Validation is side-effect free: it parses the input with the grammar of
//! the given notation and, when that fails, offers the corrections from
//! [`suggest`](crate::notation::suggest).

use serde::{Deserialize, Serialize};

use crate::hgvs::parse_hgvs;
use crate::notation::{classify, suggest, NotationKind};
use crate::rsid::{format_rsid, parse_rsid};
use crate::spdi::parse_spdi;
use crate::vcf::parse_vcf;

/// Result of validating one input string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub input: String,
    pub format: NotationKind,
    pub valid: bool,
    /// Canonical spelling of a valid input
    pub normalized: Option<String>,
    pub message: String,
    /// Corrections that validate, most likely first
    pub suggestions: Vec<String>,
}

/// Validate `raw` as notation `kind`
///
/// ```
/// use hnf1b_variants::notation::{validate, NotationKind};
///
/// let outcome = validate("chr17-36459258-A-G", NotationKind::Vcf);
/// assert!(outcome.valid);
/// assert_eq!(outcome.normalized.as_deref(), Some("17-36459258-A-G"));
/// ```
pub fn validate(raw: &str, kind: NotationKind) -> ValidationOutcome {
    let input = raw.trim();
    let parsed = match kind {
        NotationKind::Hgvs => parse_hgvs(input).map(|v| v.to_string()),
        NotationKind::Vcf => parse_vcf(input).map(|v| v.to_string()),
        NotationKind::RsId => parse_rsid(input).map(format_rsid),
        NotationKind::Spdi => parse_spdi(input).map(|v| v.to_string()),
        NotationKind::Unknown => {
            let suggestions = suggest(raw);
            let message = if suggestions.is_empty() {
                "not a recognized variant notation (HGVS, VCF, rsID or SPDI)".to_string()
            } else {
                "not a recognized variant notation; see suggestions".to_string()
            };
            return ValidationOutcome {
                input: raw.to_string(),
                format: kind,
                valid: false,
                normalized: None,
                message,
                suggestions,
            };
        }
    };

    match parsed {
        Ok(normalized) => ValidationOutcome {
            input: raw.to_string(),
            format: kind,
            valid: true,
            normalized: Some(normalized),
            message: format!("valid {} notation", kind),
            suggestions: Vec::new(),
        },
        Err(e) => ValidationOutcome {
            input: raw.to_string(),
            format: kind,
            valid: false,
            normalized: None,
            message: e.to_string(),
            suggestions: suggest(raw),
        },
    }
}

/// Classify then validate
pub fn validate_input(raw: &str) -> ValidationOutcome {
    validate(raw, classify(raw))
}
