//! SPDI (Sequence Position Deletion Insertion) variant representation
//!
//! SPDI is NCBI's contextual representation:
//!
//! ```text
//! sequence:position:deletion:insertion
//! ```
//!
//! - `sequence`: reference sequence accession (e.g., NC_000017.11)
//! - `position`: 0-based interbase position
//! - `deletion`: deleted bases (empty for insertions)
//! - `insertion`: inserted bases (empty for deletions)
//!
//! # Examples
//!
//! ```
//! use hnf1b_variants::spdi::SpdiVariant;
//!
//! let spdi: SpdiVariant = "NC_000017.11:36459257:A:G".parse().unwrap();
//! assert_eq!(spdi.position, 36459257);
//! assert_eq!(spdi.to_one_based_position(), 36459258);
//! assert_eq!(spdi.to_string(), "NC_000017.11:36459257:A:G");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;

/// A variant in SPDI format
///
/// | Variant Type | SPDI | Description |
/// |--------------|------|-------------|
/// | Substitution | `NC:12344:A:G` | A>G at position 12345 (1-based) |
/// | Deletion | `NC:99:ATG:` | Delete ATG starting at position 100 |
/// | Insertion | `NC:100::ATG` | Insert ATG after position 100 |
/// | Delins | `NC:99:ATG:TCA` | Replace ATG with TCA |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpdiVariant {
    /// Reference sequence accession
    pub sequence: String,
    /// 0-based interbase position
    pub position: u64,
    /// Deleted sequence (empty for pure insertions)
    pub deletion: String,
    /// Inserted sequence (empty for pure deletions)
    pub insertion: String,
}

impl SpdiVariant {
    pub fn new(
        sequence: impl Into<String>,
        position: u64,
        deletion: impl Into<String>,
        insertion: impl Into<String>,
    ) -> Self {
        Self {
            sequence: sequence.into(),
            position,
            deletion: deletion.into(),
            insertion: insertion.into(),
        }
    }

    /// Returns true if this is a pure deletion
    pub fn is_deletion(&self) -> bool {
        !self.deletion.is_empty() && self.insertion.is_empty()
    }

    /// Returns true if this is a pure insertion
    pub fn is_insertion(&self) -> bool {
        self.deletion.is_empty() && !self.insertion.is_empty()
    }

    /// 1-based position of the first affected base
    pub fn to_one_based_position(&self) -> u64 {
        self.position.saturating_add(1)
    }
}

impl fmt::Display for SpdiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.sequence, self.position, self.deletion, self.insertion
        )
    }
}

impl FromStr for SpdiVariant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_spdi(s)
    }
}

fn check_bases(field: &str, bases: &str) -> Result<(), VariantError> {
    if let Some(bad) = bases
        .chars()
        .find(|c| !matches!(c, 'A' | 'C' | 'G' | 'T' | 'N'))
    {
        return Err(VariantError::invalid(format!(
            "SPDI {} '{}' contains '{}' (expected upper-case A, C, G, T or N)",
            field, bases, bad
        )));
    }
    Ok(())
}

/// Parse an SPDI string
///
/// Deletion and insertion may be empty, but not both, and must differ.
pub fn parse_spdi(input: &str) -> Result<SpdiVariant, VariantError> {
    let input = input.trim();
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 4 {
        return Err(VariantError::invalid(format!(
            "SPDI expects 4 colon-separated fields, found {}",
            parts.len()
        )));
    }

    let sequence = parts[0];
    if sequence.is_empty() {
        return Err(VariantError::invalid("SPDI sequence identifier is empty"));
    }
    if !sequence.contains('.') {
        return Err(VariantError::invalid(format!(
            "SPDI sequence '{}' is missing a version number",
            sequence
        )));
    }

    let position: u64 = parts[1].parse().map_err(|_| {
        VariantError::invalid(format!("SPDI position '{}' is not a valid number", parts[1]))
    })?;

    let (deletion, insertion) = (parts[2], parts[3]);
    check_bases("deletion", deletion)?;
    check_bases("insertion", insertion)?;
    if deletion == insertion {
        return Err(VariantError::invalid(format!(
            "SPDI '{}' describes no change",
            input
        )));
    }

    Ok(SpdiVariant::new(sequence, position, deletion, insertion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        let del = parse_spdi("NC_000017.11:99:ATG:").unwrap();
        assert!(del.is_deletion());
        let ins = parse_spdi("NC_000017.11:100::ATG").unwrap();
        assert!(ins.is_insertion());
        assert_eq!(ins.to_string(), "NC_000017.11:100::ATG");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_spdi("NC_000017.11:99:A").is_err());
        assert!(parse_spdi("NC_000017.11:99:A:G:T").is_err());
        assert!(parse_spdi(":99:A:G").is_err());
        assert!(parse_spdi("NC_000017:99:A:G").is_err());
        assert!(parse_spdi("NC_000017.11:abc:A:G").is_err());
        assert!(parse_spdi("NC_000017.11:-1:A:G").is_err());
        assert!(parse_spdi("NC_000017.11:99:a:g").is_err());
        assert!(parse_spdi("NC_000017.11:99::").is_err());
        assert!(parse_spdi("NC_000017.11:99:A:A").is_err());
    }

    #[test]
    fn test_serde() {
        let spdi = SpdiVariant::new("NC_000017.11", 12344, "A", "G");
        let json = serde_json::to_string(&spdi).unwrap();
        let back: SpdiVariant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spdi);
    }
}
