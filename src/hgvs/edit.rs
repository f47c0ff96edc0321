//! Nucleotide edits

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nucleotide-level edit of an HGVS description
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NaEdit {
    /// `A>G`
    Substitution { reference: String, alternative: String },
    /// `del` or `delATG`
    Deletion { deleted: Option<String> },
    /// `dup` or `dupATG`
    Duplication { duplicated: Option<String> },
    /// `insATG`
    Insertion { inserted: String },
    /// `delinsATG` or `delAinsG`
    Delins {
        deleted: Option<String>,
        inserted: String,
    },
}

impl NaEdit {
    /// Short name of the edit type
    pub fn kind(&self) -> &'static str {
        match self {
            NaEdit::Substitution { .. } => "substitution",
            NaEdit::Deletion { .. } => "deletion",
            NaEdit::Duplication { .. } => "duplication",
            NaEdit::Insertion { .. } => "insertion",
            NaEdit::Delins { .. } => "delins",
        }
    }

    /// Bases of the reference span stated in the description, if any
    pub fn stated_reference(&self) -> Option<&str> {
        match self {
            NaEdit::Substitution { reference, .. } => Some(reference),
            NaEdit::Deletion { deleted } | NaEdit::Delins { deleted, .. } => deleted.as_deref(),
            NaEdit::Duplication { duplicated } => duplicated.as_deref(),
            NaEdit::Insertion { .. } => None,
        }
    }
}

impl fmt::Display for NaEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaEdit::Substitution {
                reference,
                alternative,
            } => write!(f, "{}>{}", reference, alternative),
            NaEdit::Deletion { deleted } => write!(f, "del{}", deleted.as_deref().unwrap_or("")),
            NaEdit::Duplication { duplicated } => {
                write!(f, "dup{}", duplicated.as_deref().unwrap_or(""))
            }
            NaEdit::Insertion { inserted } => write!(f, "ins{}", inserted),
            NaEdit::Delins { inserted, .. } => write!(f, "delins{}", inserted),
        }
    }
}

/// Complement of a single base
pub fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

/// Reverse complement of a sequence
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let sub = NaEdit::Substitution {
            reference: "G".to_string(),
            alternative: "A".to_string(),
        };
        assert_eq!(sub.to_string(), "G>A");
        assert_eq!(NaEdit::Deletion { deleted: None }.to_string(), "del");
        assert_eq!(
            NaEdit::Delins {
                deleted: Some("AT".to_string()),
                inserted: "G".to_string()
            }
            .to_string(),
            "delinsG"
        );
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ATGC"), "GCAT");
        assert_eq!(reverse_complement("N"), "N");
        assert_eq!(reverse_complement(""), "");
    }
}
