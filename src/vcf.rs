//! VCF-style variant strings
//!
//! The registry writes single variants as `CHROM-POS-REF-ALT`
//! (e.g., `17-36459258-A-G`), with VCF semantics: 1-based position of the
//! first reference base, and an anchor base shared by both alleles for
//! pure insertions and deletions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::normalize_chromosome;

/// A single-allele VCF variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VcfVariant {
    /// Bare chromosome name (e.g., "17", "X", "MT")
    pub chromosome: String,
    /// 1-based position of the first base of `reference`
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}

impl VcfVariant {
    pub fn new(
        chromosome: impl Into<String>,
        position: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// Check if this is a single nucleotide variant
    pub fn is_snv(&self) -> bool {
        self.reference.len() == 1 && self.alternate.len() == 1
    }
}

impl fmt::Display for VcfVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chromosome, self.position, self.reference, self.alternate
        )
    }
}

impl FromStr for VcfVariant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_vcf(s)
    }
}

fn check_allele(name: &str, allele: &str) -> Result<(), VariantError> {
    if allele.starts_with('<') || allele.contains('[') || allele.contains(']') || allele == "*" {
        return Err(VariantError::unsupported(format!(
            "symbolic {} allele '{}' describes a structural variant, which is not supported",
            name, allele
        )));
    }
    if allele.is_empty() {
        return Err(VariantError::invalid(format!("{} allele is empty", name)));
    }
    if let Some(bad) = allele
        .chars()
        .find(|c| !matches!(c, 'A' | 'C' | 'G' | 'T' | 'N'))
    {
        return Err(VariantError::invalid(format!(
            "{} allele '{}' contains '{}' (expected upper-case A, C, G, T or N)",
            name, allele, bad
        )));
    }
    Ok(())
}

/// Parse a `CHROM-POS-REF-ALT` string
///
/// A `chr` prefix on the chromosome is accepted and dropped.
///
/// ```
/// use hnf1b_variants::vcf::parse_vcf;
///
/// let v = parse_vcf("chr17-36459258-A-G").unwrap();
/// assert_eq!(v.to_string(), "17-36459258-A-G");
/// ```
pub fn parse_vcf(input: &str) -> Result<VcfVariant, VariantError> {
    let fields: Vec<&str> = input.trim().split('-').collect();
    if fields.len() != 4 {
        return Err(VariantError::invalid(format!(
            "VCF notation needs 4 hyphen-separated fields (CHROM-POS-REF-ALT), found {}",
            fields.len()
        )));
    }

    let chromosome = normalize_chromosome(fields[0]).ok_or_else(|| {
        VariantError::invalid(format!(
            "unknown chromosome '{}' (expected 1-22, X, Y or MT)",
            fields[0]
        ))
    })?;

    let position: u64 = fields[1].parse().map_err(|_| {
        VariantError::invalid(format!("position '{}' is not a positive integer", fields[1]))
    })?;
    if position == 0 {
        return Err(VariantError::invalid("VCF positions start at 1"));
    }

    let (reference, alternate) = (fields[2], fields[3]);
    check_allele("reference", reference)?;
    check_allele("alternate", alternate)?;
    if reference == alternate {
        return Err(VariantError::invalid(format!(
            "reference and alternate alleles are both '{}'",
            reference
        )));
    }

    Ok(VcfVariant::new(chromosome, position, reference, alternate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vcf() {
        let v = parse_vcf("17-36459258-A-G").unwrap();
        assert_eq!(v.chromosome, "17");
        assert_eq!(v.position, 36459258);
        assert!(v.is_snv());

        let v = parse_vcf("chrX-100-AT-A").unwrap();
        assert_eq!(v.chromosome, "X");
        assert!(!v.is_snv());
        assert_eq!(parse_vcf("chrM-73-A-G").unwrap().chromosome, "MT");
    }

    #[test]
    fn test_parse_vcf_errors() {
        assert!(parse_vcf("17-36459258-A").is_err());
        assert!(parse_vcf("17:36459258:A:G").is_err());
        assert!(parse_vcf("30-100-A-G").is_err());
        assert!(parse_vcf("17-0-A-G").is_err());
        assert!(parse_vcf("17-abc-A-G").is_err());
        assert!(parse_vcf("17-100-a-g").is_err());
        assert!(parse_vcf("17-100-A-A").is_err());
    }

    #[test]
    fn test_symbolic_allele_unsupported() {
        let err = parse_vcf("17-36459258-A-<DEL>").unwrap_err();
        assert!(matches!(err, VariantError::UnsupportedConversion { .. }));
    }
}
