//! Reference assemblies and chromosome accessions
//!
//! Maps bare chromosome names (`17`, `chrX`, `MT`) to the RefSeq chromosome
//! accessions used in genomic HGVS and SPDI (`NC_000017.11`), per assembly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;

/// Reference genome assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenomeBuild {
    /// GRCh37 / hg19
    GRCh37,
    /// GRCh38 / hg38
    #[default]
    GRCh38,
}

impl GenomeBuild {
    /// All supported assemblies
    pub fn all() -> &'static [GenomeBuild] {
        &[GenomeBuild::GRCh37, GenomeBuild::GRCh38]
    }

    /// RefSeq accession of a chromosome in this assembly
    ///
    /// Accepts `17`, `chr17`, `X`, `chrM`, `MT`.
    pub fn chromosome_accession(&self, chromosome: &str) -> Option<&'static str> {
        let name = normalize_chromosome(chromosome)?;
        CHROMOSOMES
            .iter()
            .find(|(chrom, ..)| *chrom == name)
            .map(|(_, grch37, grch38, _, _)| match self {
                GenomeBuild::GRCh37 => *grch37,
                GenomeBuild::GRCh38 => *grch38,
            })
    }

    /// Length in bases of a chromosome in this assembly
    pub fn chromosome_length(&self, chromosome: &str) -> Option<u64> {
        let name = normalize_chromosome(chromosome)?;
        CHROMOSOMES
            .iter()
            .find(|(chrom, ..)| *chrom == name)
            .map(|(_, _, _, grch37, grch38)| match self {
                GenomeBuild::GRCh37 => *grch37,
                GenomeBuild::GRCh38 => *grch38,
            })
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeBuild::GRCh37 => write!(f, "GRCh37"),
            GenomeBuild::GRCh38 => write!(f, "GRCh38"),
        }
    }
}

impl FromStr for GenomeBuild {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grch37" | "hg19" | "37" => Ok(GenomeBuild::GRCh37),
            "grch38" | "hg38" | "38" => Ok(GenomeBuild::GRCh38),
            other => Err(VariantError::Config {
                msg: format!("unknown genome build '{}' (expected GRCh37 or GRCh38)", other),
            }),
        }
    }
}

/// (chromosome, GRCh37 accession, GRCh38 accession, GRCh37 length, GRCh38 length)
const CHROMOSOMES: [(&str, &str, &str, u64, u64); 25] = [
    ("1", "NC_000001.10", "NC_000001.11", 249_250_621, 248_956_422),
    ("2", "NC_000002.11", "NC_000002.12", 243_199_373, 242_193_529),
    ("3", "NC_000003.11", "NC_000003.12", 198_022_430, 198_295_559),
    ("4", "NC_000004.11", "NC_000004.12", 191_154_276, 190_214_555),
    ("5", "NC_000005.9", "NC_000005.10", 180_915_260, 181_538_259),
    ("6", "NC_000006.11", "NC_000006.12", 171_115_067, 170_805_979),
    ("7", "NC_000007.13", "NC_000007.14", 159_138_663, 159_345_973),
    ("8", "NC_000008.10", "NC_000008.11", 146_364_022, 145_138_636),
    ("9", "NC_000009.11", "NC_000009.12", 141_213_431, 138_394_717),
    ("10", "NC_000010.10", "NC_000010.11", 135_534_747, 133_797_422),
    ("11", "NC_000011.9", "NC_000011.10", 135_006_516, 135_086_622),
    ("12", "NC_000012.11", "NC_000012.12", 133_851_895, 133_275_309),
    ("13", "NC_000013.10", "NC_000013.11", 115_169_878, 114_364_328),
    ("14", "NC_000014.8", "NC_000014.9", 107_349_540, 107_043_718),
    ("15", "NC_000015.9", "NC_000015.10", 102_531_392, 101_991_189),
    ("16", "NC_000016.9", "NC_000016.10", 90_354_753, 90_338_345),
    ("17", "NC_000017.10", "NC_000017.11", 81_195_210, 83_257_441),
    ("18", "NC_000018.9", "NC_000018.10", 78_077_248, 80_373_285),
    ("19", "NC_000019.9", "NC_000019.10", 59_128_983, 58_617_616),
    ("20", "NC_000020.10", "NC_000020.11", 63_025_520, 64_444_167),
    ("21", "NC_000021.8", "NC_000021.9", 48_129_895, 46_709_983),
    ("22", "NC_000022.10", "NC_000022.11", 51_304_566, 50_818_468),
    ("X", "NC_000023.10", "NC_000023.11", 155_270_560, 156_040_895),
    ("Y", "NC_000024.9", "NC_000024.10", 59_373_566, 57_227_415),
    ("MT", "NC_012920.1", "NC_012920.1", 16_569, 16_569),
];

/// Normalize a chromosome name to its bare form (`chr17` -> `17`, `M` -> `MT`)
///
/// Returns `None` for names outside 1-22, X, Y, MT.
pub fn normalize_chromosome(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix("chr")
        .or_else(|| trimmed.strip_prefix("CHR"))
        .or_else(|| trimmed.strip_prefix("Chr"))
        .unwrap_or(trimmed);
    let name = match bare.to_ascii_uppercase().as_str() {
        "M" | "MT" => "MT".to_string(),
        "23" => "X".to_string(),
        "24" => "Y".to_string(),
        other => other.to_string(),
    };
    if CHROMOSOMES.iter().any(|(chrom, ..)| *chrom == name) {
        Some(name)
    } else {
        None
    }
}

/// Resolve a RefSeq chromosome accession to its chromosome and assembly
///
/// The mitochondrial accession is shared by both assemblies; `preferred`
/// decides which one is reported for it.
pub fn chromosome_for_accession(
    accession: &str,
    preferred: GenomeBuild,
) -> Option<(String, GenomeBuild)> {
    for (chrom, grch37, grch38, _, _) in CHROMOSOMES.iter() {
        let in_37 = *grch37 == accession;
        let in_38 = *grch38 == accession;
        match (in_37, in_38) {
            (true, true) => return Some((chrom.to_string(), preferred)),
            (true, false) => return Some((chrom.to_string(), GenomeBuild::GRCh37)),
            (false, true) => return Some((chrom.to_string(), GenomeBuild::GRCh38)),
            (false, false) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        assert_eq!("GRCh38".parse::<GenomeBuild>().unwrap(), GenomeBuild::GRCh38);
        assert_eq!("hg19".parse::<GenomeBuild>().unwrap(), GenomeBuild::GRCh37);
        assert!("hg17".parse::<GenomeBuild>().is_err());
    }

    #[test]
    fn test_chromosome_length() {
        assert_eq!(GenomeBuild::GRCh38.chromosome_length("chr17"), Some(83_257_441));
        assert_eq!(GenomeBuild::GRCh37.chromosome_length("17"), Some(81_195_210));
        assert_eq!(GenomeBuild::GRCh38.chromosome_length("M"), Some(16_569));
        assert_eq!(GenomeBuild::GRCh38.chromosome_length("25"), None);
    }

    #[test]
    fn test_chromosome_accession() {
        assert_eq!(
            GenomeBuild::GRCh38.chromosome_accession("17"),
            Some("NC_000017.11")
        );
        assert_eq!(
            GenomeBuild::GRCh37.chromosome_accession("chr17"),
            Some("NC_000017.10")
        );
        assert_eq!(
            GenomeBuild::GRCh38.chromosome_accession("chrM"),
            Some("NC_012920.1")
        );
        assert_eq!(GenomeBuild::GRCh38.chromosome_accession("25"), None);
    }

    #[test]
    fn test_normalize_chromosome() {
        assert_eq!(normalize_chromosome("chrX").as_deref(), Some("X"));
        assert_eq!(normalize_chromosome("x").as_deref(), Some("X"));
        assert_eq!(normalize_chromosome("M").as_deref(), Some("MT"));
        assert_eq!(normalize_chromosome("chrUn"), None);
    }

    #[test]
    fn test_chromosome_for_accession() {
        assert_eq!(
            chromosome_for_accession("NC_000017.10", GenomeBuild::GRCh38),
            Some(("17".to_string(), GenomeBuild::GRCh37))
        );
        assert_eq!(
            chromosome_for_accession("NC_012920.1", GenomeBuild::GRCh37),
            Some(("MT".to_string(), GenomeBuild::GRCh37))
        );
        assert_eq!(chromosome_for_accession("NC_999999.1", GenomeBuild::GRCh38), None);
    }
}
