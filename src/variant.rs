//! Variant identifiers and their normalized genomic form
//!
//! [`VariantId`] is the parsed form of any supported notation. Resolving it
//! (see [`crate::recode::Recoder::resolve`]) yields a [`GenomicChange`],
//! whose [`CanonicalKey`] is shared by every notation of the same change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::hgvs::{parse_hgvs, CoordinateType, HgvsVariant};
use crate::notation::{classify, NotationKind};
use crate::reference::{normalize_chromosome, GenomeBuild};
use crate::rsid::{format_rsid, parse_rsid};
use crate::spdi::{parse_spdi, SpdiVariant};
use crate::vcf::{parse_vcf, VcfVariant};

/// A parsed variant in one of the supported notations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VariantId {
    /// `g.` or `m.` description
    HgvsGenomic(HgvsVariant),
    /// `c.` or `n.` description
    HgvsCoding(HgvsVariant),
    /// `p.` description
    HgvsProtein(HgvsVariant),
    Vcf(VcfVariant),
    RsId(u64),
    Spdi(SpdiVariant),
}

impl VariantId {
    /// Classify and parse a variant string
    ///
    /// ```
    /// use hnf1b_variants::variant::VariantId;
    ///
    /// let id = VariantId::parse("rs56116432").unwrap();
    /// assert_eq!(id.to_string(), "rs56116432");
    /// assert!(VariantId::parse("BRCA1 mutation").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, VariantError> {
        let input = input.trim();
        match classify(input) {
            NotationKind::Hgvs => Ok(Self::from(parse_hgvs(input)?)),
            NotationKind::Vcf => Ok(VariantId::Vcf(parse_vcf(input)?)),
            NotationKind::RsId => Ok(VariantId::RsId(parse_rsid(input)?)),
            NotationKind::Spdi => Ok(VariantId::Spdi(parse_spdi(input)?)),
            NotationKind::Unknown => Err(VariantError::invalid(format!(
                "'{}' is not a recognized variant notation (HGVS, VCF, rsID or SPDI)",
                input
            ))),
        }
    }

    /// Notation family
    pub fn kind(&self) -> NotationKind {
        match self {
            VariantId::HgvsGenomic(_) | VariantId::HgvsCoding(_) | VariantId::HgvsProtein(_) => {
                NotationKind::Hgvs
            }
            VariantId::Vcf(_) => NotationKind::Vcf,
            VariantId::RsId(_) => NotationKind::RsId,
            VariantId::Spdi(_) => NotationKind::Spdi,
        }
    }
}

impl From<HgvsVariant> for VariantId {
    fn from(variant: HgvsVariant) -> Self {
        match variant.coordinate {
            CoordinateType::Genomic | CoordinateType::Mitochondrial => {
                VariantId::HgvsGenomic(variant)
            }
            CoordinateType::Coding | CoordinateType::NonCoding => VariantId::HgvsCoding(variant),
            CoordinateType::Protein => VariantId::HgvsProtein(variant),
        }
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantId::HgvsGenomic(v) | VariantId::HgvsCoding(v) | VariantId::HgvsProtein(v) => {
                write!(f, "{}", v)
            }
            VariantId::Vcf(v) => write!(f, "{}", v),
            VariantId::RsId(n) => write!(f, "{}", format_rsid(*n)),
            VariantId::Spdi(v) => write!(f, "{}", v),
        }
    }
}

/// A variant identifier bound to the assembly it is interpreted in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssembledVariant {
    pub id: VariantId,
    pub assembly: GenomeBuild,
}

impl AssembledVariant {
    pub fn new(id: VariantId, assembly: GenomeBuild) -> Self {
        Self { id, assembly }
    }
}

/// A change on a chromosome in one assembly, in trimmed interbase form
///
/// `start` is the 0-based interbase position of the first deleted base (or
/// the insertion point). Bases shared by `deleted` and `inserted` are trimmed
/// from the end first, then from the start. Positions are never shifted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicChange {
    pub build: GenomeBuild,
    /// Bare chromosome name (e.g., "17")
    pub chromosome: String,
    /// RefSeq chromosome accession (e.g., "NC_000017.11")
    pub accession: String,
    pub start: u64,
    pub deleted: String,
    pub inserted: String,
}

impl GenomicChange {
    /// Build a trimmed change
    ///
    /// ```
    /// use hnf1b_variants::reference::GenomeBuild;
    /// use hnf1b_variants::variant::GenomicChange;
    ///
    /// // VCF 1-1046-GTC-G
    /// let change = GenomicChange::new(GenomeBuild::GRCh38, "chr1", 1045, "GTC", "G").unwrap();
    /// assert_eq!(change.start, 1046);
    /// assert_eq!(change.deleted, "TC");
    /// assert_eq!(change.inserted, "");
    /// ```
    pub fn new(
        build: GenomeBuild,
        chromosome: &str,
        start: u64,
        deleted: &str,
        inserted: &str,
    ) -> Result<Self, VariantError> {
        let chromosome = normalize_chromosome(chromosome).ok_or_else(|| {
            VariantError::invalid(format!("unknown chromosome '{}'", chromosome))
        })?;
        let accession = build
            .chromosome_accession(&chromosome)
            .ok_or_else(|| {
                VariantError::unsupported(format!(
                    "no {} accession for chromosome {}",
                    build, chromosome
                ))
            })?
            .to_string();

        let deleted = deleted.to_ascii_uppercase();
        let inserted = inserted.to_ascii_uppercase();
        if !deleted.chars().chain(inserted.chars()).all(|c| c.is_ascii_alphabetic()) {
            return Err(VariantError::invalid(format!(
                "alleles '{}' and '{}' must be nucleotide bases",
                deleted, inserted
            )));
        }
        if deleted == inserted {
            return Err(VariantError::invalid(format!(
                "'{}' replaced by '{}' describes no change",
                deleted, inserted
            )));
        }

        let length = build.chromosome_length(&chromosome).unwrap_or(u64::MAX);
        let within = start
            .checked_add(deleted.len() as u64)
            .is_some_and(|end| end <= length);
        if !within {
            return Err(VariantError::invalid(format!(
                "position {} runs past the end of chromosome {} ({} bases in {})",
                start.saturating_add(1),
                chromosome,
                length,
                build
            )));
        }

        let (del, ins) = (deleted.as_bytes(), inserted.as_bytes());
        let mut suffix = 0;
        while suffix < del.len()
            && suffix < ins.len()
            && del[del.len() - 1 - suffix] == ins[ins.len() - 1 - suffix]
        {
            suffix += 1;
        }
        let (del, ins) = (&del[..del.len() - suffix], &ins[..ins.len() - suffix]);
        let mut prefix = 0;
        while prefix < del.len() && prefix < ins.len() && del[prefix] == ins[prefix] {
            prefix += 1;
        }

        Ok(Self {
            build,
            chromosome,
            accession,
            start: start + prefix as u64,
            deleted: deleted[prefix..del.len()].to_string(),
            inserted: inserted[prefix..ins.len()].to_string(),
        })
    }

    /// 0-based exclusive end of the deleted span
    pub fn end(&self) -> u64 {
        self.start + self.deleted.len() as u64
    }

    pub fn is_insertion(&self) -> bool {
        self.deleted.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.inserted.is_empty()
    }

    /// Assembly-qualified SPDI key
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey(format!("{}:{}", self.build, self.to_spdi()))
    }

    pub fn to_spdi(&self) -> SpdiVariant {
        SpdiVariant::new(
            self.accession.clone(),
            self.start,
            self.deleted.clone(),
            self.inserted.clone(),
        )
    }
}

/// Cache key shared by all notations of one change
///
/// Format: `{assembly}:{chromosome accession}:{start}:{deleted}:{inserted}`,
/// e.g. `GRCh38:NC_000017.11:36459257:A:G`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
