//! rsID/dbSNP lookup
//!
//! Traits and an in-memory implementation for resolving dbSNP rsIDs to
//! genomic alleles, together with any HGVS expressions curated on the record.
//!
//! # Example
//!
//! ```
//! use hnf1b_variants::rsid::{format_rsid, parse_rsid};
//!
//! let rsid_num = parse_rsid("rs56116432").unwrap();
//! assert_eq!(rsid_num, 56116432);
//! assert_eq!(format_rsid(rsid_num), "rs56116432");
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::GenomeBuild;
use crate::variant::GenomicChange;

/// One allele of a dbSNP record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsIdResult {
    /// rsID (e.g., "rs56116432")
    pub rsid: String,
    /// Chromosome/contig (e.g., "chr17" or "17")
    pub contig: String,
    /// 1-based position, VCF convention
    pub position: u64,
    /// Reference allele
    pub reference: String,
    /// Alternate allele
    pub alternate: String,
    /// Genome build
    pub build: GenomeBuild,
    /// Curated HGVS expressions for this allele (g., c. and p.)
    #[serde(default)]
    pub hgvs: Vec<String>,
    /// Allele frequency if available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allele_frequency: Option<f64>,
}

impl RsIdResult {
    /// Trimmed genomic change of this allele
    pub fn genomic_change(&self) -> Result<GenomicChange, VariantError> {
        GenomicChange::new(
            self.build,
            &self.contig,
            self.position.saturating_sub(1),
            &self.reference,
            &self.alternate,
        )
    }

    /// Create a new rsID result
    pub fn new(
        rsid: String,
        contig: String,
        position: u64,
        reference: String,
        alternate: String,
        build: GenomeBuild,
    ) -> Self {
        Self {
            rsid,
            contig,
            position,
            reference,
            alternate,
            build,
            hgvs: Vec::new(),
            allele_frequency: None,
        }
    }

    /// Curated HGVS expressions with the given coordinate type (`'g'`, `'c'`, `'p'`...)
    pub fn curated_hgvs(&self, coordinate: char) -> impl Iterator<Item = &str> {
        let marker = format!(":{}.", coordinate);
        self.hgvs
            .iter()
            .map(String::as_str)
            .filter(move |h| h.contains(&marker))
    }
}

/// Trait for rsID lookup implementations
pub trait RsIdLookup: Send + Sync {
    /// Look up an rsID in one assembly; one result per alternate allele
    fn lookup(&self, rsid: &str, build: GenomeBuild) -> Result<Vec<RsIdResult>, VariantError>;

    /// Check if rsID exists in any assembly
    fn contains(&self, rsid: &str) -> bool;

    /// Alleles whose curated HGVS includes `hgvs` exactly
    fn lookup_hgvs(&self, hgvs: &str, build: GenomeBuild) -> Vec<RsIdResult> {
        let _ = (hgvs, build);
        Vec::new()
    }

    /// Alleles that are the given change
    fn records_for(&self, change: &GenomicChange) -> Vec<RsIdResult> {
        let _ = change;
        Vec::new()
    }

    /// rsIDs whose allele is the given change, sorted
    fn rsids_for(&self, change: &GenomicChange) -> Vec<String> {
        let mut found: Vec<String> = self
            .records_for(change)
            .iter()
            .filter_map(|r| parse_rsid(&r.rsid).ok().map(format_rsid))
            .collect();
        found.sort();
        found.dedup();
        found
    }
}

/// Parse rsID string to numeric value
///
/// Accepts "rs56116432", "RS56116432" or "56116432".
pub fn parse_rsid(rsid: &str) -> Result<u64, VariantError> {
    let trimmed = rsid.trim();
    let digits = trimmed
        .strip_prefix("rs")
        .or_else(|| trimmed.strip_prefix("RS"))
        .or_else(|| trimmed.strip_prefix("Rs"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VariantError::invalid(format!(
            "invalid rsID '{}' (expected 'rs' followed by digits)",
            rsid
        )));
    }
    digits
        .parse()
        .map_err(|_| VariantError::invalid(format!("rsID '{}' is out of range", rsid)))
}

/// Format numeric rsID to string with "rs" prefix
pub fn format_rsid(rsid_num: u64) -> String {
    format!("rs{}", rsid_num)
}

/// In-memory rsID lookup
#[derive(Debug, Clone, Default)]
pub struct InMemoryRsIdLookup {
    entries: HashMap<u64, Vec<RsIdResult>>,
    /// Curated HGVS expression to the alleles carrying it
    curated: HashMap<String, Vec<RsIdResult>>,
}

impl InMemoryRsIdLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a JSON array of [`RsIdResult`]
    pub fn from_json(path: &Path) -> Result<Self, VariantError> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<RsIdResult> = serde_json::from_str(&content)?;
        let mut lookup = Self::new();
        for record in records {
            lookup.add(record)?;
        }
        Ok(lookup)
    }

    /// Add an rsID entry
    pub fn add(&mut self, result: RsIdResult) -> Result<(), VariantError> {
        let rsid_num = parse_rsid(&result.rsid)?;
        for hgvs in &result.hgvs {
            self.curated
                .entry(hgvs.clone())
                .or_default()
                .push(result.clone());
        }
        self.entries.entry(rsid_num).or_default().push(result);
        Ok(())
    }

    /// Number of alleles held
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup with the records used across the test suite
    ///
    /// - `rs56116432`: the HNF1B splice donor variant with curated HGVS
    /// - `rs999000001`: a multi-allelic SNV on the synthetic chr1 transcript
    /// - `rs999000002`: a two-base deletion on the synthetic chr1 transcript
    pub fn with_test_data() -> Self {
        let mut lookup = Self::new();
        let mut records = Vec::new();

        let mut hnf1b = RsIdResult::new(
            "rs56116432".to_string(),
            "chr17".to_string(),
            36459258,
            "A".to_string(),
            "G".to_string(),
            GenomeBuild::GRCh38,
        );
        hnf1b.hgvs = vec![
            "NC_000017.11:g.36459258A>G".to_string(),
            "NM_000458.4:c.544+1G>A".to_string(),
            "NP_000449.1:p.?".to_string(),
        ];
        hnf1b.allele_frequency = Some(0.00002);
        records.push(hnf1b);

        for alt in ["A", "T"] {
            records.push(RsIdResult::new(
                "rs999000001".to_string(),
                "chr1".to_string(),
                1050,
                "G".to_string(),
                alt.to_string(),
                GenomeBuild::GRCh38,
            ));
        }

        records.push(RsIdResult::new(
            "rs999000002".to_string(),
            "1".to_string(),
            1046,
            "GTC".to_string(),
            "G".to_string(),
            GenomeBuild::GRCh38,
        ));

        for record in records {
            if let Err(e) = lookup.add(record) {
                tracing::error!("invalid test rsID record: {}", e);
            }
        }
        lookup
    }
}

impl RsIdLookup for InMemoryRsIdLookup {
    fn lookup(&self, rsid: &str, build: GenomeBuild) -> Result<Vec<RsIdResult>, VariantError> {
        let rsid_num = parse_rsid(rsid)?;
        let found: Vec<RsIdResult> = self
            .entries
            .get(&rsid_num)
            .map(|all| all.iter().filter(|r| r.build == build).cloned().collect())
            .unwrap_or_default();
        if found.is_empty() {
            return Err(VariantError::not_found(format!(
                "{} is not in dbSNP for {}",
                format_rsid(rsid_num),
                build
            )));
        }
        Ok(found)
    }

    fn contains(&self, rsid: &str) -> bool {
        parse_rsid(rsid)
            .map(|n| self.entries.contains_key(&n))
            .unwrap_or(false)
    }

    fn lookup_hgvs(&self, hgvs: &str, build: GenomeBuild) -> Vec<RsIdResult> {
        self.curated
            .get(hgvs)
            .map(|all| all.iter().filter(|r| r.build == build).cloned().collect())
            .unwrap_or_default()
    }

    fn records_for(&self, change: &GenomicChange) -> Vec<RsIdResult> {
        self.entries
            .values()
            .flatten()
            .filter(|r| {
                r.build == change.build && r.genomic_change().is_ok_and(|c| c == *change)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rsid() {
        assert_eq!(parse_rsid("rs56116432").unwrap(), 56116432);
        assert_eq!(parse_rsid("RS56116432").unwrap(), 56116432);
        assert_eq!(parse_rsid("56116432").unwrap(), 56116432);
        assert!(parse_rsid("rsABC").is_err());
        assert!(parse_rsid("rs").is_err());
        assert!(parse_rsid("rs99999999999999999999999").is_err());
    }

    #[test]
    fn test_in_memory_lookup() {
        let lookup = InMemoryRsIdLookup::with_test_data();
        assert_eq!(lookup.len(), 4);

        let results = lookup.lookup("rs56116432", GenomeBuild::GRCh38).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, 36459258);
        assert_eq!(
            results[0].curated_hgvs('c').collect::<Vec<_>>(),
            vec!["NM_000458.4:c.544+1G>A"]
        );

        assert_eq!(
            lookup.lookup("rs999000001", GenomeBuild::GRCh38).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_lookup_not_found() {
        let lookup = InMemoryRsIdLookup::with_test_data();
        let err = lookup.lookup("rs1", GenomeBuild::GRCh38).unwrap_err();
        assert!(matches!(err, VariantError::NotFound { .. }));
        // known rsID, but no record for the other assembly
        assert!(lookup.lookup("rs56116432", GenomeBuild::GRCh37).is_err());
    }

    #[test]
    fn test_rsids_for_change() {
        let lookup = InMemoryRsIdLookup::with_test_data();
        let change =
            GenomicChange::new(GenomeBuild::GRCh38, "17", 36459257, "A", "G").unwrap();
        assert_eq!(lookup.rsids_for(&change), vec!["rs56116432".to_string()]);
        let other = GenomicChange::new(GenomeBuild::GRCh38, "17", 36459257, "A", "T").unwrap();
        assert!(lookup.rsids_for(&other).is_empty());
    }

    #[test]
    fn test_lookup_curated_hgvs() {
        let lookup = InMemoryRsIdLookup::with_test_data();
        let found = lookup.lookup_hgvs("NM_000458.4:c.544+1G>A", GenomeBuild::GRCh38);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rsid, "rs56116432");
        assert!(lookup
            .lookup_hgvs("NM_000458.4:c.544+1G>A", GenomeBuild::GRCh37)
            .is_empty());
        assert!(lookup
            .lookup_hgvs("NM_000458.4:c.544+2T>C", GenomeBuild::GRCh38)
            .is_empty());
    }

    #[test]
    fn test_contains() {
        let lookup = InMemoryRsIdLookup::with_test_data();
        assert!(lookup.contains("rs56116432"));
        assert!(lookup.contains("56116432"));
        assert!(!lookup.contains("rs1"));
    }

    #[test]
    fn test_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbsnp.json");
        std::fs::write(
            &path,
            r#"[{"rsid": "rs5", "contig": "chr2", "position": 10, "reference": "A",
                 "alternate": "C", "build": "GRCh37"}]"#,
        )
        .unwrap();
        let lookup = InMemoryRsIdLookup::from_json(&path).unwrap();
        let found = lookup.lookup("rs5", GenomeBuild::GRCh37).unwrap();
        assert!(found[0].hgvs.is_empty());
    }
}
