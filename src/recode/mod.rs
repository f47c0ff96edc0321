//! Recoder: translate one variant into every notation it can be written in
//!
//! All inputs are first resolved to a [`GenomicChange`] in the requested
//! assembly; every output notation is then derived from that change, so
//! inputs that describe the same change produce the same recoding.

pub mod mapper;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::hgvs::{
    reverse_complement, CoordinateType, HgvsChange, HgvsInterval, HgvsPosition, HgvsVariant,
    NaEdit,
};
use crate::reference::{
    chromosome_for_accession, GenomeBuild, ReferenceProvider, ReferenceStore, Strand, Transcript,
};
use crate::rsid::{format_rsid, InMemoryRsIdLookup, RsIdLookup, RsIdResult};
use crate::variant::{AssembledVariant, CanonicalKey, GenomicChange, VariantId};
use crate::vcf::VcfVariant;

pub use mapper::CoordinateMapper;

/// Every notation derived for one input
///
/// Lists are empty when a notation cannot be derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recoding {
    pub input: String,
    pub assembly: GenomeBuild,
    pub id: Vec<String>,
    pub hgvsg: Vec<String>,
    pub hgvsc: Vec<String>,
    pub hgvsp: Vec<String>,
    pub vcf_string: Vec<String>,
    pub spdi: Vec<String>,
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

impl Recoding {
    fn merge(&mut self, other: Recoding) {
        extend_unique(&mut self.id, other.id);
        extend_unique(&mut self.hgvsg, other.hgvsg);
        extend_unique(&mut self.hgvsc, other.hgvsc);
        extend_unique(&mut self.hgvsp, other.hgvsp);
        extend_unique(&mut self.vcf_string, other.vcf_string);
        extend_unique(&mut self.spdi, other.spdi);
    }
}

/// Recoder over a reference provider and a dbSNP lookup
#[derive(Clone)]
pub struct Recoder {
    reference: Arc<dyn ReferenceProvider>,
    rsids: Arc<dyn RsIdLookup>,
}

impl Recoder {
    pub fn new(reference: Arc<dyn ReferenceProvider>, rsids: Arc<dyn RsIdLookup>) -> Self {
        Self { reference, rsids }
    }

    /// Recoder over the synthetic test fixtures
    pub fn with_test_data() -> Self {
        Self::new(
            Arc::new(ReferenceStore::with_test_data()),
            Arc::new(InMemoryRsIdLookup::with_test_data()),
        )
    }

    pub fn reference(&self) -> &Arc<dyn ReferenceProvider> {
        &self.reference
    }

    /// Resolve to the genomic change the variant describes
    ///
    /// rsIDs with several alternate alleles have no single change and are
    /// rejected; use [`Recoder::resolve_all`] for them.
    pub fn resolve(&self, variant: &AssembledVariant) -> Result<GenomicChange, VariantError> {
        let mut changes = self.resolve_all(variant)?;
        if changes.len() > 1 {
            return Err(VariantError::unsupported(format!(
                "{} has {} alternate alleles; use one of its VCF notations",
                variant.id,
                changes.len()
            )));
        }
        changes
            .pop()
            .ok_or_else(|| VariantError::not_found(format!("{} has no alleles", variant.id)))
    }

    /// Resolve to one genomic change per allele
    pub fn resolve_all(
        &self,
        variant: &AssembledVariant,
    ) -> Result<Vec<GenomicChange>, VariantError> {
        let build = variant.assembly;
        match &variant.id {
            VariantId::RsId(n) => self
                .rsids
                .lookup(&format_rsid(*n), build)?
                .iter()
                .map(RsIdResult::genomic_change)
                .collect(),
            VariantId::HgvsGenomic(v) => match self.curated_changes(v, build)? {
                Some(changes) => Ok(changes),
                None => Ok(vec![self.resolve_genomic_hgvs(v, build)?]),
            },
            VariantId::HgvsCoding(v) => match self.curated_changes(v, build)? {
                Some(changes) => Ok(changes),
                None => Ok(vec![self.resolve_transcript_hgvs(v, build)?]),
            },
            VariantId::HgvsProtein(v) => Err(VariantError::unsupported(format!(
                "protein change {} cannot be mapped back to the genome",
                v
            ))),
            VariantId::Vcf(v) => Ok(vec![GenomicChange::new(
                build,
                &v.chromosome,
                v.position.saturating_sub(1),
                &v.reference,
                &v.alternate,
            )?]),
            VariantId::Spdi(v) => {
                let chromosome = chromosome_in_build(&v.sequence, build)?;
                Ok(vec![GenomicChange::new(
                    build,
                    &chromosome,
                    v.position,
                    &v.deletion,
                    &v.insertion,
                )?])
            }
        }
    }

    /// Canonical key of the change the variant describes
    pub fn canonical_key(&self, variant: &AssembledVariant) -> Result<CanonicalKey, VariantError> {
        Ok(self.resolve(variant)?.canonical_key())
    }

    /// Recode a variant into all derivable notations
    pub fn recode(&self, variant: &AssembledVariant) -> Result<Recoding, VariantError> {
        let mut recoding = Recoding {
            input: variant.id.to_string(),
            assembly: variant.assembly,
            ..Default::default()
        };

        if let VariantId::RsId(n) = &variant.id {
            let rsid = format_rsid(*n);
            for record in self.rsids.lookup(&rsid, variant.assembly)? {
                let change = record.genomic_change()?;
                let mut block = self.describe(&change);
                apply_curated(&mut block, &record);
                block.id.retain(|id| *id != rsid);
                block.id.insert(0, rsid.clone());
                recoding.merge(block);
            }
            return Ok(recoding);
        }

        let change = self.resolve(variant)?;
        recoding.merge(self.describe(&change));
        Ok(recoding)
    }

    /// All notations computable from a change
    fn describe(&self, change: &GenomicChange) -> Recoding {
        let mut block = Recoding {
            id: self.rsids.rsids_for(change),
            hgvsg: vec![genomic_hgvs(change).to_string()],
            spdi: vec![change.to_spdi().to_string()],
            ..Default::default()
        };
        match self.vcf_for(change) {
            Ok(vcf) => block.vcf_string.push(vcf.to_string()),
            Err(e) => tracing::debug!("no VCF notation for {}: {}", change.canonical_key(), e),
        }

        let (first, last) = affected_span(change);
        for transcript in self.reference.overlapping_transcripts(
            change.build,
            &change.chromosome,
            first,
            last,
        ) {
            match transcript_hgvs(&transcript, change) {
                Ok(hgvs) => block.hgvsc.push(hgvs.to_string()),
                Err(e) => tracing::debug!(
                    "no {} notation for {}: {}",
                    transcript.id,
                    change.canonical_key(),
                    e
                ),
            }
        }
        for record in self.rsids.records_for(change) {
            apply_curated(&mut block, &record);
        }
        block
    }

    /// Changes of the dbSNP alleles that curate this exact expression
    ///
    /// Curated expressions resolve to the dbSNP allele rather than through
    /// the transcript model, so every notation of a known variant shares its
    /// key.
    fn curated_changes(
        &self,
        variant: &HgvsVariant,
        build: GenomeBuild,
    ) -> Result<Option<Vec<GenomicChange>>, VariantError> {
        let records = self.rsids.lookup_hgvs(&variant.to_string(), build);
        if records.is_empty() {
            return Ok(None);
        }
        let mut changes = Vec::with_capacity(records.len());
        for record in &records {
            let change = record.genomic_change()?;
            if !changes.contains(&change) {
                changes.push(change);
            }
        }
        Ok(Some(changes))
    }

    /// VCF notation; pure insertions and deletions need the preceding base
    fn vcf_for(&self, change: &GenomicChange) -> Result<VcfVariant, VariantError> {
        if !change.deleted.is_empty() && !change.inserted.is_empty() {
            return Ok(VcfVariant::new(
                change.chromosome.clone(),
                change.start + 1,
                change.deleted.clone(),
                change.inserted.clone(),
            ));
        }
        if change.start == 0 {
            return Err(VariantError::unsupported("no anchor base before position 1"));
        }
        let anchor = self.reference.get_genomic_sequence(
            change.build,
            &change.chromosome,
            change.start - 1,
            change.start,
        )?;
        Ok(VcfVariant::new(
            change.chromosome.clone(),
            change.start,
            format!("{}{}", anchor, change.deleted),
            format!("{}{}", anchor, change.inserted),
        ))
    }

    fn resolve_genomic_hgvs(
        &self,
        variant: &HgvsVariant,
        build: GenomeBuild,
    ) -> Result<GenomicChange, VariantError> {
        let chromosome = chromosome_in_build(&variant.accession, build)?;
        let (interval, edit) = nucleotide(variant)?;
        let low = interval.start.base as u64;
        let high = interval.last().base as u64;
        self.apply_edit(build, &chromosome, low, high, edit, Strand::Plus)
    }

    fn resolve_transcript_hgvs(
        &self,
        variant: &HgvsVariant,
        build: GenomeBuild,
    ) -> Result<GenomicChange, VariantError> {
        let transcript = self.transcript(&variant.accession, build)?;
        if variant.coordinate == CoordinateType::Coding && !transcript.is_coding() {
            return Err(VariantError::unsupported(format!(
                "{} is non-coding; use n. coordinates",
                transcript.id
            )));
        }
        let (interval, edit) = nucleotide(variant)?;
        let mapper = CoordinateMapper::new(&transcript);
        let a = mapper.to_genomic(&interval.start)?;
        let b = mapper.to_genomic(&interval.last())?;
        let (low, high) = (a.min(b), a.max(b));
        let reversed = match transcript.strand {
            Strand::Plus => a > b,
            Strand::Minus => a < b,
        };
        if reversed {
            return Err(VariantError::invalid(format!(
                "range {} is reversed",
                interval
            )));
        }
        self.apply_edit(
            build,
            &transcript.chromosome,
            low,
            high,
            edit,
            transcript.strand,
        )
    }

    fn transcript(&self, accession: &str, build: GenomeBuild) -> Result<Transcript, VariantError> {
        self.reference
            .get_transcript(accession, build)
            .map_err(|_| {
                let base = accession.split('.').next().unwrap_or(accession);
                let known = self.reference.transcript_versions(base, build);
                if known.is_empty() {
                    VariantError::unsupported(format!(
                        "transcript {} is not available for {}",
                        accession, build
                    ))
                } else {
                    VariantError::unsupported(format!(
                        "transcript {} is not available for {} (known versions: {})",
                        accession,
                        build,
                        known.join(", ")
                    ))
                }
            })
    }

    /// Reference bases `[low, high]` (1-based), for edits that do not state them
    fn fetch(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        low: u64,
        high: u64,
    ) -> Result<String, VariantError> {
        self.reference
            .get_genomic_sequence(build, chromosome, low - 1, high)
            .map_err(|_| {
                VariantError::unsupported(format!(
                    "{}:{}-{} bases are not stated and no reference sequence is available",
                    chromosome, low, high
                ))
            })
    }

    /// Apply an HGVS edit spanning genomic `[low, high]` (1-based)
    ///
    /// Bases from a minus-strand transcript are reverse-complemented.
    fn apply_edit(
        &self,
        build: GenomeBuild,
        chromosome: &str,
        low: u64,
        high: u64,
        edit: &NaEdit,
        strand: Strand,
    ) -> Result<GenomicChange, VariantError> {
        let orient = |bases: &str| match strand {
            Strand::Plus => bases.to_string(),
            Strand::Minus => reverse_complement(bases),
        };
        let span = (high - low + 1) as usize;
        let reference_bases = |stated: &Option<String>| -> Result<String, VariantError> {
            match stated {
                Some(bases) if bases.len() != span => Err(VariantError::invalid(format!(
                    "stated sequence '{}' has length {} but the range covers {} bases",
                    bases,
                    bases.len(),
                    span
                ))),
                Some(bases) => Ok(orient(bases)),
                None => self.fetch(build, chromosome, low, high),
            }
        };

        match edit {
            NaEdit::Substitution {
                reference,
                alternative,
            } => GenomicChange::new(
                build,
                chromosome,
                low - 1,
                &orient(reference),
                &orient(alternative),
            ),
            NaEdit::Deletion { deleted } => {
                let bases = reference_bases(deleted)?;
                GenomicChange::new(build, chromosome, low - 1, &bases, "")
            }
            NaEdit::Duplication { duplicated } => {
                let bases = reference_bases(duplicated)?;
                GenomicChange::new(build, chromosome, high, "", &bases)
            }
            NaEdit::Insertion { inserted } => {
                if high != low + 1 {
                    return Err(VariantError::invalid(format!(
                        "insertion flanks map to {}:{} and {}, which are not adjacent",
                        chromosome, low, high
                    )));
                }
                GenomicChange::new(build, chromosome, low, "", &orient(inserted))
            }
            NaEdit::Delins { deleted, inserted } => {
                let bases = reference_bases(deleted)?;
                GenomicChange::new(build, chromosome, low - 1, &bases, &orient(inserted))
            }
        }
    }
}

/// Let curated dbSNP expressions replace computed ones on the same sequence
fn apply_curated(block: &mut Recoding, record: &RsIdResult) {
    let curated = |coordinates: &[char]| -> Vec<String> {
        coordinates
            .iter()
            .flat_map(|c| record.curated_hgvs(*c))
            .map(str::to_string)
            .collect()
    };
    let hgvsg = curated(&['g', 'm']);
    if !hgvsg.is_empty() {
        block.hgvsg = hgvsg;
    }
    let mut hgvsc = curated(&['c', 'n']);
    if !hgvsc.is_empty() {
        let computed = std::mem::take(&mut block.hgvsc)
            .into_iter()
            .filter(|c| !hgvsc.iter().any(|h| sequence_of(h) == sequence_of(c)))
            .collect();
        extend_unique(&mut hgvsc, computed);
        block.hgvsc = hgvsc;
    }
    extend_unique(&mut block.hgvsp, curated(&['p']));
}

fn sequence_of(hgvs: &str) -> &str {
    hgvs.split(':').next().unwrap_or(hgvs)
}

fn nucleotide(variant: &HgvsVariant) -> Result<(&HgvsInterval, &NaEdit), VariantError> {
    variant.nucleotide().ok_or_else(|| {
        VariantError::unsupported(format!("{} has no nucleotide change", variant))
    })
}

/// Chromosome of a RefSeq chromosome accession, which must belong to `build`
fn chromosome_in_build(accession: &str, build: GenomeBuild) -> Result<String, VariantError> {
    let (chromosome, accession_build) =
        chromosome_for_accession(accession, build).ok_or_else(|| {
            VariantError::unsupported(format!(
                "{} is not a GRCh37/GRCh38 chromosome accession",
                accession
            ))
        })?;
    if accession_build != build {
        return Err(VariantError::unsupported(format!(
            "{} belongs to {} but {} was requested",
            accession, accession_build, build
        )));
    }
    Ok(chromosome)
}

/// First and last 1-based positions touched; an insertion touches both flanks
fn affected_span(change: &GenomicChange) -> (u64, u64) {
    if change.is_insertion() {
        (change.start, change.start + 1)
    } else {
        (change.start + 1, change.end())
    }
}

/// Edit and 1-based `[first, last]` positions on the forward strand
fn forward_edit(change: &GenomicChange) -> (NaEdit, u64, u64) {
    let (first, last) = affected_span(change);
    let edit = if change.is_insertion() {
        NaEdit::Insertion {
            inserted: change.inserted.clone(),
        }
    } else if change.is_deletion() {
        NaEdit::Deletion { deleted: None }
    } else if change.deleted.len() == 1 && change.inserted.len() == 1 {
        NaEdit::Substitution {
            reference: change.deleted.clone(),
            alternative: change.inserted.clone(),
        }
    } else {
        NaEdit::Delins {
            deleted: None,
            inserted: change.inserted.clone(),
        }
    };
    (edit, first, last)
}

fn genomic_hgvs(change: &GenomicChange) -> HgvsVariant {
    let (edit, first, last) = forward_edit(change);
    let coordinate = if change.chromosome == "MT" {
        CoordinateType::Mitochondrial
    } else {
        CoordinateType::Genomic
    };
    HgvsVariant {
        accession: change.accession.clone(),
        coordinate,
        change: HgvsChange::Nucleotide {
            interval: HgvsInterval::range(
                HgvsPosition::new(first as i64),
                HgvsPosition::new(last as i64),
            ),
            edit,
        },
    }
}

/// Express a change on one transcript
fn transcript_hgvs(
    transcript: &Transcript,
    change: &GenomicChange,
) -> Result<HgvsVariant, VariantError> {
    let mapper = CoordinateMapper::new(transcript);
    let (edit, first, last) = forward_edit(change);
    let (first, last) = (mapper.from_genomic(first)?, mapper.from_genomic(last)?);

    let (edit, interval) = match transcript.strand {
        Strand::Plus => (edit, HgvsInterval::range(first, last)),
        Strand::Minus => {
            let edit = match edit {
                NaEdit::Substitution {
                    reference,
                    alternative,
                } => NaEdit::Substitution {
                    reference: reverse_complement(&reference),
                    alternative: reverse_complement(&alternative),
                },
                NaEdit::Insertion { inserted } => NaEdit::Insertion {
                    inserted: reverse_complement(&inserted),
                },
                NaEdit::Delins { deleted, inserted } => NaEdit::Delins {
                    deleted,
                    inserted: reverse_complement(&inserted),
                },
                other => other,
            };
            (edit, HgvsInterval::range(last, first))
        }
    };

    let coordinate = if transcript.is_coding() {
        CoordinateType::Coding
    } else {
        CoordinateType::NonCoding
    };
    Ok(HgvsVariant {
        accession: transcript.id.clone(),
        coordinate,
        change: HgvsChange::Nucleotide { interval, edit },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::parse_variant;

    fn assembled(input: &str) -> AssembledVariant {
        AssembledVariant::new(parse_variant(input).unwrap(), GenomeBuild::GRCh38)
    }

    #[test]
    fn test_rsid_uses_curated_hgvs() {
        let recoder = Recoder::with_test_data();
        let recoding = recoder.recode(&assembled("rs56116432")).unwrap();
        assert_eq!(recoding.id, vec!["rs56116432"]);
        assert_eq!(recoding.hgvsc, vec!["NM_000458.4:c.544+1G>A"]);
        assert_eq!(recoding.hgvsp, vec!["NP_000449.1:p.?"]);
        assert_eq!(recoding.vcf_string, vec!["17-36459258-A-G"]);
        assert_eq!(recoding.spdi, vec!["NC_000017.11:36459257:A:G"]);
    }

    #[test]
    fn test_minus_strand_coding_to_genomic() {
        let recoder = Recoder::with_test_data();
        let change = recoder
            .resolve(&assembled("NM_000458.4:c.544+2T>C"))
            .unwrap();
        assert_eq!(change.start, 36459256);
        assert_eq!((change.deleted.as_str(), change.inserted.as_str()), ("A", "G"));
    }

    #[test]
    fn test_curated_expression_resolves_to_dbsnp_allele() {
        let recoder = Recoder::with_test_data();
        let change = recoder
            .resolve(&assembled("NM_000458.4:c.544+1G>A"))
            .unwrap();
        assert_eq!(change.start, 36459257);
        assert_eq!((change.deleted.as_str(), change.inserted.as_str()), ("A", "G"));

        let recoding = recoder.recode(&assembled("NM_000458.4:c.544+1G>A")).unwrap();
        assert_eq!(recoding.id, vec!["rs56116432"]);
        assert_eq!(recoding.vcf_string, vec!["17-36459258-A-G"]);
    }

    #[test]
    fn test_vcf_of_curated_allele_uses_curated_hgvs() {
        let recoder = Recoder::with_test_data();
        let recoding = recoder.recode(&assembled("17-36459258-A-G")).unwrap();
        assert_eq!(recoding.id, vec!["rs56116432"]);
        assert_eq!(recoding.hgvsg, vec!["NC_000017.11:g.36459258A>G"]);
        assert_eq!(recoding.hgvsc, vec!["NM_000458.4:c.544+1G>A"]);
        assert_eq!(recoding.hgvsp, vec!["NP_000449.1:p.?"]);
    }

    #[test]
    fn test_vcf_recodes_to_transcript() {
        let recoder = Recoder::with_test_data();
        let recoding = recoder.recode(&assembled("1-1050-G-A")).unwrap();
        assert_eq!(recoding.id, vec!["rs999000001"]);
        assert_eq!(recoding.hgvsg, vec!["NC_000001.11:g.1050G>A"]);
        assert_eq!(recoding.hgvsc, vec!["NM_999999.1:c.30G>A"]);
        assert!(recoding.hgvsp.is_empty());
    }

    #[test]
    fn test_deletion_needs_anchor() {
        let recoder = Recoder::with_test_data();
        let recoding = recoder.recode(&assembled("rs999000002")).unwrap();
        assert_eq!(recoding.vcf_string, vec!["1-1046-GTC-G"]);
        assert_eq!(recoding.hgvsg, vec!["NC_000001.11:g.1047_1048del"]);
        assert_eq!(recoding.hgvsc, vec!["NM_999999.1:c.27_28del"]);
    }

    #[test]
    fn test_unstated_deletion_fetches_sequence() {
        let recoder = Recoder::with_test_data();
        let change = recoder
            .resolve(&assembled("NM_999999.1:c.27_28del"))
            .unwrap();
        assert_eq!(change.deleted, "TC");
        let missing = recoder.resolve(&assembled("NC_000001.11:g.5000_5001del"));
        assert!(matches!(
            missing,
            Err(VariantError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_multiallelic_rsid() {
        let recoder = Recoder::with_test_data();
        let variant = assembled("rs999000001");
        let recoding = recoder.recode(&variant).unwrap();
        assert_eq!(recoding.vcf_string, vec!["1-1050-G-A", "1-1050-G-T"]);
        assert_eq!(recoding.id, vec!["rs999000001"]);
        assert!(recoder.resolve(&variant).is_err());
        assert_eq!(recoder.resolve_all(&variant).unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_inputs() {
        let recoder = Recoder::with_test_data();
        for input in [
            "NP_000449.1:p.Arg137Trp",
            "NM_000458.3:c.544+1G>A",
            "NC_000017.10:g.36459258A>G",
            "NM_999999.1:c.50+2T>A",
        ] {
            let err = recoder.recode(&assembled(input)).unwrap_err();
            assert!(
                matches!(err, VariantError::UnsupportedConversion { .. }),
                "{}: {}",
                input,
                err
            );
        }
        assert!(matches!(
            recoder.recode(&assembled("rs1")),
            Err(VariantError::NotFound { .. })
        ));
    }

    #[test]
    fn test_version_hint() {
        let recoder = Recoder::with_test_data();
        let err = recoder
            .recode(&assembled("NM_000458.3:c.544+1G>A"))
            .unwrap_err();
        assert!(err.to_string().contains("NM_000458.4"));
    }
}
