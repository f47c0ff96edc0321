//! Coordinate mapper between transcript (`c.`/`n.`) and genomic positions
//!
//! | System | Basis | Notes |
//! |--------|-------|-------|
//! | Genomic | 1-based | chromosome position in the transcript's assembly |
//! | Transcript (tx) | 1-based | position along the spliced transcript |
//! | Coding (c.) | 1-based | no position 0; negative in the 5' UTR, `*N` in the 3' UTR |
//!
//! Intronic positions are written relative to the nearest exon boundary
//! (`c.544+1`, `c.545-2`).

use crate::error::VariantError;
use crate::hgvs::HgvsPosition;
use crate::reference::{Exon, Strand, Transcript};

/// Maps positions for one transcript
pub struct CoordinateMapper<'a> {
    transcript: &'a Transcript,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self { transcript }
    }

    fn fail(&self, msg: impl std::fmt::Display) -> VariantError {
        VariantError::unsupported(format!("{}: {}", self.transcript.id, msg))
    }

    /// HGVS position (ignoring any intronic offset) to transcript position
    pub fn hgvs_to_tx(&self, pos: &HgvsPosition) -> Result<u64, VariantError> {
        let tx = match (self.transcript.cds_start, self.transcript.cds_end) {
            (Some(cds_start), Some(cds_end)) => {
                if pos.utr3 {
                    (cds_end as i64).checked_add(pos.base)
                } else if pos.base < 0 {
                    (cds_start as i64).checked_add(pos.base)
                } else {
                    (cds_start as i64 - 1).checked_add(pos.base)
                }
            }
            _ => {
                if pos.utr3 {
                    return Err(self.fail("'*' positions need a coding transcript"));
                }
                Some(pos.base)
            }
        };
        match tx {
            Some(tx) if tx >= 1 && tx as u64 <= self.transcript.len() => Ok(tx as u64),
            _ => Err(self.fail(format!("position {} lies outside the transcript", pos))),
        }
    }

    /// Transcript position to HGVS position (offset 0)
    pub fn tx_to_hgvs(&self, tx: u64) -> HgvsPosition {
        let tx = tx as i64;
        match (self.transcript.cds_start, self.transcript.cds_end) {
            (Some(cds_start), Some(cds_end)) => {
                let (cds_start, cds_end) = (cds_start as i64, cds_end as i64);
                if tx < cds_start {
                    HgvsPosition::new(tx - cds_start)
                } else if tx > cds_end {
                    HgvsPosition::utr3(tx - cds_end, 0)
                } else {
                    HgvsPosition::new(tx - cds_start + 1)
                }
            }
            _ => HgvsPosition::new(tx),
        }
    }

    fn exon_index_for_tx(&self, tx: u64) -> Result<usize, VariantError> {
        self.transcript
            .exons
            .iter()
            .position(|e| e.contains_tx(tx))
            .ok_or_else(|| self.fail(format!("no exon covers transcript position {}", tx)))
    }

    fn exon_tx_to_genomic(&self, exon: &Exon, tx: u64) -> u64 {
        match self.transcript.strand {
            Strand::Plus => exon.genomic_start + (tx - exon.tx_start),
            Strand::Minus => exon.genomic_end - (tx - exon.tx_start),
        }
    }

    /// Transcript position to genomic position
    pub fn tx_to_genomic(&self, tx: u64) -> Result<u64, VariantError> {
        let exon = &self.transcript.exons[self.exon_index_for_tx(tx)?];
        Ok(self.exon_tx_to_genomic(exon, tx))
    }

    /// Number of intronic bases between two exons adjacent in transcript order
    fn intron_len(&self, upstream: &Exon, downstream: &Exon) -> u64 {
        match self.transcript.strand {
            Strand::Plus => downstream.genomic_start - upstream.genomic_end - 1,
            Strand::Minus => upstream.genomic_start - downstream.genomic_end - 1,
        }
    }

    /// HGVS position, including intronic offsets, to genomic position
    ///
    /// An offset must hang off the exon boundary it names: `+N` off the last
    /// base of an exon, `-N` off the first base, and stay inside the intron.
    pub fn to_genomic(&self, pos: &HgvsPosition) -> Result<u64, VariantError> {
        let tx = self.hgvs_to_tx(pos)?;
        let index = self.exon_index_for_tx(tx)?;
        let exons = &self.transcript.exons;
        let exon = &exons[index];
        let genomic = self.exon_tx_to_genomic(exon, tx);
        if pos.offset == 0 {
            return Ok(genomic);
        }

        let intron = if pos.offset > 0 {
            if tx != exon.tx_end || index + 1 == exons.len() {
                return Err(self.fail(format!(
                    "offset in {} does not start at an exon end",
                    pos
                )));
            }
            self.intron_len(exon, &exons[index + 1])
        } else {
            if tx != exon.tx_start || index == 0 {
                return Err(self.fail(format!(
                    "offset in {} does not start at an exon start",
                    pos
                )));
            }
            self.intron_len(&exons[index - 1], exon)
        };
        if pos.offset.unsigned_abs() > intron {
            return Err(self.fail(format!(
                "offset in {} runs past the {}-base intron",
                pos, intron
            )));
        }

        let shifted = match self.transcript.strand {
            Strand::Plus => genomic as i64 + pos.offset,
            Strand::Minus => genomic as i64 - pos.offset,
        };
        Ok(shifted as u64)
    }

    /// Genomic position to HGVS position
    ///
    /// Intronic positions are expressed from the nearer exon; a tie goes to
    /// the upstream exon (`+`).
    pub fn from_genomic(&self, genomic: u64) -> Result<HgvsPosition, VariantError> {
        let exons = &self.transcript.exons;
        let strand = self.transcript.strand;

        if let Some(exon) = exons.iter().find(|e| e.contains_genomic(genomic)) {
            let tx = match strand {
                Strand::Plus => exon.tx_start + (genomic - exon.genomic_start),
                Strand::Minus => exon.tx_start + (exon.genomic_end - genomic),
            };
            return Ok(self.tx_to_hgvs(tx));
        }

        for pair in exons.windows(2) {
            let (up, down) = (&pair[0], &pair[1]);
            let (dist_up, dist_down) = match strand {
                Strand::Plus if up.genomic_end < genomic && genomic < down.genomic_start => {
                    (genomic - up.genomic_end, down.genomic_start - genomic)
                }
                Strand::Minus if down.genomic_end < genomic && genomic < up.genomic_start => {
                    (up.genomic_start - genomic, genomic - down.genomic_end)
                }
                _ => continue,
            };
            let pos = if dist_up <= dist_down {
                let base = self.tx_to_hgvs(up.tx_end);
                HgvsPosition {
                    offset: dist_up as i64,
                    ..base
                }
            } else {
                let base = self.tx_to_hgvs(down.tx_start);
                HgvsPosition {
                    offset: -(dist_down as i64),
                    ..base
                }
            };
            return Ok(pos);
        }

        Err(self.fail(format!(
            "genomic position {} lies outside the transcript",
            genomic
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{GenomeBuild, ReferenceProvider, ReferenceStore};

    fn hnf1b() -> Transcript {
        ReferenceStore::with_test_data()
            .get_transcript("NM_000458.4", GenomeBuild::GRCh38)
            .unwrap()
    }

    fn plus() -> Transcript {
        ReferenceStore::with_test_data()
            .get_transcript("NM_999999.1", GenomeBuild::GRCh38)
            .unwrap()
    }

    #[test]
    fn test_intronic_minus_strand() {
        let tx = hnf1b();
        let mapper = CoordinateMapper::new(&tx);
        let pos = HgvsPosition::with_offset(544, 1);
        assert_eq!(mapper.to_genomic(&pos).unwrap(), 36459258);
        assert_eq!(mapper.from_genomic(36459258).unwrap(), pos);
    }

    #[test]
    fn test_utr_positions() {
        let tx = plus();
        let mapper = CoordinateMapper::new(&tx);
        // cds_start 21 at 1021, cds_end 170 at 2070
        assert_eq!(mapper.to_genomic(&HgvsPosition::new(1)).unwrap(), 1021);
        assert_eq!(mapper.to_genomic(&HgvsPosition::new(-1)).unwrap(), 1020);
        assert_eq!(mapper.to_genomic(&HgvsPosition::utr3(1, 0)).unwrap(), 2071);
        assert_eq!(mapper.from_genomic(1020).unwrap(), HgvsPosition::new(-1));
        assert_eq!(mapper.from_genomic(2071).unwrap(), HgvsPosition::utr3(1, 0));
    }

    #[test]
    fn test_intron_nearest_boundary() {
        let tx = plus();
        let mapper = CoordinateMapper::new(&tx);
        // exon 1 ends at 1100 (c.80), exon 2 starts at 2001 (c.81)
        assert_eq!(
            mapper.from_genomic(1105).unwrap(),
            HgvsPosition::with_offset(80, 5)
        );
        assert_eq!(
            mapper.from_genomic(1998).unwrap(),
            HgvsPosition::with_offset(81, -3)
        );
        assert_eq!(
            mapper.to_genomic(&HgvsPosition::with_offset(81, -3)).unwrap(),
            1998
        );
    }

    #[test]
    fn test_offset_must_sit_on_boundary() {
        let tx = plus();
        let mapper = CoordinateMapper::new(&tx);
        assert!(mapper.to_genomic(&HgvsPosition::with_offset(50, 2)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::with_offset(81, 2)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::with_offset(80, 901)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::with_offset(80, 900)).is_ok());
    }

    #[test]
    fn test_outside_transcript() {
        let tx = plus();
        let mapper = CoordinateMapper::new(&tx);
        assert!(mapper.to_genomic(&HgvsPosition::new(-21)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::utr3(31, 0)).is_err());
        assert!(mapper.from_genomic(500).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::new(i64::MAX)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::new(-i64::MAX)).is_err());
        assert!(mapper.to_genomic(&HgvsPosition::utr3(i64::MAX, 0)).is_err());
    }
}
