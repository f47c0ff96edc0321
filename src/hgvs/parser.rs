//! HGVS parsing
//!
//! Parses the subset of HGVS nomenclature the recoder can act on:
//! substitutions, deletions, duplications, insertions and deletion-insertions
//! on `g.`, `m.`, `c.` and `n.` references, plus `p.` descriptions kept
//! verbatim. Uncertain positions (`(?_100)`), which describe structural
//! variants, are rejected.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{opt, recognize},
    IResult, Parser,
};

use crate::error::VariantError;
use crate::hgvs::edit::NaEdit;
use crate::hgvs::location::{HgvsInterval, HgvsPosition};
use crate::hgvs::variant::{CoordinateType, HgvsChange, HgvsVariant};

/// Parse an HGVS variant description
///
/// # Example
///
/// ```
/// use hnf1b_variants::hgvs::parse_hgvs;
///
/// let variant = parse_hgvs("NM_000458.4:c.544+1G>A").unwrap();
/// assert_eq!(variant.accession, "NM_000458.4");
/// assert_eq!(variant.to_string(), "NM_000458.4:c.544+1G>A");
/// ```
pub fn parse_hgvs(input: &str) -> Result<HgvsVariant, VariantError> {
    let (rest, accession) = parse_accession(input).map_err(|_| {
        VariantError::invalid(format!(
            "'{}' does not start with a reference sequence accession (e.g., NM_000458.4)",
            input
        ))
    })?;
    if !accession.contains('.') {
        return Err(VariantError::invalid(format!(
            "accession '{}' is missing a version number (e.g., {}.1)",
            accession, accession
        )));
    }

    let rest = rest.strip_prefix(':').ok_or_else(|| {
        if looks_like_change(rest) {
            VariantError::invalid(format!(
                "missing ':' between reference '{}' and change '{}'",
                accession, rest
            ))
        } else {
            VariantError::invalid(format!("expected ':' after accession '{}'", accession))
        }
    })?;

    let coordinate = rest
        .chars()
        .next()
        .and_then(CoordinateType::from_prefix)
        .ok_or_else(|| {
            VariantError::invalid(format!(
                "unknown coordinate type in '{}' (expected c., g., n., m. or p.)",
                rest
            ))
        })?;
    let body = rest[1..].strip_prefix('.').ok_or_else(|| {
        VariantError::invalid(format!(
            "expected '.' after coordinate type '{}'",
            coordinate.prefix()
        ))
    })?;
    check_accession_kind(accession, coordinate)?;

    if coordinate == CoordinateType::Protein {
        return parse_protein_change(accession, body);
    }

    if body.starts_with('(') || body.contains('?') {
        return Err(VariantError::unsupported(
            "uncertain positions describe structural variants (CNVs), which are not supported",
        ));
    }

    let position: fn(&str) -> IResult<&str, HgvsPosition> = if coordinate.is_genomic() {
        parse_genomic_pos
    } else {
        parse_transcript_pos
    };
    let (rest, interval) = parse_interval(body, position).map_err(|_| {
        VariantError::invalid(format!("invalid position in '{}'", body))
    })?;
    let (rest, edit) = parse_edit(rest).map_err(|_| {
        VariantError::invalid(format!(
            "invalid edit '{}' (expected e.g. G>A, del, dup, insT or delinsT with upper-case bases)",
            rest
        ))
    })?;
    if !rest.is_empty() {
        return Err(VariantError::invalid(format!(
            "unexpected trailing characters '{}'",
            rest
        )));
    }

    check_semantics(coordinate, &interval, &edit)?;

    Ok(HgvsVariant {
        accession: accession.to_string(),
        coordinate,
        change: HgvsChange::Nucleotide { interval, edit },
    })
}

fn looks_like_change(rest: &str) -> bool {
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('c' | 'g' | 'n' | 'm' | 'p'), Some('.'))
    )
}

/// Accession: `NM_000458.4`, `NC_000017.11`, `ENST00000617811.5`
fn parse_accession(input: &str) -> IResult<&str, &str> {
    recognize((
        alt((
            recognize((
                satisfy(|c| c.is_ascii_uppercase()),
                satisfy(|c| c.is_ascii_uppercase()),
                char('_'),
            )),
            tag("ENST"),
            tag("ENSP"),
        )),
        digit1,
        opt((char('.'), digit1)),
    ))
    .parse(input)
}

fn check_accession_kind(accession: &str, coordinate: CoordinateType) -> Result<(), VariantError> {
    let prefix_len = accession
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(accession.len());
    let prefix = &accession[..prefix_len];
    let ok = match coordinate {
        CoordinateType::Coding => matches!(prefix, "NM_" | "XM_" | "ENST"),
        CoordinateType::NonCoding => matches!(prefix, "NR_" | "XR_" | "NM_" | "ENST"),
        CoordinateType::Genomic => matches!(prefix, "NC_" | "NG_" | "NT_" | "NW_"),
        CoordinateType::Mitochondrial => prefix == "NC_",
        CoordinateType::Protein => matches!(prefix, "NP_" | "XP_" | "ENSP"),
    };
    if ok {
        Ok(())
    } else {
        Err(VariantError::invalid(format!(
            "accession '{}' cannot carry '{}.' coordinates",
            accession,
            coordinate.prefix()
        )))
    }
}

fn parse_number(input: &str) -> IResult<&str, i64> {
    let (rest, digits) = digit1.parse(input)?;
    let value: i64 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    // HGVS numbering has no position 0
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((rest, value))
}

fn parse_offset(input: &str) -> IResult<&str, i64> {
    let (rest, sign) = one_of("+-").parse(input)?;
    let (rest, value) = parse_number(rest)?;
    Ok((rest, if sign == '-' { -value } else { value }))
}

fn parse_genomic_pos(input: &str) -> IResult<&str, HgvsPosition> {
    let (rest, base) = parse_number(input)?;
    Ok((rest, HgvsPosition::new(base)))
}

/// `544`, `544+1`, `545-2`, `-12`, `*5`, `*5+3`
fn parse_transcript_pos(input: &str) -> IResult<&str, HgvsPosition> {
    let (rest, prefix) = opt(one_of("-*")).parse(input)?;
    let (rest, base) = parse_number(rest)?;
    let (rest, offset) = opt(parse_offset).parse(rest)?;
    let offset = offset.unwrap_or(0);
    let pos = match prefix {
        Some('*') => HgvsPosition::utr3(base, offset),
        Some(_) => HgvsPosition::with_offset(-base, offset),
        None => HgvsPosition::with_offset(base, offset),
    };
    Ok((rest, pos))
}

fn parse_interval(
    input: &str,
    position: fn(&str) -> IResult<&str, HgvsPosition>,
) -> IResult<&str, HgvsInterval> {
    let (rest, start) = position(input)?;
    match rest.strip_prefix('_') {
        Some(after) => {
            let (rest, end) = position(after)?;
            Ok((rest, HgvsInterval::range(start, end)))
        }
        None => Ok((rest, HgvsInterval::point(start))),
    }
}

fn is_base(c: char) -> bool {
    matches!(c, 'A' | 'C' | 'G' | 'T' | 'N')
}

fn parse_bases(input: &str) -> IResult<&str, String> {
    let (rest, bases) = take_while1(is_base).parse(input)?;
    Ok((rest, bases.to_string()))
}

fn parse_substitution(input: &str) -> IResult<&str, NaEdit> {
    let (rest, (reference, _, alternative)) =
        (one_of("ACGTN"), char('>'), one_of("ACGTN")).parse(input)?;
    Ok((
        rest,
        NaEdit::Substitution {
            reference: reference.to_string(),
            alternative: alternative.to_string(),
        },
    ))
}

/// `delinsT` or `delAinsT`
fn parse_delins(input: &str) -> IResult<&str, NaEdit> {
    let (rest, _) = tag("del").parse(input)?;
    let (rest, deleted) = opt(parse_bases).parse(rest)?;
    let (rest, _) = tag("ins").parse(rest)?;
    let (rest, inserted) = parse_bases(rest)?;
    Ok((rest, NaEdit::Delins { deleted, inserted }))
}

fn parse_deletion(input: &str) -> IResult<&str, NaEdit> {
    let (rest, _) = tag("del").parse(input)?;
    let (rest, deleted) = opt(parse_bases).parse(rest)?;
    Ok((rest, NaEdit::Deletion { deleted }))
}

fn parse_duplication(input: &str) -> IResult<&str, NaEdit> {
    let (rest, _) = tag("dup").parse(input)?;
    let (rest, duplicated) = opt(parse_bases).parse(rest)?;
    Ok((rest, NaEdit::Duplication { duplicated }))
}

fn parse_insertion(input: &str) -> IResult<&str, NaEdit> {
    let (rest, _) = tag("ins").parse(input)?;
    let (rest, inserted) = parse_bases(rest)?;
    Ok((rest, NaEdit::Insertion { inserted }))
}

fn parse_edit(input: &str) -> IResult<&str, NaEdit> {
    alt((
        parse_delins,
        parse_deletion,
        parse_duplication,
        parse_insertion,
        parse_substitution,
    ))
    .parse(input)
}

fn check_semantics(
    coordinate: CoordinateType,
    interval: &HgvsInterval,
    edit: &NaEdit,
) -> Result<(), VariantError> {
    if coordinate == CoordinateType::NonCoding && (interval.start.utr3 || interval.last().utr3) {
        return Err(VariantError::invalid(
            "'*' positions are only valid on coding (c.) references",
        ));
    }

    match edit {
        NaEdit::Substitution {
            reference,
            alternative,
        } => {
            if interval.end.is_some() {
                return Err(VariantError::invalid(
                    "a substitution applies to a single position; use delins for ranges",
                ));
            }
            if reference == alternative {
                return Err(VariantError::invalid(format!(
                    "reference and alternative base are both '{}'",
                    reference
                )));
            }
        }
        NaEdit::Insertion { .. } => {
            if interval.end.is_none() {
                return Err(VariantError::invalid(
                    "an insertion needs the two flanking positions (e.g., 100_101insA)",
                ));
            }
        }
        _ => {}
    }

    if coordinate.is_genomic() {
        let start = interval.start.base;
        let end = interval.last().base;
        if end < start {
            return Err(VariantError::invalid(format!(
                "range {}_{} is reversed",
                start, end
            )));
        }
        if let NaEdit::Insertion { .. } = edit {
            if start.checked_add(1) != Some(end) {
                return Err(VariantError::invalid(format!(
                    "insertion flanks {}_{} are not adjacent",
                    start, end
                )));
            }
        } else if let Some(stated) = edit.stated_reference() {
            let span = end.checked_sub(start).and_then(|d| d.checked_add(1));
            if span != Some(stated.len() as i64) {
                return Err(VariantError::invalid(format!(
                    "stated sequence '{}' has length {} but {}_{} spans a different number of bases",
                    stated,
                    stated.len(),
                    start,
                    end
                )));
            }
        }
    }
    Ok(())
}

fn parse_protein_change(accession: &str, body: &str) -> Result<HgvsVariant, VariantError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "*=?_()[];>-".contains(c);
    let starts_ok = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || matches!(c, '(' | '=' | '?' | '0'));
    if body.is_empty() || !starts_ok || !body.chars().all(allowed) {
        return Err(VariantError::invalid(format!(
            "invalid protein change '{}' (expected e.g. Arg137Trp)",
            body
        )));
    }
    Ok(HgvsVariant {
        accession: accession.to_string(),
        coordinate: CoordinateType::Protein,
        change: HgvsChange::Protein {
            description: body.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intronic_substitution() {
        let v = parse_hgvs("NM_000458.4:c.544+1G>A").unwrap();
        assert_eq!(v.coordinate, CoordinateType::Coding);
        let (interval, edit) = v.nucleotide().unwrap();
        assert_eq!(interval.start, HgvsPosition::with_offset(544, 1));
        assert_eq!(
            *edit,
            NaEdit::Substitution {
                reference: "G".to_string(),
                alternative: "A".to_string()
            }
        );
    }

    #[test]
    fn test_parse_utr_positions() {
        let v = parse_hgvs("NM_000458.4:c.-12_*5del").unwrap();
        let (interval, _) = v.nucleotide().unwrap();
        assert_eq!(interval.start, HgvsPosition::new(-12));
        assert_eq!(interval.end, Some(HgvsPosition::utr3(5, 0)));
    }

    #[test]
    fn test_parse_edits() {
        for input in [
            "NC_000017.11:g.36459258A>G",
            "NC_000017.11:g.36459258_36459260del",
            "NC_000017.11:g.36459258_36459260delCAG",
            "NC_000017.11:g.36459258dup",
            "NC_000017.11:g.36459258_36459259insTT",
            "NC_000017.11:g.36459258_36459259delinsT",
            "NM_000458.4:c.100_101delAGinsT",
            "NR_000001.1:n.50-2A>G",
        ] {
            assert!(parse_hgvs(input).is_ok(), "failed to parse {}", input);
        }
    }

    #[test]
    fn test_delins_display_drops_stated_bases() {
        let v = parse_hgvs("NM_000458.4:c.100_101delAGinsT").unwrap();
        assert_eq!(v.to_string(), "NM_000458.4:c.100_101delinsT");
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_hgvs("NM_000458.4c.544+1G>A").unwrap_err();
        assert!(err.to_string().contains("missing ':'"));
    }

    #[test]
    fn test_missing_version() {
        let err = parse_hgvs("NM_000458:c.544+1G>A").unwrap_err();
        assert!(err.to_string().contains("missing a version"));
    }

    #[test]
    fn test_rejects_structural() {
        let err = parse_hgvs("NC_000017.11:g.(?_36000000)_(37000000_?)del").unwrap_err();
        assert!(matches!(err, VariantError::UnsupportedConversion { .. }));
        assert!(err.to_string().contains("structural"));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        for input in [
            "NM_000458.4:c.544+1g>a",
            "NM_000458.4:c.0A>G",
            "NM_000458.4:c.544G>G",
            "NM_000458.4:c.544_545G>A",
            "NM_000458.4:c.544insA",
            "NC_000017.11:g.100_102delAT",
            "NC_000017.11:g.100_105insA",
            "NC_000017.11:c.100A>G",
            "NM_000458.4:x.100A>G",
            "NM_000458.4:c.100A>Gxyz",
            "NR_000001.1:n.*5A>G",
        ] {
            assert!(parse_hgvs(input).is_err(), "should reject {}", input);
        }
    }

    #[test]
    fn test_extreme_positions() {
        assert!(parse_hgvs("NC_000017.11:g.9223372036854775807_9223372036854775807insA").is_err());
        assert!(parse_hgvs("NC_000017.11:g.1_9223372036854775807delA").is_err());
        assert!(parse_hgvs("NM_000458.4:c.9223372036854775807A>G").is_ok());
        assert!(parse_hgvs("NM_000458.4:c.9223372036854775808A>G").is_err());
    }

    #[test]
    fn test_parse_protein() {
        let v = parse_hgvs("NP_000449.1:p.Arg137Trp").unwrap();
        assert_eq!(v.coordinate, CoordinateType::Protein);
        assert_eq!(v.to_string(), "NP_000449.1:p.Arg137Trp");
        assert!(parse_hgvs("NP_000449.1:p.").is_err());
        assert!(parse_hgvs("NM_000458.4:p.Arg137Trp").is_err());
    }
}
