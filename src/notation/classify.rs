//! Syntactic notation classifier

use crate::notation::NotationKind;

/// Decide which notation a raw string is written in
///
/// Purely syntactic: the string is not parsed, and anything unrecognized is
/// [`NotationKind::Unknown`] rather than an error.
///
/// ```
/// use hnf1b_variants::notation::{classify, NotationKind};
///
/// assert_eq!(classify("NM_000458.4:c.544+1G>A"), NotationKind::Hgvs);
/// assert_eq!(classify("17-36459258-A-G"), NotationKind::Vcf);
/// assert_eq!(classify("rs56116432"), NotationKind::RsId);
/// assert_eq!(classify("hello"), NotationKind::Unknown);
/// ```
pub fn classify(input: &str) -> NotationKind {
    let s = input.trim();
    if s.is_empty() {
        NotationKind::Unknown
    } else if is_hgvs_shaped(s) {
        NotationKind::Hgvs
    } else if is_rsid_shaped(s) {
        NotationKind::RsId
    } else if is_vcf_shaped(s) {
        NotationKind::Vcf
    } else if is_spdi_shaped(s) {
        NotationKind::Spdi
    } else {
        NotationKind::Unknown
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `REF:x.` with a non-empty reference
fn is_hgvs_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.windows(3).enumerate().any(|(i, w)| {
        i > 0 && w[0] == b':' && matches!(w[1], b'c' | b'g' | b'p' | b'n' | b'm') && w[2] == b'.'
    })
}

fn is_rsid_shaped(s: &str) -> bool {
    s.strip_prefix("rs").is_some_and(is_digits)
}

fn is_vcf_shaped(s: &str) -> bool {
    let fields: Vec<&str> = s.split('-').collect();
    fields.len() == 4 && is_digits(fields[1])
}

fn is_spdi_shaped(s: &str) -> bool {
    let fields: Vec<&str> = s.split(':').collect();
    fields.len() == 4
        && fields[0].contains('_')
        && is_digits(fields[1])
        && fields[2..]
            .iter()
            .all(|f| f.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hgvs() {
        for input in [
            "NM_000458.4:c.544+1G>A",
            "NC_000017.11:g.36459258A>G",
            "NP_000449.1:p.Arg137Trp",
            "NR_000001.1:n.5del",
            "NC_012920.1:m.3243A>G",
            // shaped like HGVS even when invalid
            "NM_000458:c.x",
        ] {
            assert_eq!(classify(input), NotationKind::Hgvs, "{}", input);
        }
        assert_eq!(classify(":c.544G>A"), NotationKind::Unknown);
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(classify("chr17-36459258-A-G"), NotationKind::Vcf);
        assert_eq!(classify("17-36459258-A-<DEL>"), NotationKind::Vcf);
        assert_eq!(classify(" rs56116432 "), NotationKind::RsId);
        assert_eq!(classify("NC_000017.11:36459257:A:G"), NotationKind::Spdi);
        assert_eq!(classify("NC_000017.11:100::TT"), NotationKind::Spdi);
    }

    #[test]
    fn test_unknown() {
        for input in [
            "",
            "   ",
            "BRCA1 mutation",
            "rs",
            "rs12a",
            "RS56116432",
            "17-pos-A-G",
            "17:36459258:A:G",
            "NM_000458.4c.544+1G>A",
        ] {
            assert_eq!(classify(input), NotationKind::Unknown, "{:?}", input);
        }
    }
}
