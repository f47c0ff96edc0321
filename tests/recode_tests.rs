//! Recoding across notations

use hnf1b_variants::reference::GenomeBuild;
use hnf1b_variants::{parse_variant, AssembledVariant, Recoder, VariantError};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rstest::rstest;

fn grch38(raw: &str) -> AssembledVariant {
    AssembledVariant::new(parse_variant(raw).unwrap(), GenomeBuild::GRCh38)
}

#[test]
fn test_rs56116432_recoding() {
    let recoder = Recoder::with_test_data();
    let recoding = recoder.recode(&grch38("rs56116432")).unwrap();
    assert_eq!(recoding.id, ["rs56116432"]);
    assert_eq!(recoding.hgvsc, ["NM_000458.4:c.544+1G>A"]);
    assert_eq!(recoding.vcf_string, ["17-36459258-A-G"]);
    assert_eq!(recoding.hgvsg, ["NC_000017.11:g.36459258A>G"]);
    assert_eq!(recoding.spdi, ["NC_000017.11:36459257:A:G"]);
}

#[rstest]
#[case("NM_000458.4:c.544+1G>A")]
#[case("17-36459258-A-G")]
#[case("NC_000017.11:g.36459258A>G")]
#[case("NC_000017.11:36459257:A:G")]
#[case("rs56116432")]
fn test_notations_share_key(#[case] input: &str) {
    let recoder = Recoder::with_test_data();
    let key = recoder.canonical_key(&grch38(input)).unwrap();
    assert_eq!(key.as_str(), "GRCh38:NC_000017.11:36459257:A:G");
}

#[test]
fn test_assembly_is_part_of_key() {
    let recoder = Recoder::with_test_data();
    let grch37 = AssembledVariant::new(
        parse_variant("17-36459258-A-G").unwrap(),
        GenomeBuild::GRCh37,
    );
    let key = recoder.canonical_key(&grch37).unwrap();
    assert_eq!(key.as_str(), "GRCh37:NC_000017.10:36459257:A:G");
}

#[rstest]
#[case("NP_000449.1:p.Arg177Ter")]
#[case("NM_000458.3:c.544+1G>A")]
#[case("NM_000458.4:c.544+2001G>A")]
#[case("NC_000017.10:g.36459258A>G")]
fn test_unsupported_conversions(#[case] input: &str) {
    let recoder = Recoder::with_test_data();
    let err = recoder.recode(&grch38(input)).unwrap_err();
    assert!(
        matches!(err, VariantError::UnsupportedConversion { .. }),
        "{}: {}",
        input,
        err
    );
}

#[rstest]
#[case("NC_000017.11:18446744073709551615:A:G")]
#[case("17-18446744073709551615-A-G")]
#[case("NC_000017.11:g.83257442A>G")]
#[case("NM_000458.4:c.9223372036854775807A>G")]
#[case("NM_000458.4:c.*9223372036854775807A>G")]
#[case("NM_000458.4:c.-9223372036854775807A>G")]
fn test_out_of_range_positions_are_rejected(#[case] input: &str) {
    let recoder = Recoder::with_test_data();
    let err = recoder.recode(&grch38(input)).unwrap_err();
    assert!(
        matches!(
            err,
            VariantError::InvalidNotation { .. } | VariantError::UnsupportedConversion { .. }
        ),
        "{}: {}",
        input,
        err
    );
}

#[test]
fn test_unknown_rsid_not_found() {
    let recoder = Recoder::with_test_data();
    let err = recoder.recode(&grch38("rs1")).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_deletion_anchor_base() {
    let recoder = Recoder::with_test_data();
    let recoding = recoder
        .recode(&grch38("NC_000001.11:g.1047_1048del"))
        .unwrap();
    assert_eq!(recoding.vcf_string, ["1-1046-GTC-G"]);
    assert_eq!(recoding.spdi, ["NC_000001.11:1046:TC:"]);
    assert_eq!(recoding.hgvsc, ["NM_999999.1:c.27_28del"]);
    assert_eq!(recoding.id, ["rs999000002"]);
}

#[test]
fn test_every_notation_recodes_identically() {
    let recoder = Recoder::with_test_data();
    let expected = recoder.recode(&grch38("rs56116432")).unwrap();
    for input in [
        "NM_000458.4:c.544+1G>A",
        "17-36459258-A-G",
        "NC_000017.11:g.36459258A>G",
        "NC_000017.11:36459257:A:G",
    ] {
        let recoding = recoder.recode(&grch38(input)).unwrap();
        assert_eq!(recoding.id, expected.id, "{}", input);
        assert_eq!(recoding.hgvsc, expected.hgvsc, "{}", input);
        assert_eq!(recoding.vcf_string, expected.vcf_string, "{}", input);
        assert_eq!(recoding.spdi, expected.spdi, "{}", input);
    }
}

/// Genomic positions covered by the fixture transcripts: TESTPLUS on chr1
/// (plus strand) and HNF1B on chr17 (minus strand), introns included
fn transcript_position() -> impl Strategy<Value = (&'static str, u64)> {
    prop_oneof![
        (1001u64..=2100).prop_map(|p| ("1", p)),
        (36453603u64..=36460902).prop_map(|p| ("17", p)),
    ]
}

fn base() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['A', 'C', 'G', 'T'])
}

fn substitution() -> impl Strategy<Value = (char, char)> {
    (base(), base()).prop_filter("reference and alternate differ", |(r, a)| r != a)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// VCF -> transcript HGVS -> genomic lands on the same position and key
    #[test]
    fn test_vcf_transcript_round_trip(
        (chromosome, position) in transcript_position(),
        (reference, alternate) in substitution(),
    ) {
        // curated dbSNP expressions win over computed ones at rs56116432
        prop_assume!(!(chromosome == "17" && position == 36459258));
        let recoder = Recoder::with_test_data();
        let vcf = format!("{}-{}-{}-{}", chromosome, position, reference, alternate);
        let original = recoder.resolve(&grch38(&vcf)).unwrap();
        let recoding = recoder.recode(&grch38(&vcf)).unwrap();
        prop_assert_eq!(recoding.hgvsc.len(), 1, "{} -> {:?}", vcf, recoding.hgvsc);

        let hgvsc = &recoding.hgvsc[0];
        let back = recoder.resolve(&grch38(hgvsc)).unwrap();
        prop_assert_eq!(back.start + 1, position, "{} -> {}", vcf, hgvsc);
        prop_assert_eq!(back.canonical_key(), original.canonical_key());

        let again = recoder.recode(&grch38(hgvsc)).unwrap();
        prop_assert_eq!(&again.vcf_string, &vec![vcf.clone()]);
    }
}
