//! Annotator behaviour with the mock predictor

use std::sync::Arc;
use std::time::Duration;

use hnf1b_variants::annotate::Impact;
use hnf1b_variants::cache::{AnnotationCache, TtlCache};
use hnf1b_variants::reference::GenomeBuild;
use hnf1b_variants::{
    parse_variant, AssembledVariant, Annotator, MockPredictor, Recoder, VariantError,
};

fn setup(cache: TtlCache) -> (Arc<Annotator>, Arc<MockPredictor>) {
    let predictor = Arc::new(MockPredictor::with_test_data());
    let annotator = Annotator::new(Recoder::with_test_data(), predictor.clone(), Arc::new(cache));
    (Arc::new(annotator), predictor)
}

fn grch38(raw: &str) -> AssembledVariant {
    AssembledVariant::new(parse_variant(raw).unwrap(), GenomeBuild::GRCh38)
}

#[tokio::test]
async fn test_annotating_twice_calls_upstream_once() {
    let (annotator, predictor) = setup(TtlCache::default());
    let variant = grch38("NM_000458.4:c.544+1G>A");

    let first = annotator.annotate(&variant).await.unwrap();
    let second = annotator.annotate(&variant).await.unwrap();

    assert!(!first.served_from_cache);
    assert!(second.served_from_cache);
    assert_eq!(predictor.calls(), 1);
    assert_eq!(first.record, second.record);
    assert_eq!(first.record.impact, Some(Impact::High));
    assert_eq!(first.record.provenance.source, "mock");

    let stats = annotator.cache().stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
}

#[tokio::test]
async fn test_equivalent_notations_share_cache_entry() {
    let (annotator, predictor) = setup(TtlCache::default());
    for input in [
        "NM_000458.4:c.544+1G>A",
        "17-36459258-A-G",
        "NC_000017.11:g.36459258A>G",
        "NC_000017.11:36459257:A:G",
        "rs56116432",
    ] {
        annotator.annotate(&grch38(input)).await.unwrap();
    }
    assert_eq!(predictor.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_misses_are_coalesced() {
    let (annotator, predictor) = setup(TtlCache::default());
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let annotator = annotator.clone();
            tokio::spawn(async move { annotator.annotate(&grch38("17-36459258-A-G")).await })
        })
        .collect();

    let mut from_upstream = 0;
    for task in tasks {
        let lookup = task.await.unwrap().unwrap();
        if !lookup.served_from_cache {
            from_upstream += 1;
        }
    }
    assert_eq!(from_upstream, 1);
    assert_eq!(predictor.calls(), 1);
}

#[tokio::test]
async fn test_sixteenth_request_is_rate_limited() {
    // a zero TTL forces every lookup upstream
    let (annotator, _predictor) = setup(TtlCache::new(Duration::ZERO, 10));
    let variant = grch38("17-36459258-A-G");
    for i in 0..15 {
        assert!(annotator.annotate(&variant).await.is_ok(), "request {}", i + 1);
    }
    match annotator.annotate(&variant).await {
        Err(e @ VariantError::RateLimited { .. }) => {
            assert_eq!(e.status_code(), 429);
            assert!(e.is_retryable());
        }
        other => panic!("expected RateLimited, got {:?}", other.map(|l| l.record.key)),
    }
}

#[tokio::test]
async fn test_version_change_invalidates_cache() {
    let (annotator, predictor) = setup(TtlCache::default());
    annotator.annotate(&grch38("17-36459258-A-G")).await.unwrap();
    annotator.annotate(&grch38("1-1050-G-A")).await.unwrap();
    assert_eq!(annotator.cache().stats().size, 2);

    predictor.set_version("mock-2");
    // the new release is noticed on the next upstream result
    let lookup = annotator.annotate(&grch38("1-1050-G-T")).await.unwrap();
    assert_eq!(lookup.record.provenance.version, "mock-2");
    assert_eq!(annotator.cache().stats().size, 1);

    let refreshed = annotator.annotate(&grch38("17-36459258-A-G")).await.unwrap();
    assert!(!refreshed.served_from_cache);
    assert_eq!(predictor.calls(), 4);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let (annotator, predictor) = setup(TtlCache::new(Duration::from_millis(50), 10));
    let variant = grch38("17-36459258-A-G");
    annotator.annotate(&variant).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let again = annotator.annotate(&variant).await.unwrap();
    assert!(!again.served_from_cache);
    assert_eq!(predictor.calls(), 2);
}

#[tokio::test]
async fn test_error_kinds() {
    let (annotator, predictor) = setup(TtlCache::default());

    // no canned consequence: upstream has no record
    let err = annotator
        .annotate(&grch38("17-100-A-G"))
        .await
        .unwrap_err();
    assert!(matches!(err, VariantError::NotFound { .. }));

    predictor.set_unavailable(true);
    let err = annotator
        .annotate(&grch38("17-36459258-A-G"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 503);

    let err = parse_variant("NC_000017.11:g.(?_36000000)_(37000000_?)del").unwrap_err();
    assert!(matches!(err, VariantError::UnsupportedConversion { .. }));
}
