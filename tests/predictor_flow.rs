//! End-to-end lifecycle tests for the ensemble predictor.

use adivinar::prelude::*;
use proptest::prelude::*;

#[test]
fn test_full_lifecycle_with_persistence() {
    let mut predictor = EnsemblePredictor::new().with_random_state(42);
    for x in 0..5 {
        let x = f64::from(x);
        predictor.add_sample(x, 3.0 * x + 1.0);
    }

    let prediction = predictor.predict(5.0);
    assert!(prediction.value.is_finite());
    assert!(prediction.confidence > 0.0 && prediction.confidence <= 0.95);
    assert_eq!(prediction.contributions.len(), 3);

    let analysis = predictor.analyze_pattern();
    assert_eq!(analysis.sample_count, 5);
    assert!((analysis.correlation - 1.0).abs() < 1e-9);

    let tmp = tempfile::NamedTempFile::new().expect("temp file");
    predictor.save(tmp.path()).expect("save");

    predictor.clear();
    assert!(predictor.is_empty());
    assert_eq!(predictor.predict(5.0).method, "no data");

    predictor.load(tmp.path()).expect("load");
    assert_eq!(predictor.sample_count(), 5);
    let restored = predictor.predict(5.0);
    assert!(restored.value.is_finite());
    assert!(restored.confidence > 0.0);
}

#[test]
fn test_saved_archive_is_versioned_json() {
    let mut predictor = EnsemblePredictor::new();
    predictor.add_sample(1.0, 2.0);
    predictor.add_sample(2.0, 4.0);

    let tmp = tempfile::NamedTempFile::new().expect("temp file");
    predictor.save(tmp.path()).expect("save");

    let contents = std::fs::read_to_string(tmp.path()).expect("read");
    assert!(contents.contains("\"version\""));
    assert!(contents.contains(FORMAT_VERSION));

    let archive = SampleArchive::from_json(&contents).expect("parse");
    assert_eq!(archive.samples.len(), 2);
}

#[test]
fn test_load_from_missing_path_fails_cleanly() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut predictor = EnsemblePredictor::new();
    predictor.add_sample(1.0, 2.0);

    let missing = dir.path().join("nope.json");
    assert!(matches!(
        predictor.load(&missing),
        Err(AdivinarError::Io(_))
    ));
    // A failed load keeps the current samples.
    assert_eq!(predictor.sample_count(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_predictions_stay_finite_and_bounded(
        samples in prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 2..8),
        query in -100.0..100.0f64,
    ) {
        let mut predictor = EnsemblePredictor::new().with_random_state(0);
        for (x, y) in &samples {
            predictor.add_sample(*x, *y);
        }

        let prediction = predictor.predict(query);
        prop_assert!(prediction.value.is_finite());
        prop_assert!((0.0..=0.95).contains(&prediction.confidence));

        let analysis = predictor.analyze_pattern();
        prop_assert!(analysis.correlation.is_finite());
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&analysis.correlation));
    }
}
