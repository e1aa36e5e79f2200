//! Integration tests for loading, enriching and filtering seismic datasets.
//!
//! These tests exercise the public API end to end against CSV fixtures.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use quake_processing::columns::{
    DEPTH, DERIVED_COLUMNS, IMPACT_LEVEL, LATITUDE, MAGNITUDE, MONITORING_QUALITY, OCEANIC_EVENT,
    REQUIRED_COLUMNS, TSUNAMI, YEAR,
};
use quake_processing::utils::{f64_values, has_column, i32_values};
use quake_processing::{
    DatasetCache, DatasetPreparer, FilterCriteria, Hemisphere, LoadOptions, MagnitudeCategory,
    ProcessingError, TsunamiFilter, compare_by_tsunami, describe, filter, load, yearly_stats,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    load(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn magnitudes(df: &DataFrame) -> Vec<Option<f64>> {
    f64_values(df, MAGNITUDE).unwrap()
}

/// Random but valid criteria, reproducible from `rng`.
fn random_criteria(rng: &mut StdRng) -> FilterCriteria {
    let mut builder = FilterCriteria::builder();
    if rng.gen_bool(0.5) {
        let min = rng.gen_range(2000..=2022);
        builder = builder.year_range(min, rng.gen_range(min..=2023));
    }
    if rng.gen_bool(0.5) {
        let min = rng.gen_range(6.0..8.0);
        builder = builder.magnitude_range(min, rng.gen_range(min..9.5));
    }
    if rng.gen_bool(0.3) {
        builder = builder.max_depth(rng.gen_range(10.0..700.0));
    }
    if rng.gen_bool(0.3) {
        builder = builder.tsunami_filter(if rng.gen_bool(0.5) {
            TsunamiFilter::OnlyWith
        } else {
            TsunamiFilter::OnlyWithout
        });
    }
    for hemisphere in Hemisphere::ALL {
        if rng.gen_bool(0.3) {
            builder = builder.hemisphere(hemisphere);
        }
    }
    builder
        .shallow_only(rng.gen_bool(0.2))
        .high_magnitude_only(rng.gen_bool(0.2))
        .build()
        .unwrap()
}

/// `base` with one more constraint.
fn tighten(base: &FilterCriteria, rng: &mut StdRng) -> FilterCriteria {
    let mut tighter = base.clone();
    match rng.gen_range(0..4) {
        0 => tighter.shallow_only = true,
        1 => tighter.high_magnitude_only = true,
        2 => tighter.min_significance = Some(rng.gen_range(600.0..3000.0)),
        _ => {
            tighter.magnitude_categories.insert(MagnitudeCategory::Strong);
        }
    }
    tighter
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_sample_dataset() {
    let df = load_fixture("earthquakes_sample.csv");

    assert_eq!(df.height(), 14);
    for name in REQUIRED_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()) {
        assert!(has_column(&df, name), "missing column {name}");
    }
    assert!(!has_column(&df, "Year"));
}

#[test]
fn test_load_sorts_newest_first_and_keeps_ties_in_file_order() {
    let df = load_fixture("earthquakes_sample.csv");
    let mags = magnitudes(&df);

    // The three 2022-11 events, in file order
    assert_eq!(&mags[..3], &[Some(7.0), Some(6.9), Some(7.1)]);
    assert_eq!(mags.last(), Some(&Some(6.5)));

    let years: Vec<i32> = i32_values(&df, YEAR).unwrap().into_iter().flatten().collect();
    assert!(years.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_load_missing_depth_is_schema_error() {
    let err = load(fixtures_path().join("missing_depth.csv")).unwrap_err();
    match &err {
        ProcessingError::Schema { missing } => assert_eq!(missing, &vec!["depth".to_string()]),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(err.to_string().contains("depth"));
    assert!(err.is_load_failure());
}

#[test]
fn test_load_decimal_after_inference_window() {
    // The 120th row holds the only non-integer depth, past the default window
    let df = load_fixture("late_decimal_depth.csv");
    assert_eq!(df.height(), 150);
    assert_eq!(df.column(DEPTH).unwrap().dtype(), &DataType::Float64);
    assert!(f64_values(&df, DEPTH).unwrap().contains(&Some(26.943)));

    let options = LoadOptions::builder().infer_schema_length(5).build().unwrap();
    let narrow = DatasetPreparer::new(options)
        .load(fixtures_path().join("late_decimal_depth.csv"))
        .unwrap();
    assert_eq!(
        f64_values(&narrow, DEPTH).unwrap(),
        f64_values(&df, DEPTH).unwrap()
    );
}

#[test]
fn test_load_malformed_is_parse_error() {
    let err = load(fixtures_path().join("malformed.csv")).unwrap_err();
    assert!(matches!(err, ProcessingError::Parse(_)), "got {err:?}");
}

#[test]
fn test_load_nonexistent_file() {
    let err = load(fixtures_path().join("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, ProcessingError::NotFound(_)));
}

#[test]
fn test_optional_columns_fall_back() {
    let df = load_fixture("scenario_events.csv");

    assert_eq!(f64_values(&df, MONITORING_QUALITY).unwrap(), vec![Some(0.5); 3]);
    assert_eq!(f64_values(&df, IMPACT_LEVEL).unwrap(), vec![Some(0.0); 3]);
    assert_eq!(f64_values(&df, OCEANIC_EVENT).unwrap(), vec![Some(0.0); 3]);
}

#[test]
fn test_monitoring_quality_is_bounded() {
    let df = load_fixture("earthquakes_sample.csv");
    for quality in f64_values(&df, MONITORING_QUALITY).unwrap().into_iter().flatten() {
        assert!((0.0..=1.0).contains(&quality), "out of range: {quality}");
    }
}

#[test]
fn test_missing_intensity_becomes_zero_impact() {
    let df = load_fixture("earthquakes_sample.csv");
    let impact = f64_values(&df, IMPACT_LEVEL).unwrap();
    assert!(impact.iter().all(|v| v.is_some()));
    assert!(impact.contains(&Some(0.0)));
}

#[test]
fn test_derivation_is_idempotent() {
    let df = load_fixture("earthquakes_sample.csv");
    let again = DatasetPreparer::new(LoadOptions::default())
        .prepare(df.clone())
        .unwrap();

    assert_eq!(again.height(), df.height());
    assert_eq!(again.get_column_names(), df.get_column_names());
    assert!(again.equals_missing(&df));
}

// ============================================================================
// Describe
// ============================================================================

#[test]
fn test_describe_sample_dataset() {
    let df = load_fixture("earthquakes_sample.csv");
    let summary = describe(&df).unwrap();

    assert_eq!(summary.total_events, 14);
    assert_eq!(summary.tsunami_events, 9);
    assert_eq!(summary.years_span, "2001-2022");
    assert_eq!(summary.magnitude_range, "6.5 - 9.1");
    assert_eq!(summary.depth_range, "10.0 - 600.0 km");
    assert!((summary.tsunami_percentage - 9.0 / 14.0 * 100.0).abs() < 1e-9);
}

// ============================================================================
// Filtering Scenarios
// ============================================================================

#[test]
fn test_shallow_high_magnitude_scenario() {
    let df = load_fixture("scenario_events.csv");
    let criteria = FilterCriteria::builder()
        .shallow_only(true)
        .high_magnitude_only(true)
        .build()
        .unwrap();

    let filtered = filter::apply(&df, &criteria).unwrap();
    assert_eq!(magnitudes(&filtered), vec![Some(7.2)]);
}

#[test]
fn test_single_year_scenario() {
    let df = load_fixture("earthquakes_sample.csv");
    let criteria = FilterCriteria::builder()
        .year_range(2010, 2010)
        .build()
        .unwrap();

    let filtered = filter::apply(&df, &criteria).unwrap();
    assert_eq!(filtered.height(), 4);
    assert!(
        i32_values(&filtered, YEAR)
            .unwrap()
            .iter()
            .all(|y| *y == Some(2010))
    );
}

#[test]
fn test_exclude_north_scenario() {
    let df = load_fixture("scenario_events.csv");
    let criteria = FilterCriteria::builder()
        .hemispheres([Hemisphere::South, Hemisphere::East, Hemisphere::West])
        .build()
        .unwrap();

    let filtered = filter::apply(&df, &criteria).unwrap();
    let mut latitudes: Vec<f64> = f64_values(&filtered, LATITUDE)
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    latitudes.sort_by(f64::total_cmp);
    assert_eq!(latitudes, vec![-20.0, -5.0]);
}

#[test]
fn test_empty_category_set_passes_through() {
    let df = load_fixture("earthquakes_sample.csv");
    let criteria = FilterCriteria {
        magnitude_categories: Default::default(),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&df, &criteria).unwrap();
    assert_eq!(filtered.height(), df.height());
}

#[test]
fn test_magnitude_category_filter_on_loaded_table() {
    let df = load_fixture("earthquakes_sample.csv");
    let criteria = FilterCriteria::builder()
        .magnitude_category(MagnitudeCategory::Great)
        .build()
        .unwrap();

    let filtered = filter::apply(&df, &criteria).unwrap();
    assert!(magnitudes(&filtered).iter().flatten().all(|m| *m > 7.5));
    assert_eq!(filtered.height(), 5);
}

#[test]
fn test_invalid_criteria_from_json() {
    let err = FilterCriteria::from_json(r#"{ "year_range": [2022, 2001] }"#).unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidCriteria(_)));
}

// ============================================================================
// Filter Properties
// ============================================================================

#[test]
fn test_empty_criteria_preserves_content_and_order() {
    let df = load_fixture("earthquakes_sample.csv");
    let filtered = filter::apply(&df, &FilterCriteria::default()).unwrap();
    assert!(filtered.equals_missing(&df));
}

#[test]
fn test_filter_does_not_modify_input() {
    let df = load_fixture("earthquakes_sample.csv");
    let before = df.clone();
    let criteria = FilterCriteria::builder()
        .tsunami_filter(TsunamiFilter::OnlyWith)
        .build()
        .unwrap();

    filter::apply(&df, &criteria).unwrap();
    assert!(df.equals_missing(&before));
}

#[test]
fn test_filter_monotonicity() {
    let df = load_fixture("earthquakes_sample.csv");
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let base = random_criteria(&mut rng);
        let tighter = tighten(&base, &mut rng);

        let loose = filter::apply(&df, &base).unwrap();
        let strict = filter::apply(&df, &tighter).unwrap();
        assert!(strict.height() <= loose.height());

        // Filtering the looser result gives the same rows, in the same order
        let nested = filter::apply(&loose, &tighter).unwrap();
        assert!(nested.equals_missing(&strict));
    }
}

#[test]
fn test_filter_is_stable() {
    let df = load_fixture("earthquakes_sample.csv");
    let criteria = FilterCriteria::builder()
        .tsunami_filter(TsunamiFilter::OnlyWith)
        .build()
        .unwrap();

    let filtered = filter::apply(&df, &criteria).unwrap();
    let expected: Vec<Option<f64>> = magnitudes(&df)
        .into_iter()
        .zip(i32_values(&df, TSUNAMI).unwrap())
        .filter(|(_, t)| *t == Some(1))
        .map(|(m, _)| m)
        .collect();
    assert_eq!(magnitudes(&filtered), expected);
}

#[test]
fn test_summary_consistency() {
    let df = load_fixture("earthquakes_sample.csv");
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..100 {
        let criteria = random_criteria(&mut rng);
        let filtered = filter::apply(&df, &criteria).unwrap();
        let summary = filter::summarize(&df, &filtered).unwrap();

        assert_eq!(summary.original_count, df.height());
        assert_eq!(summary.filtered_count + summary.removed_count, summary.original_count);
        assert!(summary.tsunami_count <= summary.filtered_count);
        assert!((0.0..=100.0).contains(&summary.retained_percentage));
        if summary.filtered_count == 0 {
            assert_eq!(summary.tsunami_percentage, 0.0);
        }
    }
}

// ============================================================================
// Shared Loading
// ============================================================================

#[test]
fn test_cache_shares_one_table_across_threads() {
    let cache = Arc::new(DatasetCache::new(LoadOptions::default()));
    let path = fixtures_path().join("earthquakes_sample.csv");

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let path = path.clone();
            thread::spawn(move || {
                let events = cache.get_or_load(&path).unwrap();
                let criteria = FilterCriteria::builder()
                    .year_range(2000 + i, 2022)
                    .build()
                    .unwrap();
                (events.clone(), filter::apply(&events, &criteria).unwrap().height())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(cache.load_count(), 1);
    for (events, kept) in &results {
        assert!(Arc::ptr_eq(events, &results[0].0));
        assert!(*kept <= events.height());
    }
}

// ============================================================================
// Analytics
// ============================================================================

#[test]
fn test_yearly_stats_on_filtered_table() {
    let df = load_fixture("earthquakes_sample.csv");
    let stats = yearly_stats(&df).unwrap();

    let years: Vec<i32> = stats.iter().map(|s| s.year).collect();
    assert_eq!(years, vec![2001, 2004, 2010, 2015, 2021, 2022]);

    let y2010 = stats.iter().find(|s| s.year == 2010).unwrap();
    assert_eq!(y2010.event_count, 4);
    assert_eq!(y2010.tsunami_count, 2);
    assert_eq!(y2010.mag_max, Some(8.8));

    let total: usize = stats.iter().map(|s| s.event_count).sum();
    assert_eq!(total, df.height());
}

#[test]
fn test_compare_by_tsunami_counts_groups() {
    let df = load_fixture("earthquakes_sample.csv");
    let comparison = compare_by_tsunami(&df, MAGNITUDE).unwrap();
    assert_eq!(comparison.with_tsunami.count, 9);
    assert_eq!(comparison.without_tsunami.count, 5);
}
