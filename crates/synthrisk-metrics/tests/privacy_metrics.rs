use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use synthrisk_core::{ColumnData, ColumnPartition, Frame};
use synthrisk_metrics::{
    AttributeDisclosure, DistanceKind, EvalContext, EvaluateOptions, MedianDcr, Metric,
    MetricError, MetricRegistry,
};

/// Capture metric log output with the test writer so failures show the
/// per-column attack progress.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("synthrisk_metrics=debug")
        .try_init();
}

fn mixed_partition() -> ColumnPartition {
    ColumnPartition::new(vec!["c1".to_string()], vec!["n1".to_string()]).expect("partition")
}

/// One categorical column with two balanced classes and one numerical
/// column correlated with it.
fn structured_frame(rows: usize, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cats = Vec::with_capacity(rows);
    let mut nums = Vec::with_capacity(rows);
    for i in 0..rows {
        let class = i % 2;
        cats.push(if class == 0 { "a".to_string() } else { "b".to_string() });
        nums.push(class as f64 * 10.0 + rng.random::<f64>());
    }
    Frame::from_columns(vec![
        ("c1".to_string(), ColumnData::Categorical(cats)),
        ("n1".to_string(), ColumnData::Numerical(nums)),
    ])
    .expect("frame")
}

fn noise_frame(rows: usize, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cats = (0..rows)
        .map(|_| {
            if rng.random::<bool>() {
                "a".to_string()
            } else {
                "b".to_string()
            }
        })
        .collect();
    let nums = (0..rows).map(|_| rng.random::<f64>() * 20.0).collect();
    Frame::from_columns(vec![
        ("c1".to_string(), ColumnData::Categorical(cats)),
        ("n1".to_string(), ColumnData::Numerical(nums)),
    ])
    .expect("frame")
}

#[test]
fn attribute_disclosure_end_to_end() {
    init_tracing();
    let real = structured_frame(100, 1);
    let synt = structured_frame(100, 2);
    let ctx = EvalContext::new(real, synt, mixed_partition()).with_seed(9);
    let mut metric = AttributeDisclosure::new(ctx);

    let output = metric.evaluate(&EvaluateOptions::default()).expect("evaluate");
    let keys: Vec<&str> = output.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["f1", "f1_se", "precision", "precision_se", "recall", "recall_se"]
    );
    for (key, value) in &output {
        assert!(value.is_finite(), "{key} is not finite");
    }
    assert!((0.0..=1.0).contains(&output["precision"]));
    assert!((0.0..=1.0).contains(&output["recall"]));
    assert!((0.0..=1.0).contains(&output["f1"]));

    let block = metric.format_output().expect("format");
    assert!(block.starts_with("| Attribute disclosure risk"));
    assert_eq!(block.lines().count(), 3);

    let normalized = metric.normalize_output().expect("normalize");
    assert_eq!(normalized.len(), 1);
    let score = &normalized[0];
    assert_eq!(score.metric, "attr_discl_risk");
    assert_eq!(score.dim, "p");
    assert!((score.n_val - (1.0 - score.val)).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&score.val));
    assert!((0.0..=1.0).contains(&score.n_val));
}

#[test]
fn attribute_disclosure_is_deterministic_for_a_fixed_seed() {
    let options = EvaluateOptions::default();
    let run = || {
        let ctx = EvalContext::new(
            structured_frame(60, 3),
            structured_frame(60, 4),
            mixed_partition(),
        )
        .with_seed(5);
        let mut metric = AttributeDisclosure::new(ctx);
        metric.evaluate(&options).expect("evaluate")
    };
    assert_eq!(run(), run());
}

#[test]
fn repeated_evaluation_overwrites_the_stored_result() {
    let ctx = EvalContext::new(
        structured_frame(40, 5),
        structured_frame(40, 6),
        mixed_partition(),
    )
    .with_seed(5);
    let mut metric = AttributeDisclosure::new(ctx);
    let options = EvaluateOptions::default();
    let first = metric.evaluate(&options).expect("first");
    let second = metric.evaluate(&options).expect("second");
    assert_eq!(first, second);
    assert_eq!(metric.result().expect("result").f1, second["f1"]);
}

#[test]
fn holdout_changes_the_population_but_not_the_result_shape() {
    let options = EvaluateOptions::default();
    let without = {
        let ctx = EvalContext::new(
            structured_frame(50, 7),
            structured_frame(50, 8),
            mixed_partition(),
        );
        let mut metric = AttributeDisclosure::new(ctx);
        metric.evaluate(&options).expect("evaluate")
    };
    let with = {
        let ctx = EvalContext::new(
            structured_frame(50, 7),
            structured_frame(50, 8),
            mixed_partition(),
        )
        .with_holdout(structured_frame(25, 9));
        let mut metric = AttributeDisclosure::new(ctx);
        metric.evaluate(&options).expect("evaluate")
    };
    let without_keys: Vec<&String> = without.keys().collect();
    let with_keys: Vec<&String> = with.keys().collect();
    assert_eq!(without_keys, with_keys);
}

#[test]
fn uncorrelated_noise_keeps_disclosure_low() {
    // The synthetic split carries no signal about the real columns, so the
    // categorical attacker cannot beat the base rate by much.
    let ctx = EvalContext::new(structured_frame(120, 10), noise_frame(120, 11), mixed_partition())
        .with_seed(13);
    let mut metric = AttributeDisclosure::new(ctx);
    let output = metric.evaluate(&EvaluateOptions::default()).expect("evaluate");
    assert!(
        output["f1"] < 0.9,
        "noise attacker scored f1 {}",
        output["f1"]
    );
}

#[test]
fn schema_mismatch_is_fatal_and_names_the_metric() {
    let real = structured_frame(10, 1);
    let synt = Frame::from_columns(vec![(
        "other".to_string(),
        ColumnData::Numerical(vec![0.0; 10]),
    )])
    .expect("frame");
    let partition = mixed_partition();
    let mut metric = AttributeDisclosure::new(EvalContext::new(real, synt, partition));
    let err = metric
        .evaluate(&EvaluateOptions::default())
        .expect_err("schema mismatch must be fatal");
    let message = err.to_string();
    assert!(message.contains("attr_discl"));
    assert!(message.contains("schema"));
}

#[test]
fn outputs_before_evaluate_fail_clearly() {
    let ctx = EvalContext::new(
        structured_frame(10, 1),
        structured_frame(10, 2),
        mixed_partition(),
    );
    let metric = AttributeDisclosure::new(ctx.clone());
    assert!(matches!(
        metric.format_output(),
        Err(MetricError::NotEvaluated { metric: "attr_discl" })
    ));
    assert!(matches!(
        metric.normalize_output(),
        Err(MetricError::NotEvaluated { metric: "attr_discl" })
    ));

    let dcr = MedianDcr::new(ctx);
    assert!(matches!(
        dcr.format_output(),
        Err(MetricError::NotEvaluated { metric: "dcr" })
    ));
}

#[test]
fn undersized_real_split_error_names_the_metric() {
    // One real row leaves no usable neighbors for the self-excluded
    // baseline, and the resulting error must name the metric, not the
    // distance helper.
    let ctx = EvalContext::new(
        structured_frame(1, 50),
        structured_frame(5, 51),
        mixed_partition(),
    );
    let mut metric = MedianDcr::new(ctx);
    let err = metric
        .evaluate(&EvaluateOptions::default())
        .expect_err("one real row cannot support the baseline");
    assert!(matches!(
        err,
        MetricError::Configuration { metric: "dcr", .. }
    ));
    assert!(err.to_string().contains("dcr"));
}

#[test]
fn identical_synthetic_data_has_zero_dcr() {
    let real = structured_frame(50, 20);
    let synt = real.clone();
    let ctx = EvalContext::new(real, synt, mixed_partition()).with_distance(DistanceKind::Euclid);
    let mut metric = MedianDcr::new(ctx);

    let output = metric.evaluate(&EvaluateOptions::default()).expect("evaluate");
    assert_eq!(output["mDCR"], 0.0);

    let normalized = metric.normalize_output().expect("normalize");
    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].val, 0.0);
    assert_eq!(normalized[0].err, 0.0);
    assert_eq!(normalized[0].metric, "median_dcr");

    let line = metric.format_output().expect("format");
    assert!(line.starts_with("| Median distance to closest record"));
    assert!(line.contains("0.0000"));
}

#[test]
fn independent_synthetic_data_has_positive_bounded_dcr() {
    let ctx = EvalContext::new(structured_frame(60, 30), noise_frame(60, 31), mixed_partition())
        .with_distance(DistanceKind::Gower);
    let mut metric = MedianDcr::new(ctx);
    let output = metric.evaluate(&EvaluateOptions::default()).expect("evaluate");
    assert!(output["mDCR"] > 0.0);

    let normalized = metric.normalize_output().expect("normalize");
    assert!(normalized[0].val > 0.0 && normalized[0].val < 1.0);
}

#[test]
fn registry_drives_metrics_through_the_uniform_contract() {
    let registry = MetricRegistry::new();
    let options = EvaluateOptions::default();
    for name in registry.names() {
        let ctx = EvalContext::new(
            structured_frame(30, 40),
            structured_frame(30, 41),
            mixed_partition(),
        )
        .with_distance(DistanceKind::Euclid);
        let mut metric = registry.create(name, ctx).expect("create");
        assert_eq!(metric.name(), name);
        let output = metric.evaluate(&options).expect("evaluate");
        assert!(!output.is_empty());
        assert!(!metric.format_output().expect("format").is_empty());
        assert_eq!(metric.normalize_output().expect("normalize").len(), 1);
    }
}
