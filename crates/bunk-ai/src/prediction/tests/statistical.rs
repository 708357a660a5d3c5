use super::common::*;
use crate::prediction::statistical::StatisticalPredictor;
use crate::prediction::{Recommendation, RiskLevel};

#[test]
fn high_probability_maps_to_safe() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.75)));
    let result = predictor
        .predict(&input_with_exam_in(15, 90.0, 85.0, 80.0))
        .expect("prediction succeeds");

    assert_eq!(result.recommendation, Recommendation::SafeToBunk);
    assert_eq!(result.risk_level, RiskLevel::Low);
    let probability = result.probability_safe.expect("probability present");
    assert!((probability - 0.75).abs() < 1e-9);
    assert!((result.confidence - 0.75).abs() < 1e-9);
}

#[test]
fn mid_probability_maps_to_moderate() {
    let predictor = StatisticalPredictor::new(flat_artifact(0.0));
    let result = predictor
        .predict(&input_with_exam_in(15, 80.0, 70.0, 70.0))
        .expect("prediction succeeds");

    assert_eq!(result.recommendation, Recommendation::ModerateRisk);
    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert!((result.probability_safe.unwrap() - 0.5).abs() < 1e-9);
    assert!((result.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn low_probability_maps_to_not_safe_with_inverted_confidence() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.2)));
    let result = predictor
        .predict(&input_with_exam_in(15, 60.0, 40.0, 50.0))
        .expect("prediction succeeds");

    assert_eq!(result.recommendation, Recommendation::NotSafe);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert!((result.probability_safe.unwrap() - 0.2).abs() < 1e-9);
    assert!((result.probability_not_safe.unwrap() - 0.8).abs() < 1e-9);
    assert!((result.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn probabilities_are_complementary() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.63)));
    let result = predictor
        .predict(&input_with_exam_in(10, 80.0, 70.0, 70.0))
        .expect("prediction succeeds");

    let total = result.probability_safe.unwrap() + result.probability_not_safe.unwrap();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn no_exam_sentinel_boosts_the_probability() {
    // 0.35 would bucket as Not Safe; the sentinel boost lifts it to 0.55.
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.35)));

    let with_exam = predictor
        .predict(&input_with_exam_in(15, 80.0, 70.0, 70.0))
        .expect("prediction succeeds");
    assert_eq!(with_exam.recommendation, Recommendation::NotSafe);

    let no_exam = predictor
        .predict(&input(80.0, 1.0, 70.0, 70.0))
        .expect("prediction succeeds");
    assert_eq!(no_exam.recommendation, Recommendation::ModerateRisk);
    assert!((no_exam.probability_safe.unwrap() - 0.55).abs() < 1e-9);
}

#[test]
fn sentinel_boost_is_capped_at_ninety_percent() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.8)));
    let result = predictor
        .predict(&input(90.0, 1.0, 90.0, 90.0))
        .expect("prediction succeeds");

    assert!((result.probability_safe.unwrap() - 0.9).abs() < 1e-9);
    assert_eq!(result.recommendation, Recommendation::SafeToBunk);
}

#[test]
fn sentinel_boost_skips_hopeless_cases() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.25)));
    let result = predictor
        .predict(&input(40.0, 1.0, 30.0, 30.0))
        .expect("prediction succeeds");

    assert!((result.probability_safe.unwrap() - 0.25).abs() < 1e-9);
    assert_eq!(result.recommendation, Recommendation::NotSafe);
}

#[test]
fn prediction_is_idempotent() {
    let predictor = StatisticalPredictor::new(flat_artifact(logit(0.6)));
    let sample = input_with_exam_in(9, 83.0, 72.0, 68.0);

    let first = predictor.predict(&sample).expect("prediction succeeds");
    let second = predictor.predict(&sample).expect("prediction succeeds");
    assert_eq!(first, second);
}

#[test]
fn non_finite_scores_surface_as_failures() {
    let mut artifact = flat_artifact(0.0);
    artifact.coefficients[0] = f64::NAN;
    let predictor = StatisticalPredictor::new(artifact);

    let result = predictor.predict(&input_with_exam_in(10, 80.0, 70.0, 70.0));
    assert!(result.is_err());
}
