use chrono::Utc;

use crate::prediction::artifact::{FeatureScaler, TrainedModelArtifact, TrainingMetrics};
use crate::prediction::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::prediction::PredictionInput;

pub(super) fn input(
    attendance: f64,
    proximity: f64,
    syllabus: f64,
    performance: f64,
) -> PredictionInput {
    PredictionInput::new(attendance, proximity, syllabus, performance).expect("valid input")
}

/// Input whose proximity round-trips to exactly `days` under the
/// proximity-to-days conversion.
pub(super) fn input_with_exam_in(
    days: u32,
    attendance: f64,
    syllabus: f64,
    performance: f64,
) -> PredictionInput {
    input(attendance, f64::from(days) / 30.0, syllabus, performance)
}

pub(super) fn sample_metrics() -> TrainingMetrics {
    TrainingMetrics {
        train_accuracy: 0.91,
        test_accuracy: 0.89,
        auc_score: 0.94,
        training_samples: 1600,
        test_samples: 400,
        trained_at: Utc::now(),
    }
}

/// Artifact with zero weights and an identity scaler: every prediction
/// scores `sigmoid(intercept)`, letting tests pin the probability exactly.
pub(super) fn flat_artifact(intercept: f64) -> TrainedModelArtifact {
    TrainedModelArtifact {
        model_version: "1.0".to_string(),
        feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        coefficients: vec![0.0; FEATURE_COUNT],
        intercept,
        scaler: FeatureScaler {
            means: vec![0.0; FEATURE_COUNT],
            stds: vec![1.0; FEATURE_COUNT],
        },
        metrics: sample_metrics(),
    }
}

/// Intercept that makes the flat artifact score exactly `probability`.
pub(super) fn logit(probability: f64) -> f64 {
    (probability / (1.0 - probability)).ln()
}
