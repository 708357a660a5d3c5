use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use super::service::FeatureWeight;

/// Persisted bundle produced by the training pipeline: classifier weights,
/// feature scaler, feature name list, and training metrics. Read once at
/// startup and held read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelArtifact {
    pub model_version: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler: FeatureScaler,
    pub metrics: TrainingMetrics,
}

impl TrainedModelArtifact {
    /// Load and structurally validate the artifact. Incompatibility is
    /// detected here, once, never per-request.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ModelError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io(source)
            }
        })?;

        let artifact: Self = serde_json::from_str(&raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.len() != FEATURE_COUNT
            || self.coefficients.len() != FEATURE_COUNT
            || self.scaler.means.len() != FEATURE_COUNT
            || self.scaler.stds.len() != FEATURE_COUNT
        {
            return Err(ModelError::Incompatible {
                expected: FEATURE_COUNT,
                found: self.coefficients.len(),
            });
        }

        if self.scaler.stds.iter().any(|std| !(*std > 0.0)) {
            return Err(ModelError::DegenerateScaler);
        }

        if !self.intercept.is_finite()
            || self.coefficients.iter().any(|weight| !weight.is_finite())
            || self.scaler.means.iter().any(|mean| !mean.is_finite())
        {
            return Err(ModelError::NonFiniteWeights);
        }

        Ok(())
    }

    /// Probability that bunking is safe, from the scaled feature vector.
    pub fn probability_safe(&self, features: &FeatureVector) -> f64 {
        let scaled = self.scaler.transform(&features.to_array());
        let logit = self
            .coefficients
            .iter()
            .zip(scaled.iter())
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        sigmoid(logit)
    }

    /// Coefficient magnitudes ranked largest first.
    pub fn feature_importance(&self) -> Vec<FeatureWeight> {
        let mut ranking: Vec<FeatureWeight> = self
            .feature_names
            .iter()
            .zip(self.coefficients.iter())
            .map(|(name, weight)| FeatureWeight {
                feature: name.clone(),
                weight: weight.abs(),
            })
            .collect();
        ranking.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        ranking
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-feature standardization parameters fitted during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl FeatureScaler {
    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, value) in features.iter().enumerate() {
            scaled[i] = (value - self.means[i]) / self.stds[i];
        }
        scaled
    }
}

/// Quality metrics captured when the artifact was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub auc_score: f64,
    pub training_samples: usize,
    pub test_samples: usize,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("model artifact is incompatible: expected {expected} features, found {found}")]
    Incompatible { expected: usize, found: usize },
    #[error("model artifact carries a scaler with non-positive deviations")]
    DegenerateScaler,
    #[error("model artifact carries non-finite weights")]
    NonFiniteWeights,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn identity_scaler() -> FeatureScaler {
        FeatureScaler {
            means: vec![0.0; FEATURE_COUNT],
            stds: vec![1.0; FEATURE_COUNT],
        }
    }

    fn metrics() -> TrainingMetrics {
        TrainingMetrics {
            train_accuracy: 0.9,
            test_accuracy: 0.88,
            auc_score: 0.93,
            training_samples: 1600,
            test_samples: 400,
            trained_at: Utc::now(),
        }
    }

    fn artifact() -> TrainedModelArtifact {
        TrainedModelArtifact {
            model_version: "1.0".to_string(),
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept: 0.0,
            scaler: identity_scaler(),
            metrics: metrics(),
        }
    }

    #[test]
    fn load_round_trips_through_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let original = artifact();
        file.write_all(serde_json::to_string(&original).expect("serializes").as_bytes())
            .expect("writes");

        let loaded = TrainedModelArtifact::load(file.path()).expect("loads");
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_reports_missing_artifacts() {
        let result = TrainedModelArtifact::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ModelError::Missing { .. })));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("writes");
        let result = TrainedModelArtifact::load(file.path());
        assert!(matches!(result, Err(ModelError::Malformed(_))));
    }

    #[test]
    fn validate_rejects_wrong_feature_count() {
        let mut bad = artifact();
        bad.coefficients.pop();
        bad.feature_names.pop();
        assert!(matches!(
            bad.validate(),
            Err(ModelError::Incompatible { expected: 6, .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_deviation_scaler() {
        let mut bad = artifact();
        bad.scaler.stds[2] = 0.0;
        assert!(matches!(bad.validate(), Err(ModelError::DegenerateScaler)));
    }

    #[test]
    fn validate_rejects_non_finite_weights() {
        let mut bad = artifact();
        bad.coefficients[0] = f64::NAN;
        assert!(matches!(bad.validate(), Err(ModelError::NonFiniteWeights)));
    }

    #[test]
    fn zero_weights_score_at_even_odds() {
        let input =
            crate::prediction::PredictionInput::new(80.0, 0.5, 60.0, 70.0).expect("valid input");
        let features = FeatureVector::from_input(&input);
        let probability = artifact().probability_safe(&features);
        assert!((probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn importance_ranks_by_magnitude() {
        let mut model = artifact();
        model.coefficients = vec![0.1, -2.0, 0.5, 0.0, 1.5, -0.3];
        let ranking = model.feature_importance();
        assert_eq!(ranking[0].feature, "exam_urgency");
        assert!((ranking[0].weight - 2.0).abs() < 1e-12);
        assert_eq!(ranking[1].feature, "attendance_syllabus_interaction");
    }
}
