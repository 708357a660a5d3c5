use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::artifact::{ModelError, TrainedModelArtifact, TrainingMetrics};
use super::domain::{PredictionInput, PredictionResult, Recommendation};
use super::features::FEATURE_NAMES;
use super::rules::RulePredictor;
use super::statistical::StatisticalPredictor;

/// Version string reported in model info and response metadata.
pub const MODEL_VERSION: &str = "1.0";

/// Which backend the facade is serving from. The transition from ML-active
/// to rule-only happens at most once, at construction, and is permanent for
/// the process lifetime; a restart is required to re-attempt the model load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorMode {
    MlActive,
    RuleOnly,
}

impl PredictorMode {
    pub const fn label(self) -> &'static str {
        match self {
            PredictorMode::MlActive => "statistical",
            PredictorMode::RuleOnly => "rule-based",
        }
    }
}

enum Backend {
    Statistical(StatisticalPredictor),
    RuleOnly(RulePredictor),
}

/// Facade exposing one uniform `predict` contract regardless of backend.
///
/// Constructed explicitly at startup and shared read-only across request
/// handlers; there is no global, lazily initialized state.
pub struct PredictionService {
    backend: Backend,
}

impl PredictionService {
    /// Attempt the one-time artifact load, falling back permanently to the
    /// rule cascade if it is absent or structurally incompatible.
    pub fn initialize(artifact_path: &Path) -> Self {
        Self::from_load_result(TrainedModelArtifact::load(artifact_path))
    }

    pub fn from_load_result(result: Result<TrainedModelArtifact, ModelError>) -> Self {
        let backend = match result {
            Ok(artifact) => {
                info!(
                    test_accuracy = artifact.metrics.test_accuracy,
                    "trained model loaded, serving statistical predictions"
                );
                Backend::Statistical(StatisticalPredictor::new(artifact))
            }
            Err(err) => {
                warn!(%err, "trained model unavailable, serving rule-based predictions");
                Backend::RuleOnly(RulePredictor)
            }
        };

        Self { backend }
    }

    pub fn mode(&self) -> PredictorMode {
        match self.backend {
            Backend::Statistical(_) => PredictorMode::MlActive,
            Backend::RuleOnly(_) => PredictorMode::RuleOnly,
        }
    }

    /// Always returns a decision. A backend failure is converted into the
    /// conservative degraded result rather than propagated.
    pub fn predict(&self, input: &PredictionInput) -> PredictionResult {
        let attempt = match &self.backend {
            Backend::Statistical(predictor) => predictor.predict(input),
            Backend::RuleOnly(predictor) => Ok(predictor.predict(input)),
        };

        match attempt {
            Ok(result) => result,
            Err(failure) => {
                warn!(%failure, "prediction backend failed, returning degraded result");
                PredictionResult::degraded(input)
            }
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        match &self.backend {
            Backend::Statistical(predictor) => {
                let artifact = predictor.artifact();
                ModelInfo {
                    model_type: "Logistic Regression",
                    model_version: MODEL_VERSION,
                    features: artifact.feature_names.clone(),
                    feature_importance: Some(artifact.feature_importance()),
                    metrics: Some(artifact.metrics.clone()),
                    description:
                        "Binary classifier estimating whether it is safe to bunk a class",
                    input_ranges: INPUT_RANGES,
                    output_classes: OUTPUT_CLASSES,
                }
            }
            Backend::RuleOnly(_) => ModelInfo {
                model_type: "Rule-based Logic",
                model_version: MODEL_VERSION,
                features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
                feature_importance: None,
                metrics: None,
                description:
                    "Deterministic rule cascade estimating whether it is safe to bunk a class",
                input_ranges: INPUT_RANGES,
                output_classes: OUTPUT_CLASSES,
            },
        }
    }
}

const OUTPUT_CLASSES: [&str; 3] = [
    Recommendation::SafeToBunk.label(),
    Recommendation::ModerateRisk.label(),
    Recommendation::NotSafe.label(),
];

const INPUT_RANGES: InputRanges = InputRanges {
    attendance_percentage: "0-100",
    exam_proximity: "0-1 (1.0 = no upcoming exam; lower = closer)",
    syllabus_completion: "0-100",
    past_performance: "0-100",
};

/// Metadata describing the serving backend, surfaced by the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: &'static str,
    pub model_version: &'static str,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<Vec<FeatureWeight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrainingMetrics>,
    pub description: &'static str,
    pub input_ranges: InputRanges,
    pub output_classes: [&'static str; 3],
}

/// One entry in the coefficient-magnitude ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// Documented domain of each raw input.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InputRanges {
    pub attendance_percentage: &'static str,
    pub exam_proximity: &'static str,
    pub syllabus_completion: &'static str,
    pub past_performance: &'static str,
}
