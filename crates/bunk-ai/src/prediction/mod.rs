//! Bunk-risk prediction engine.
//!
//! Raw inputs flow through the [`PredictionService`] facade, which delegates
//! to either the trained statistical backend or the deterministic rule
//! cascade. Both produce the same [`PredictionResult`] contract enriched
//! with a human-readable narrative.

pub mod artifact;
pub mod domain;
pub(crate) mod explain;
pub mod features;
pub mod rules;
pub mod service;
pub mod statistical;

#[cfg(test)]
mod tests;

pub use artifact::{FeatureScaler, ModelError, TrainedModelArtifact, TrainingMetrics};
pub use domain::{
    ExamSchedule, PredictionFactors, PredictionInput, PredictionResult, Recommendation, RiskLevel,
    ValidationError,
};
pub use explain::narrative;
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use rules::{evaluate, RuleOutcome, RulePredictor};
pub use service::{
    FeatureWeight, InputRanges, ModelInfo, PredictionService, PredictorMode, MODEL_VERSION,
};
pub use statistical::{PredictionFailure, StatisticalPredictor};
