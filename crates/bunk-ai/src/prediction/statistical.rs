use super::artifact::TrainedModelArtifact;
use super::domain::{PredictionInput, PredictionResult, Recommendation};
use super::explain::narrative;
use super::features::FeatureVector;

/// Probability at or above which bunking is considered safe.
const SAFE_THRESHOLD: f64 = 0.7;
/// Probability at or above which the risk is merely moderate.
const MODERATE_THRESHOLD: f64 = 0.4;

/// Backend wrapping the trained logistic classifier and its feature scaler.
/// All state is read-only after construction.
#[derive(Debug, Clone)]
pub struct StatisticalPredictor {
    artifact: TrainedModelArtifact,
}

impl StatisticalPredictor {
    pub fn new(artifact: TrainedModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &TrainedModelArtifact {
        &self.artifact
    }

    /// Normalize, scale, score, and bucket. The facade converts any failure
    /// into a degraded result, so callers never see an error surface.
    pub fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictionFailure> {
        let features = FeatureVector::from_input(input);
        let mut probability_safe = self.artifact.probability_safe(&features);

        if !probability_safe.is_finite() {
            return Err(PredictionFailure::NonFiniteProbability);
        }

        // "No upcoming exam" has no clean encoding in the trained feature
        // set (urgency saturates at 1.0, the same as an exam today), so the
        // sentinel gets a post-hoc boost the features cannot produce.
        if !input.has_upcoming_exam() && probability_safe > 0.3 {
            probability_safe = (probability_safe + 0.2).min(0.9);
        }

        let recommendation = bucket(probability_safe);
        let probability_not_safe = 1.0 - probability_safe;

        Ok(PredictionResult {
            recommendation,
            confidence: round4(probability_safe.max(probability_not_safe)),
            risk_level: recommendation.risk_level(),
            factors: input.factors(),
            explanation: narrative(input),
            probability_safe: Some(round4(probability_safe)),
            probability_not_safe: Some(round4(probability_not_safe)),
        })
    }
}

fn bucket(probability_safe: f64) -> Recommendation {
    if probability_safe >= SAFE_THRESHOLD {
        Recommendation::SafeToBunk
    } else if probability_safe >= MODERATE_THRESHOLD {
        Recommendation::ModerateRisk
    } else {
        Recommendation::NotSafe
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Unexpected failure inside the statistical backend.
#[derive(Debug, thiserror::Error)]
pub enum PredictionFailure {
    #[error("classifier produced a non-finite probability")]
    NonFiniteProbability,
}
