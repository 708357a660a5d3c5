use super::domain::{
    ExamSchedule, PredictionInput, PredictionResult, Recommendation, RiskLevel,
};
use super::explain::narrative;

/// Verdict of the deterministic cascade. The risk bucket is derived from the
/// recommendation, keeping the pairing impossible to break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleOutcome {
    pub recommendation: Recommendation,
    pub confidence: f64,
}

impl RuleOutcome {
    pub fn risk_level(&self) -> RiskLevel {
        self.recommendation.risk_level()
    }
}

const fn outcome(recommendation: Recommendation, confidence: f64) -> RuleOutcome {
    RuleOutcome {
        recommendation,
        confidence,
    }
}

/// Priority-ordered cascade, evaluated top to bottom, first match wins.
/// All thresholds are inclusive; there is no randomization.
///
/// `past_performance` is accepted but deliberately not consulted here; it
/// is carried through for display only, and only the statistical backend
/// weighs it.
pub fn evaluate(input: &PredictionInput) -> RuleOutcome {
    let attendance = input.attendance_percentage();
    let syllabus = input.syllabus_completion();

    let days = match input.exam_schedule() {
        ExamSchedule::NoneScheduled => {
            return if attendance >= 85.0 {
                outcome(Recommendation::SafeToBunk, 0.85)
            } else if attendance >= 75.0 {
                outcome(Recommendation::ModerateRisk, 0.65)
            } else {
                outcome(Recommendation::NotSafe, 0.70)
            };
        }
        ExamSchedule::InDays(days) => days,
    };

    if days <= 2 {
        // Non-negotiable floor: an imminent exam overrides everything else.
        outcome(Recommendation::NotSafe, 0.95)
    } else if days <= 5 {
        if attendance >= 90.0 && syllabus >= 95.0 {
            outcome(Recommendation::ModerateRisk, 0.70)
        } else {
            outcome(Recommendation::NotSafe, 0.85)
        }
    } else if days <= 10 {
        if attendance >= 85.0 && syllabus >= 80.0 {
            outcome(Recommendation::ModerateRisk, 0.65)
        } else {
            outcome(Recommendation::NotSafe, 0.75)
        }
    } else if attendance >= 85.0 && syllabus >= 70.0 {
        outcome(Recommendation::SafeToBunk, 0.80)
    } else if attendance >= 75.0 && syllabus >= 60.0 {
        outcome(Recommendation::ModerateRisk, 0.60)
    } else {
        outcome(Recommendation::NotSafe, 0.70)
    }
}

/// Rule-backed predictor producing the full result contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePredictor;

impl RulePredictor {
    pub fn predict(&self, input: &PredictionInput) -> PredictionResult {
        let verdict = evaluate(input);

        PredictionResult {
            recommendation: verdict.recommendation,
            confidence: verdict.confidence,
            risk_level: verdict.risk_level(),
            factors: input.factors(),
            explanation: narrative(input),
            probability_safe: None,
            probability_not_safe: None,
        }
    }
}
