use serde::{Deserialize, Serialize};

/// Width of the window used to convert a proximity score into a day count.
const PROXIMITY_WINDOW_DAYS: f64 = 30.0;

/// Validated input for a single prediction. Immutable once constructed;
/// out-of-range or non-finite values never reach the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionInput {
    attendance_percentage: f64,
    exam_proximity: f64,
    syllabus_completion: f64,
    past_performance: f64,
}

impl PredictionInput {
    pub fn new(
        attendance_percentage: f64,
        exam_proximity: f64,
        syllabus_completion: f64,
        past_performance: f64,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("attendance_percentage", attendance_percentage),
            ("exam_proximity", exam_proximity),
            ("syllabus_completion", syllabus_completion),
            ("past_performance", past_performance),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }

        if !(0.0..=100.0).contains(&attendance_percentage) {
            return Err(ValidationError::AttendanceOutOfRange);
        }
        if !(0.0..=1.0).contains(&exam_proximity) {
            return Err(ValidationError::ExamProximityOutOfRange);
        }
        if !(0.0..=100.0).contains(&syllabus_completion) {
            return Err(ValidationError::SyllabusOutOfRange);
        }
        if !(0.0..=100.0).contains(&past_performance) {
            return Err(ValidationError::PastPerformanceOutOfRange);
        }

        Ok(Self {
            attendance_percentage,
            exam_proximity,
            syllabus_completion,
            past_performance,
        })
    }

    pub fn attendance_percentage(&self) -> f64 {
        self.attendance_percentage
    }

    pub fn exam_proximity(&self) -> f64 {
        self.exam_proximity
    }

    pub fn syllabus_completion(&self) -> f64 {
        self.syllabus_completion
    }

    pub fn past_performance(&self) -> f64 {
        self.past_performance
    }

    pub fn exam_schedule(&self) -> ExamSchedule {
        if self.exam_proximity >= 1.0 {
            ExamSchedule::NoneScheduled
        } else {
            let days = (self.exam_proximity * PROXIMITY_WINDOW_DAYS).round() as u32;
            ExamSchedule::InDays(days.max(1))
        }
    }

    pub fn has_upcoming_exam(&self) -> bool {
        matches!(self.exam_schedule(), ExamSchedule::InDays(_))
    }

    /// Days until the next exam; 0 when none is scheduled.
    pub fn days_until_exam(&self) -> u32 {
        self.exam_schedule().days()
    }

    /// Echo of the raw inputs carried on every result for display.
    pub fn factors(&self) -> PredictionFactors {
        PredictionFactors {
            attendance: self.attendance_percentage,
            exam_proximity: f64::from(self.days_until_exam()),
            syllabus_progress: self.syllabus_completion,
            past_performance: self.past_performance,
        }
    }
}

/// Exam outlook derived from the `exam_proximity` score.
///
/// A proximity of exactly 1.0 is the sentinel for "no upcoming exam". Every
/// other value maps to `max(1, round(proximity * 30))` days, so a smaller
/// proximity means a closer exam. The mapping is approximate, lossy, and not
/// invertible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamSchedule {
    NoneScheduled,
    InDays(u32),
}

impl ExamSchedule {
    pub fn days(self) -> u32 {
        match self {
            ExamSchedule::NoneScheduled => 0,
            ExamSchedule::InDays(days) => days,
        }
    }
}

/// Three-way verdict exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Safe to Bunk")]
    SafeToBunk,
    #[serde(rename = "Moderate Risk")]
    ModerateRisk,
    #[serde(rename = "Not Safe")]
    NotSafe,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::SafeToBunk => "Safe to Bunk",
            Recommendation::ModerateRisk => "Moderate Risk",
            Recommendation::NotSafe => "Not Safe",
        }
    }

    /// Risk bucket paired 1:1 with the recommendation.
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            Recommendation::SafeToBunk => RiskLevel::Low,
            Recommendation::ModerateRisk => RiskLevel::Medium,
            Recommendation::NotSafe => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Raw inputs echoed back on every result. `exam_proximity` is reported in
/// days here, matching what the engine actually consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactors {
    pub attendance: f64,
    pub exam_proximity: f64,
    pub syllabus_progress: f64,
    pub past_performance: f64,
}

/// Output record shared by both backends. Constructed once per request,
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub factors: PredictionFactors,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_safe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_not_safe: Option<f64>,
}

impl PredictionResult {
    /// Conservative answer returned when a backend misbehaves. The service
    /// always produces a decision, never a raw failure.
    pub fn degraded(input: &PredictionInput) -> Self {
        Self {
            recommendation: Recommendation::NotSafe,
            confidence: 0.5,
            risk_level: RiskLevel::High,
            factors: input.factors(),
            explanation: "Error in prediction calculation".to_string(),
            probability_safe: None,
            probability_not_safe: None,
        }
    }
}

/// Rejection raised before any backend is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("attendance_percentage must be between 0 and 100")]
    AttendanceOutOfRange,
    #[error("exam_proximity must be between 0 and 1")]
    ExamProximityOutOfRange,
    #[error("syllabus_completion must be between 0 and 100")]
    SyllabusOutOfRange,
    #[error("past_performance must be between 0 and 100")]
    PastPerformanceOutOfRange,
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}
