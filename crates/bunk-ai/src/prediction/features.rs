use serde::Serialize;

use super::domain::PredictionInput;

pub const FEATURE_COUNT: usize = 6;

/// Canonical feature ordering shared by the scaler, the classifier weights,
/// and the training pipeline.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "attendance_normalized",
    "exam_urgency",
    "syllabus_normalized",
    "performance_normalized",
    "attendance_syllabus_interaction",
    "exam_preparation_score",
];

/// Normalized feature record consumed by the statistical backend.
///
/// Computed fresh for every prediction and never persisted. Training builds
/// its design matrix through the same constructor, so the engineered
/// features cannot drift between fit time and serving time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub attendance_normalized: f64,
    pub exam_urgency: f64,
    pub syllabus_normalized: f64,
    pub performance_normalized: f64,
    pub attendance_syllabus_interaction: f64,
    pub exam_preparation_score: f64,
}

impl FeatureVector {
    /// Pure function of the validated input; total over its domain.
    pub fn from_input(input: &PredictionInput) -> Self {
        let days = f64::from(input.days_until_exam());
        let attendance_normalized = input.attendance_percentage() / 100.0;
        let syllabus_normalized = input.syllabus_completion() / 100.0;

        Self {
            attendance_normalized,
            exam_urgency: 1.0 / (days + 1.0),
            syllabus_normalized,
            performance_normalized: input.past_performance() / 100.0,
            attendance_syllabus_interaction: attendance_normalized * syllabus_normalized,
            exam_preparation_score: syllabus_normalized * days / 30.0,
        }
    }

    /// Values in `FEATURE_NAMES` order.
    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        [
            self.attendance_normalized,
            self.exam_urgency,
            self.syllabus_normalized,
            self.performance_normalized,
            self.attendance_syllabus_interaction,
            self.exam_preparation_score,
        ]
    }
}
