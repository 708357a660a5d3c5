use super::domain::{ExamSchedule, PredictionInput};

/// Three-clause narrative summarizing the factors behind a decision:
/// attendance tier, exam-proximity tier, syllabus tier, joined with "; ".
/// Purely descriptive; the tiers are fixed and independent of which
/// backend produced the decision.
pub fn narrative(input: &PredictionInput) -> String {
    let attendance = input.attendance_percentage();
    let syllabus = input.syllabus_completion();

    let attendance_clause = if attendance >= 85.0 {
        format!("good attendance ({attendance:.0}%)")
    } else if attendance >= 75.0 {
        format!("moderate attendance ({attendance:.0}%)")
    } else {
        format!("low attendance ({attendance:.0}%)")
    };

    let exam_clause = match input.exam_schedule() {
        ExamSchedule::NoneScheduled => "no upcoming exams scheduled".to_string(),
        ExamSchedule::InDays(days) if days <= 1 => "exam is today or tomorrow".to_string(),
        ExamSchedule::InDays(days) if days <= 2 => {
            format!("exam is only {days} days away, urgent")
        }
        ExamSchedule::InDays(days) if days <= 5 => {
            format!("exam is {days} days away, high risk")
        }
        ExamSchedule::InDays(days) if days <= 10 => {
            format!("exam is {days} days away, moderate risk")
        }
        ExamSchedule::InDays(days) => format!("exam is {days} days away, safe distance"),
    };

    let syllabus_clause = if syllabus >= 80.0 {
        format!("good syllabus progress ({syllabus:.0}%)")
    } else if syllabus >= 60.0 {
        format!("moderate syllabus progress ({syllabus:.0}%)")
    } else {
        format!("low syllabus progress ({syllabus:.0}%)")
    };

    format!("{attendance_clause}; {exam_clause}; {syllabus_clause}")
}
