use crate::calc::{self, LetterGrade, ScoreSummary};
use crate::model::Submission;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuestion {
    pub question_id: String,
    pub description: String,
    pub score: f64,
    pub max_points: f64,
    pub feedback: String,
}

/// Read-only view of a graded submission as the student sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub submission_id: String,
    pub student_name: String,
    pub student_id: String,
    pub filename: String,
    pub assignment_type: String,
    pub released: bool,
    pub graded_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub summary: ScoreSummary,
    pub overall_comment: &'static str,
    pub questions: Vec<ReportQuestion>,
}

fn overall_comment(letter: LetterGrade) -> &'static str {
    match letter {
        LetterGrade::A => "Excellent work! You demonstrated a strong understanding of the concepts and provided clear, well-reasoned solutions.",
        LetterGrade::B => "Good work overall! You showed solid understanding with room for improvement in some areas.",
        LetterGrade::C => "Satisfactory work. Consider reviewing the feedback below to strengthen your understanding.",
        LetterGrade::D => "Your work shows effort, but there are several areas that need improvement. Please review the feedback carefully.",
        LetterGrade::F => "This submission needs significant improvement. Please review the feedback and consider seeking additional help.",
    }
}

/// Returns `None` for submissions that have not been graded yet.
pub fn student_report(submission: &Submission) -> Option<StudentReport> {
    let snapshot = submission.grade_snapshot.as_ref()?;
    let summary = calc::summarize(snapshot);
    Some(StudentReport {
        submission_id: submission.id.clone(),
        student_name: submission.student_name.clone(),
        student_id: submission.student_id.clone(),
        filename: submission.filename.clone(),
        assignment_type: submission.assignment_type.clone(),
        released: submission.released_at.is_some(),
        graded_at: submission.graded_at,
        released_at: submission.released_at,
        overall_comment: overall_comment(summary.letter),
        summary,
        questions: snapshot
            .questions
            .iter()
            .map(|q| ReportQuestion {
                question_id: q.question_id.clone(),
                description: q.description.clone(),
                score: calc::round_off_1_decimal(q.score),
                max_points: q.max_points,
                feedback: q.feedback.clone(),
            })
            .collect(),
    })
}
