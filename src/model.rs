use crate::error::GradingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingGrading,
    Graded,
    Released,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::PendingGrading => "pending_grading",
            SubmissionStatus::Graded => "graded",
            SubmissionStatus::Released => "released",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending_grading" | "pending" => Some(SubmissionStatus::PendingGrading),
            "graded" => Some(SubmissionStatus::Graded),
            "released" => Some(SubmissionStatus::Released),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rubric item of a submission, before any grading happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricItem {
    pub question_id: String,
    pub description: String,
    pub max_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_answer: Option<String>,
}

/// Rejects blank or duplicate question ids and `max_points` that are not
/// strictly positive.
pub fn check_question_set<'a, I>(items: I) -> Result<(), GradingError>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut seen: Vec<&str> = Vec::new();
    for (question_id, max_points) in items {
        if question_id.trim().is_empty() {
            return Err(GradingError::InvalidQuestions(
                "question without an id".to_string(),
            ));
        }
        if seen.contains(&question_id) {
            return Err(GradingError::InvalidQuestions(format!(
                "duplicate question id {question_id}"
            )));
        }
        if max_points.is_nan() || max_points <= 0.0 {
            return Err(GradingError::InvalidQuestions(format!(
                "question {question_id} has non-positive max points"
            )));
        }
        seen.push(question_id);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionGrade {
    pub question_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_answer: Option<String>,
    pub score: f64,
    pub max_points: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub edited: bool,
}

/// A complete scoring result for one submission. `total_score`, `max_total`
/// and `percentage` are derived from `questions`; see `calc::aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSnapshot {
    #[serde(default)]
    pub submission_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub assignment_type: String,
    pub questions: Vec<QuestionGrade>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub max_total: f64,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_name: String,
    pub student_id: String,
    pub filename: String,
    pub assignment_type: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub questions: Vec<RubricItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_snapshot: Option<GradeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    /// The snapshot exactly as grading produced it. Review edits are measured
    /// against it; it never changes after `grade` or import.
    #[serde(skip)]
    pub original_snapshot: Option<GradeSnapshot>,
}

impl Submission {
    /// A freshly uploaded submission: `pending_grading`, no snapshot.
    pub fn pending(
        id: impl Into<String>,
        student_name: impl Into<String>,
        student_id: impl Into<String>,
        filename: impl Into<String>,
        assignment_type: impl Into<String>,
        questions: Vec<RubricItem>,
    ) -> Self {
        Self {
            id: id.into(),
            student_name: student_name.into(),
            student_id: student_id.into(),
            filename: filename.into(),
            assignment_type: assignment_type.into(),
            submitted_at: Utc::now(),
            status: SubmissionStatus::PendingGrading,
            questions,
            grade_snapshot: None,
            graded_at: None,
            reviewed_at: None,
            released_at: None,
            original_snapshot: None,
        }
    }
}
