//! Conversion of loosely-typed grading-service payloads into the canonical
//! model. Nothing untyped leaves this module.

use crate::calc;
use crate::model::{GradeSnapshot, QuestionGrade, RubricItem, Submission, SubmissionStatus};
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

pub const NO_FEEDBACK: &str = "No feedback available";

#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
    #[serde(default, alias = "questionId")]
    question_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "studentAnswer")]
    student_answer: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, alias = "maxPoints")]
    max_points: Option<f64>,
    #[serde(default)]
    feedback: Option<String>,
}

impl RawQuestion {
    fn key(&self) -> Option<&str> {
        self.question_id
            .as_deref()
            .or(self.id.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawGradeResult {
    #[serde(default)]
    assignment_type: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: String,
    #[serde(default)]
    student_name: String,
    #[serde(default)]
    student_id: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    assignment_type: String,
    #[serde(default)]
    submitted_at: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
    #[serde(default)]
    graded_at: Option<String>,
    #[serde(default)]
    released_at: Option<String>,
}

/// Strips the `{ "success": .., "<key>": .. }` envelope some service versions
/// wrap their answers in.
fn unwrap_envelope<'a>(
    value: &'a serde_json::Value,
    key: &str,
) -> anyhow::Result<&'a serde_json::Value> {
    if value.get("success").and_then(|v| v.as_bool()) == Some(false) {
        let message = value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("service reported failure");
        bail!("{message}");
    }
    Ok(value.get(key).unwrap_or(value))
}

/// Checks a release acknowledgement for an explicit failure flag.
pub fn check_ack(value: &serde_json::Value) -> anyhow::Result<()> {
    unwrap_envelope(value, "message").map(|_| ())
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| t.with_timezone(&Utc))
}

pub fn normalize_grade_payload(
    value: &serde_json::Value,
    submission: &Submission,
) -> anyhow::Result<GradeSnapshot> {
    let inner = unwrap_envelope(value, "grading_result")?;
    let raw: RawGradeResult =
        serde_json::from_value(inner.clone()).context("malformed grading result")?;
    if raw.questions.is_empty() {
        bail!("grading result has no questions");
    }

    let mut questions: Vec<QuestionGrade> = Vec::with_capacity(raw.questions.len());
    for rq in &raw.questions {
        let Some(question_id) = rq.key() else {
            bail!("grading result question without id");
        };
        if questions.iter().any(|q| q.question_id == question_id) {
            bail!("duplicate question id in grading result: {question_id}");
        }
        let rubric = submission
            .questions
            .iter()
            .find(|r| r.question_id == question_id);
        let max_points = rq
            .max_points
            .or(rubric.map(|r| r.max_points))
            .filter(|m| *m > 0.0)
            .ok_or_else(|| anyhow!("question {question_id} has no usable max_points"))?;

        questions.push(QuestionGrade {
            question_id: question_id.to_string(),
            description: rq
                .description
                .clone()
                .or_else(|| rubric.map(|r| r.description.clone()))
                .unwrap_or_default(),
            student_answer: rq
                .student_answer
                .clone()
                .or_else(|| rubric.and_then(|r| r.student_answer.clone())),
            score: calc::clamp_score(rq.score.unwrap_or(0.0), max_points),
            max_points,
            feedback: rq
                .feedback
                .clone()
                .unwrap_or_else(|| NO_FEEDBACK.to_string()),
            edited: false,
        });
    }

    let assignment_type = if submission.assignment_type.is_empty() {
        raw.assignment_type.unwrap_or_default()
    } else {
        submission.assignment_type.clone()
    };
    let mut snapshot = GradeSnapshot {
        submission_id: submission.id.clone(),
        student_name: submission.student_name.clone(),
        filename: submission.filename.clone(),
        assignment_type,
        questions,
        total_score: 0.0,
        max_total: 0.0,
        percentage: 0.0,
    };
    calc::apply_totals(&mut snapshot);
    tracing::debug!(
        submission_id = %submission.id,
        total = snapshot.total_score,
        max = snapshot.max_total,
        "normalized grading payload"
    );
    Ok(snapshot)
}

fn normalize_submission(raw: RawSubmission) -> anyhow::Result<Submission> {
    let status = match raw.status.as_deref() {
        None => SubmissionStatus::PendingGrading,
        Some(s) => SubmissionStatus::parse(s)
            .ok_or_else(|| anyhow!("submission {}: unknown status {s:?}", raw.id))?,
    };

    let mut rubric: Vec<RubricItem> = Vec::with_capacity(raw.questions.len());
    for rq in &raw.questions {
        let Some(question_id) = rq.key() else {
            bail!("submission {}: question without id", raw.id);
        };
        let max_points = rq
            .max_points
            .filter(|m| *m > 0.0)
            .ok_or_else(|| anyhow!("submission {}: question {question_id} lacks max_points", raw.id))?;
        rubric.push(RubricItem {
            question_id: question_id.to_string(),
            description: rq.description.clone().unwrap_or_default(),
            max_points,
            student_answer: rq.student_answer.clone(),
        });
    }

    let grade_snapshot = if status == SubmissionStatus::PendingGrading {
        None
    } else {
        let questions = raw
            .questions
            .iter()
            .zip(rubric.iter())
            .map(|(rq, item)| QuestionGrade {
                question_id: item.question_id.clone(),
                description: item.description.clone(),
                student_answer: item.student_answer.clone(),
                score: calc::clamp_score(rq.score.unwrap_or(0.0), item.max_points),
                max_points: item.max_points,
                feedback: rq
                    .feedback
                    .clone()
                    .unwrap_or_else(|| NO_FEEDBACK.to_string()),
                edited: false,
            })
            .collect();
        let mut snap = GradeSnapshot {
            submission_id: raw.id.clone(),
            student_name: raw.student_name.clone(),
            filename: raw.filename.clone(),
            assignment_type: raw.assignment_type.clone(),
            questions,
            total_score: 0.0,
            max_total: 0.0,
            percentage: 0.0,
        };
        calc::apply_totals(&mut snap);
        Some(snap)
    };

    Ok(Submission {
        submitted_at: parse_timestamp(raw.submitted_at.as_deref()).unwrap_or_else(Utc::now),
        graded_at: parse_timestamp(raw.graded_at.as_deref()),
        released_at: parse_timestamp(raw.released_at.as_deref()),
        reviewed_at: None,
        id: raw.id,
        student_name: raw.student_name,
        student_id: raw.student_id,
        filename: raw.filename,
        assignment_type: raw.assignment_type,
        status,
        questions: rubric,
        original_snapshot: grade_snapshot.clone(),
        grade_snapshot,
    })
}

/// Accepts either a bare array or `{ "success": true, "submissions": [...] }`.
pub fn normalize_submission_list(value: &serde_json::Value) -> anyhow::Result<Vec<Submission>> {
    let inner = unwrap_envelope(value, "submissions")?;
    let raw: Vec<RawSubmission> =
        serde_json::from_value(inner.clone()).context("malformed submission list")?;
    raw.into_iter().map(normalize_submission).collect()
}

pub fn load_roster_file(path: &Path) -> anyhow::Result<Vec<Submission>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.to_string_lossy()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("roster {} is not valid JSON", path.to_string_lossy()))?;
    normalize_submission_list(&value)
}
