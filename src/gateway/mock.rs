use super::GradingService;
use crate::calc;
use crate::model::Submission;
use crate::rubrics;
use anyhow::anyhow;
use serde_json::json;

// Fraction of max points awarded per question, cycled in rubric order.
const SCORE_FRACTIONS: [f64; 5] = [0.9, 0.8, 0.95, 0.7, 0.85];

fn feedback_for(score: f64, max_points: f64) -> &'static str {
    let pct = if max_points > 0.0 {
        score / max_points * 100.0
    } else {
        0.0
    };
    if pct >= 90.0 {
        "Excellent work! Clear understanding demonstrated."
    } else if pct >= 80.0 {
        "Good work with minor issues. Well done overall."
    } else if pct >= 70.0 {
        "Decent attempt but some concepts need clarification."
    } else if pct >= 60.0 {
        "Shows some understanding but needs improvement."
    } else {
        "Needs significant improvement. Review the concepts."
    }
}

/// In-process stand-in for the local development grading server. Scores are
/// deterministic so a demo session is reproducible; releases always succeed.
pub struct MockGradingService;

impl MockGradingService {
    fn demo_roster() -> serde_json::Value {
        let calculus = rubrics::rubric_for("calculus_homework").unwrap_or_default();
        let questions = |scores: Option<&[f64]>| -> Vec<serde_json::Value> {
            calculus
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let mut q = json!({
                        "id": item.question_id,
                        "description": item.description,
                        "max_points": item.max_points,
                    });
                    if let Some(scores) = scores {
                        let score = scores.get(i).copied().unwrap_or(0.0);
                        q["score"] = json!(score);
                        q["feedback"] = json!(feedback_for(score, item.max_points));
                    }
                    q
                })
                .collect()
        };

        json!({
            "success": true,
            "submissions": [
                {
                    "id": "sub_001",
                    "student_name": "Alice Johnson",
                    "student_id": "AJ2024",
                    "filename": "calculus_hw1_alice.pdf",
                    "assignment_type": "calculus_homework",
                    "submitted_at": "2024-01-15T14:30:00Z",
                    "status": "pending_grading",
                    "questions": questions(None),
                },
                {
                    "id": "sub_002",
                    "student_name": "Bob Smith",
                    "student_id": "BS2024",
                    "filename": "calculus_hw1_bob.pdf",
                    "assignment_type": "calculus_homework",
                    "submitted_at": "2024-01-15T16:45:00Z",
                    "status": "pending_grading",
                    "questions": questions(None),
                },
                {
                    "id": "sub_014",
                    "student_name": "Noah Brown",
                    "student_id": "NB2024",
                    "filename": "calculus_hw1_noah.pdf",
                    "assignment_type": "calculus_homework",
                    "submitted_at": "2024-01-18T15:45:00Z",
                    "status": "graded",
                    "questions": questions(Some(&[10.0, 12.0, 18.0, 15.0, 9.0][..])),
                    "graded_at": "2024-01-18T17:20:00Z",
                }
            ]
        })
    }
}

impl GradingService for MockGradingService {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_submissions(&self) -> anyhow::Result<serde_json::Value> {
        Ok(Self::demo_roster())
    }

    fn request_grade(&self, submission: &Submission) -> anyhow::Result<serde_json::Value> {
        let items = if submission.questions.is_empty() {
            rubrics::rubric_for(&submission.assignment_type).ok_or_else(|| {
                anyhow!("no rubric for assignment type {}", submission.assignment_type)
            })?
        } else {
            submission.questions.clone()
        };

        let questions: Vec<serde_json::Value> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let fraction = SCORE_FRACTIONS[i % SCORE_FRACTIONS.len()];
                let score = calc::round_off_1_decimal(item.max_points * fraction);
                json!({
                    "id": item.question_id,
                    "description": item.description,
                    "max_points": item.max_points,
                    "student_answer": item.student_answer,
                    "score": score,
                    "feedback": feedback_for(score, item.max_points),
                })
            })
            .collect();

        Ok(json!({
            "success": true,
            "grading_result": {
                "submission_id": submission.id,
                "student_name": submission.student_name,
                "filename": submission.filename,
                "assignment_type": submission.assignment_type,
                "questions": questions,
            }
        }))
    }

    fn request_release(&self, _submission: &Submission) -> anyhow::Result<serde_json::Value> {
        Ok(json!({ "success": true, "message": "Grades released to student" }))
    }
}
