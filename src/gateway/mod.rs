mod http;
mod mock;
pub mod normalize;

pub use http::HttpGradingService;
pub use mock::MockGradingService;

use crate::calc;
use crate::error::GradingError;
use crate::model::{GradeSnapshot, QuestionGrade, Submission};
use crate::rubrics;
use anyhow::bail;

pub const FALLBACK_FEEDBACK: &str = "Automatic grading unavailable; awaiting TA review";

/// Transport to the external grading service. Implementations return the raw
/// service payloads; `GradingGateway` owns normalization and failure policy.
pub trait GradingService {
    fn name(&self) -> &'static str;
    fn list_submissions(&self) -> anyhow::Result<serde_json::Value>;
    fn request_grade(&self, submission: &Submission) -> anyhow::Result<serde_json::Value>;
    fn request_release(&self, submission: &Submission) -> anyhow::Result<serde_json::Value>;
}

/// Used when no grading service is configured. Every call fails, so grading
/// always degrades to the fallback snapshot and releases never go through.
pub struct OfflineGradingService;

impl GradingService for OfflineGradingService {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn list_submissions(&self) -> anyhow::Result<serde_json::Value> {
        bail!("no grading service configured")
    }

    fn request_grade(&self, _submission: &Submission) -> anyhow::Result<serde_json::Value> {
        bail!("no grading service configured")
    }

    fn request_release(&self, _submission: &Submission) -> anyhow::Result<serde_json::Value> {
        bail!("no grading service configured")
    }
}

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub snapshot: GradeSnapshot,
    /// Set when the snapshot is the synthetic fallback; holds the failure reason.
    pub fallback: Option<String>,
}

pub struct GradingGateway {
    service: Box<dyn GradingService>,
}

impl GradingGateway {
    pub fn new(service: Box<dyn GradingService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    /// Never fails: transport, service and payload errors all degrade to
    /// `fallback_snapshot`.
    pub fn request_grade(&self, submission: &Submission) -> GradeOutcome {
        let result = self
            .service
            .request_grade(submission)
            .and_then(|payload| normalize::normalize_grade_payload(&payload, submission));
        match result {
            Ok(snapshot) => GradeOutcome {
                snapshot,
                fallback: None,
            },
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(
                    submission_id = %submission.id,
                    service = self.service.name(),
                    %reason,
                    "grading request failed; using fallback snapshot"
                );
                GradeOutcome {
                    snapshot: fallback_snapshot(submission),
                    fallback: Some(reason),
                }
            }
        }
    }

    pub fn request_release(&self, submission: &Submission) -> Result<(), GradingError> {
        self.service
            .request_release(submission)
            .and_then(|ack| normalize::check_ack(&ack))
            .map_err(|e| {
                let reason = format!("{e:#}");
                tracing::warn!(
                    submission_id = %submission.id,
                    service = self.service.name(),
                    %reason,
                    "release request failed"
                );
                GradingError::TransportFailure(reason)
            })
    }

    pub fn list_submissions(&self) -> Result<Vec<Submission>, GradingError> {
        self.service
            .list_submissions()
            .and_then(|payload| normalize::normalize_submission_list(&payload))
            .map_err(|e| GradingError::TransportFailure(format!("{e:#}")))
    }
}

/// Deterministic stand-in result built from the submission's own rubric
/// items (or the catalog rubric for its assignment type): every score is 0
/// and every feedback is `FALLBACK_FEEDBACK`.
pub fn fallback_snapshot(submission: &Submission) -> GradeSnapshot {
    let items = if submission.questions.is_empty() {
        rubrics::rubric_for(&submission.assignment_type).unwrap_or_default()
    } else {
        submission.questions.clone()
    };

    let mut snapshot = GradeSnapshot {
        submission_id: submission.id.clone(),
        student_name: submission.student_name.clone(),
        filename: submission.filename.clone(),
        assignment_type: submission.assignment_type.clone(),
        questions: items
            .into_iter()
            .map(|item| QuestionGrade {
                question_id: item.question_id,
                description: item.description,
                student_answer: item.student_answer,
                score: 0.0,
                max_points: item.max_points,
                feedback: FALLBACK_FEEDBACK.to_string(),
                edited: false,
            })
            .collect(),
        total_score: 0.0,
        max_total: 0.0,
        percentage: 0.0,
    };
    calc::apply_totals(&mut snapshot);
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Scripted {
        grade: Option<serde_json::Value>,
        release: Option<serde_json::Value>,
    }

    impl GradingService for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn list_submissions(&self) -> anyhow::Result<serde_json::Value> {
            Ok(json!([]))
        }

        fn request_grade(&self, _submission: &Submission) -> anyhow::Result<serde_json::Value> {
            match &self.grade {
                Some(v) => Ok(v.clone()),
                None => bail!("connection refused"),
            }
        }

        fn request_release(&self, _submission: &Submission) -> anyhow::Result<serde_json::Value> {
            match &self.release {
                Some(v) => Ok(v.clone()),
                None => bail!("connection refused"),
            }
        }
    }

    fn submission() -> Submission {
        Submission::pending(
            "sub_002",
            "Bob Smith",
            "BS2024",
            "calculus_hw1_bob.pdf",
            "calculus_homework",
            rubrics::rubric_for("calculus_homework").expect("rubric"),
        )
    }

    #[test]
    fn grade_failure_yields_consistent_fallback() {
        let gateway = GradingGateway::new(Box::new(Scripted {
            grade: None,
            release: None,
        }));
        let outcome = gateway.request_grade(&submission());
        assert!(outcome.fallback.as_deref().unwrap_or("").contains("connection refused"));
        let snap = outcome.snapshot;
        assert_eq!(snap.questions.len(), 5);
        assert_eq!(snap.total_score, 0.0);
        assert_eq!(snap.max_total, 70.0);
        assert_eq!(snap.percentage, 0.0);
        assert!(snap.questions.iter().all(|q| q.feedback == FALLBACK_FEEDBACK));
    }

    #[test]
    fn malformed_payload_also_falls_back() {
        let gateway = GradingGateway::new(Box::new(Scripted {
            grade: Some(json!({ "questions": "not a list" })),
            release: None,
        }));
        let outcome = gateway.request_grade(&submission());
        assert!(outcome.fallback.is_some());
        assert_eq!(outcome.snapshot, fallback_snapshot(&submission()));
    }

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(fallback_snapshot(&submission()), fallback_snapshot(&submission()));
    }

    #[test]
    fn fallback_uses_catalog_rubric_when_submission_has_none() {
        let mut sub = submission();
        sub.questions.clear();
        sub.assignment_type = "essay".to_string();
        let snap = fallback_snapshot(&sub);
        assert_eq!(snap.questions.len(), 4);
        assert_eq!(snap.max_total, 100.0);
    }

    #[test]
    fn successful_grade_is_normalized() {
        let gateway = GradingGateway::new(Box::new(Scripted {
            grade: Some(json!({
                "questions": [
                    { "question_id": "q1", "score": 9, "max_points": 10, "feedback": "Nice" }
                ]
            })),
            release: None,
        }));
        let outcome = gateway.request_grade(&submission());
        assert!(outcome.fallback.is_none());
        assert_eq!(outcome.snapshot.total_score, 9.0);
        assert_eq!(outcome.snapshot.student_name, "Bob Smith");
    }

    #[test]
    fn release_failure_is_surfaced() {
        let down = GradingGateway::new(Box::new(Scripted {
            grade: None,
            release: None,
        }));
        assert!(matches!(
            down.request_release(&submission()),
            Err(GradingError::TransportFailure(_))
        ));

        let refused = GradingGateway::new(Box::new(Scripted {
            grade: None,
            release: Some(json!({ "success": false, "error": "Submission not graded yet" })),
        }));
        assert!(refused.request_release(&submission()).is_err());

        let up = GradingGateway::new(Box::new(Scripted {
            grade: None,
            release: Some(json!({ "message": "Grades released successfully" })),
        }));
        assert_eq!(up.request_release(&submission()), Ok(()));
    }

    #[test]
    fn offline_service_lists_nothing() {
        let gateway = GradingGateway::new(Box::new(OfflineGradingService));
        assert_eq!(gateway.service_name(), "offline");
        assert!(gateway.list_submissions().is_err());
    }
}
