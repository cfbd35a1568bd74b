use crate::calc;
use crate::error::GradingError;
use crate::gateway::GradingGateway;
use crate::model::{self, GradeSnapshot, Submission, SubmissionStatus};
use crate::session;
use chrono::Utc;

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied,
    /// `grade` completed with the gateway's fallback snapshot.
    Fallback(String),
    /// The request was not legal from the current status; nothing changed.
    Unchanged(GradingError),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub submission: Submission,
    pub outcome: TransitionOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct Buckets {
    pub pending: Vec<Submission>,
    pub graded: Vec<Submission>,
    pub released: Vec<Submission>,
}

/// Owner of the roster and the only place submission status or snapshots
/// change. Every read hands out copies.
///
/// Callers keep at most one transition in flight per submission; the store
/// itself does no locking.
pub struct LifecycleStore {
    roster: Vec<Submission>,
    gateway: GradingGateway,
}

impl LifecycleStore {
    pub fn new(gateway: GradingGateway) -> Self {
        Self {
            roster: Vec::new(),
            gateway,
        }
    }

    pub fn gateway(&self) -> &GradingGateway {
        &self.gateway
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Entry point for uploads: the submission always starts out
    /// `pending_grading` with no snapshot.
    pub fn add(&mut self, mut submission: Submission) -> Result<Submission, GradingError> {
        if self.roster.iter().any(|s| s.id == submission.id) {
            return Err(GradingError::DuplicateSubmission(submission.id));
        }
        submission.status = SubmissionStatus::PendingGrading;
        submission.grade_snapshot = None;
        submission.original_snapshot = None;
        submission.graded_at = None;
        submission.reviewed_at = None;
        submission.released_at = None;
        tracing::info!(submission_id = %submission.id, "submission added");
        self.roster.push(submission.clone());
        Ok(submission)
    }

    /// Merges a roster listing. Unknown ids are appended in listing order;
    /// ids already present keep their local state. Returns how many were added.
    pub fn import(&mut self, submissions: Vec<Submission>) -> usize {
        let mut added = 0;
        for mut sub in submissions {
            if self.roster.iter().any(|s| s.id == sub.id) {
                continue;
            }
            if sub.status != SubmissionStatus::PendingGrading && sub.grade_snapshot.is_none() {
                tracing::warn!(
                    submission_id = %sub.id,
                    status = %sub.status,
                    "imported submission has no snapshot; treating as pending"
                );
                sub.status = SubmissionStatus::PendingGrading;
            }
            if let Some(snap) = sub.grade_snapshot.as_mut() {
                calc::normalize_snapshot(snap);
            }
            if sub.original_snapshot.is_none() {
                sub.original_snapshot = sub.grade_snapshot.clone();
            }
            self.roster.push(sub);
            added += 1;
        }
        if added > 0 {
            tracing::info!(added, roster = self.roster.len(), "roster imported");
        }
        added
    }

    pub fn list(&self) -> Vec<Submission> {
        self.roster.clone()
    }

    pub fn get(&self, submission_id: &str) -> Result<Submission, GradingError> {
        self.index_of(submission_id).map(|idx| self.roster[idx].clone())
    }

    pub fn list_by_status(&self, status: SubmissionStatus) -> Vec<Submission> {
        self.roster
            .iter()
            .filter(|s| s.status == status)
            .cloned()
            .collect()
    }

    pub fn buckets(&self) -> Buckets {
        let mut out = Buckets::default();
        for sub in &self.roster {
            let bucket = match sub.status {
                SubmissionStatus::PendingGrading => &mut out.pending,
                SubmissionStatus::Graded => &mut out.graded,
                SubmissionStatus::Released => &mut out.released,
            };
            bucket.push(sub.clone());
        }
        out
    }

    /// `pending_grading -> graded`. Gateway failures still complete the
    /// transition with the fallback snapshot. Any other status is a no-op
    /// that does not contact the gateway.
    pub fn grade(&mut self, submission_id: &str) -> Result<Transition, GradingError> {
        let idx = self.index_of(submission_id)?;
        let current = self.roster[idx].status;
        if current != SubmissionStatus::PendingGrading {
            return Ok(self.unchanged(idx, "grade", current));
        }

        let result = self.gateway.request_grade(&self.roster[idx]);
        let sub = &mut self.roster[idx];
        sub.original_snapshot = Some(result.snapshot.clone());
        sub.grade_snapshot = Some(result.snapshot);
        sub.status = SubmissionStatus::Graded;
        sub.graded_at = Some(Utc::now());

        let outcome = match result.fallback {
            Some(reason) => TransitionOutcome::Fallback(reason),
            None => TransitionOutcome::Applied,
        };
        tracing::info!(
            submission_id = %sub.id,
            fallback = matches!(outcome, TransitionOutcome::Fallback(_)),
            "submission graded"
        );
        Ok(Transition {
            submission: sub.clone(),
            outcome,
        })
    }

    /// Replaces the stored snapshot with an externally edited one. A question
    /// set with blank or duplicate ids or non-positive max points is rejected
    /// and the stored snapshot is left alone. Otherwise identity fields come
    /// from the roster entry, totals are re-aggregated and `edited` flags are
    /// recomputed against the graded original. Status does not change.
    pub fn reconcile(
        &mut self,
        submission_id: &str,
        mut edited: GradeSnapshot,
    ) -> Result<Transition, GradingError> {
        let idx = self.index_of(submission_id)?;
        let current = self.roster[idx].status;
        if current == SubmissionStatus::PendingGrading {
            return Ok(self.unchanged(idx, "reconcile", current));
        }

        model::check_question_set(
            edited
                .questions
                .iter()
                .map(|q| (q.question_id.as_str(), q.max_points)),
        )?;

        let sub = &mut self.roster[idx];
        edited.submission_id = sub.id.clone();
        edited.student_name = sub.student_name.clone();
        edited.filename = sub.filename.clone();
        edited.assignment_type = sub.assignment_type.clone();
        calc::normalize_snapshot(&mut edited);
        if let Some(original) = sub.original_snapshot.as_ref() {
            session::mark_edited(&mut edited, original);
        }

        tracing::info!(
            submission_id = %sub.id,
            status = %sub.status,
            total = edited.total_score,
            "grade snapshot reconciled"
        );
        sub.grade_snapshot = Some(edited);
        sub.reviewed_at = Some(Utc::now());
        Ok(Transition {
            submission: sub.clone(),
            outcome: TransitionOutcome::Applied,
        })
    }

    /// `graded -> released`. A gateway failure is returned as
    /// `TransportFailure` and the submission stays `graded`.
    pub fn release(&mut self, submission_id: &str) -> Result<Transition, GradingError> {
        let idx = self.index_of(submission_id)?;
        let current = self.roster[idx].status;
        if current != SubmissionStatus::Graded {
            return Ok(self.unchanged(idx, "release", current));
        }

        self.gateway.request_release(&self.roster[idx])?;

        let sub = &mut self.roster[idx];
        sub.status = SubmissionStatus::Released;
        sub.released_at = Some(Utc::now());
        tracing::info!(submission_id = %sub.id, "grades released");
        Ok(Transition {
            submission: sub.clone(),
            outcome: TransitionOutcome::Applied,
        })
    }

    fn unchanged(&self, idx: usize, action: &'static str, from: SubmissionStatus) -> Transition {
        let sub = &self.roster[idx];
        tracing::debug!(submission_id = %sub.id, action, %from, "transition ignored");
        Transition {
            submission: sub.clone(),
            outcome: TransitionOutcome::Unchanged(GradingError::InvalidTransition { action, from }),
        }
    }

    fn index_of(&self, submission_id: &str) -> Result<usize, GradingError> {
        self.roster
            .iter()
            .position(|s| s.id == submission_id)
            .ok_or_else(|| GradingError::SubmissionNotFound(submission_id.to_string()))
    }
}
