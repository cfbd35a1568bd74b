use crate::calc;
use crate::error::GradingError;
use crate::model::GradeSnapshot;

/// Caller-held edit context over one grade snapshot during TA review.
///
/// Every edit leaves the snapshot consistent: scores are clamped, totals are
/// re-aggregated, and `edited` reflects whether a question differs from the
/// score and feedback grading produced for it. No I/O happens here.
#[derive(Debug, Clone)]
pub struct GradeEditSession {
    snapshot: GradeSnapshot,
    // Score/feedback as grading produced them, by question position. `None`
    // marks a question grading never produced; it is always edited.
    baseline: Vec<Option<(f64, String)>>,
}

fn baseline_for(snapshot: &GradeSnapshot, original: &GradeSnapshot) -> Vec<Option<(f64, String)>> {
    snapshot
        .questions
        .iter()
        .map(|q| {
            original
                .questions
                .iter()
                .find(|o| o.question_id == q.question_id)
                .map(|o| (calc::clamp_score(o.score, o.max_points), o.feedback.clone()))
        })
        .collect()
}

fn differs(score: f64, feedback: &str, baseline: &Option<(f64, String)>) -> bool {
    match baseline {
        None => true,
        Some((b_score, b_feedback)) => score != *b_score || feedback != b_feedback,
    }
}

/// Recomputes every `edited` flag of `snapshot` against the snapshot grading
/// originally produced.
pub fn mark_edited(snapshot: &mut GradeSnapshot, original: &GradeSnapshot) {
    let baseline = baseline_for(snapshot, original);
    for (q, base) in snapshot.questions.iter_mut().zip(baseline.iter()) {
        q.edited = differs(q.score, &q.feedback, base);
    }
}

impl GradeEditSession {
    /// Opens a snapshot that is still exactly what grading produced. Stale
    /// `edited` flags from the source are cleared.
    pub fn open(mut snapshot: GradeSnapshot) -> Self {
        for q in snapshot.questions.iter_mut() {
            q.edited = false;
        }
        calc::normalize_snapshot(&mut snapshot);
        let baseline = snapshot
            .questions
            .iter()
            .map(|q| Some((q.score, q.feedback.clone())))
            .collect();
        Self { snapshot, baseline }
    }

    /// Reopens a snapshot that may carry earlier review edits. `original` is
    /// the snapshot grading produced; `edited` flags are recomputed against
    /// it, so reverting a question to its graded value clears the flag.
    pub fn resume(mut snapshot: GradeSnapshot, original: &GradeSnapshot) -> Self {
        calc::normalize_snapshot(&mut snapshot);
        let baseline = baseline_for(&snapshot, original);
        for (q, base) in snapshot.questions.iter_mut().zip(baseline.iter()) {
            q.edited = differs(q.score, &q.feedback, base);
        }
        Self { snapshot, baseline }
    }

    pub fn submission_id(&self) -> &str {
        &self.snapshot.submission_id
    }

    pub fn set_score(
        &mut self,
        question_id: &str,
        new_score: f64,
    ) -> Result<GradeSnapshot, GradingError> {
        let idx = self.position(question_id)?;
        let q = &mut self.snapshot.questions[idx];
        q.score = calc::clamp_score(new_score, q.max_points);
        self.refresh_edited(idx);
        calc::apply_totals(&mut self.snapshot);
        Ok(self.snapshot.clone())
    }

    pub fn set_feedback(
        &mut self,
        question_id: &str,
        new_text: impl Into<String>,
    ) -> Result<GradeSnapshot, GradingError> {
        let idx = self.position(question_id)?;
        self.snapshot.questions[idx].feedback = new_text.into();
        self.refresh_edited(idx);
        Ok(self.snapshot.clone())
    }

    pub fn snapshot(&self) -> GradeSnapshot {
        self.snapshot.clone()
    }

    pub fn edited_count(&self) -> usize {
        self.snapshot.questions.iter().filter(|q| q.edited).count()
    }

    fn position(&self, question_id: &str) -> Result<usize, GradingError> {
        self.snapshot
            .questions
            .iter()
            .position(|q| q.question_id == question_id)
            .ok_or_else(|| GradingError::QuestionNotFound(question_id.to_string()))
    }

    fn refresh_edited(&mut self, idx: usize) {
        let q = &mut self.snapshot.questions[idx];
        q.edited = differs(q.score, &q.feedback, &self.baseline[idx]);
    }
}
