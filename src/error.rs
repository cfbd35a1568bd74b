use crate::model::SubmissionStatus;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GradingError {
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),
    #[error("question not found: {0}")]
    QuestionNotFound(String),
    #[error("submission already exists: {0}")]
    DuplicateSubmission(String),
    /// The grading service could not be reached or answered with a failure.
    #[error("grading service unavailable: {0}")]
    TransportFailure(String),
    /// A snapshot or rubric whose question set breaks the data-model rules.
    #[error("invalid question set: {0}")]
    InvalidQuestions(String),
    #[error("cannot {action} a submission that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: SubmissionStatus,
    },
}

impl GradingError {
    /// Error code used on the IPC wire.
    pub fn code(&self) -> &'static str {
        match self {
            GradingError::SubmissionNotFound(_) | GradingError::QuestionNotFound(_) => "not_found",
            GradingError::DuplicateSubmission(_) => "duplicate",
            GradingError::InvalidQuestions(_) => "bad_params",
            GradingError::TransportFailure(_) => "transport_failure",
            GradingError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}
