use crate::error::GradingError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn grading_err(id: &str, e: &GradingError) -> serde_json::Value {
    let details = match e {
        GradingError::SubmissionNotFound(sid) => Some(json!({ "submissionId": sid })),
        GradingError::QuestionNotFound(qid) => Some(json!({ "questionId": qid })),
        GradingError::DuplicateSubmission(sid) => Some(json!({ "submissionId": sid })),
        GradingError::TransportFailure(_) | GradingError::InvalidQuestions(_) => None,
        GradingError::InvalidTransition { action, from } => {
            Some(json!({ "action": action, "status": from.as_str() }))
        }
    };
    err(id, e.code(), e.to_string(), details)
}
