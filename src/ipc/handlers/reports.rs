use crate::error::GradingError;
use crate::ipc::error::{grading_err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;

fn handle_student_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let sub = match state.store.get(&submission_id) {
        Ok(v) => v,
        Err(e) => return grading_err(&req.id, &e),
    };
    match report::student_report(&sub) {
        Some(model) => ok(&req.id, json!({ "report": model })),
        None => grading_err(
            &req.id,
            &GradingError::InvalidTransition {
                action: "report on",
                from: sub.status,
            },
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.student" => Some(handle_student_report(state, req)),
        _ => None,
    }
}
