use crate::error::GradingError;
use crate::ipc::error::{err, grading_err, ok};
use crate::ipc::helpers::{required_f64, required_str, summary_json, transition_json};
use crate::ipc::types::{AppState, Request};
use crate::model::GradeSnapshot;
use crate::session::GradeEditSession;
use serde_json::json;

fn snapshot_result(snapshot: &GradeSnapshot, edited_count: usize) -> serde_json::Value {
    json!({
        "snapshot": snapshot,
        "summary": summary_json(snapshot),
        "editedCount": edited_count,
    })
}

fn no_session(req: &Request, submission_id: &str) -> serde_json::Value {
    err(
        &req.id,
        "no_session",
        "no review is open for this submission",
        Some(json!({ "submissionId": submission_id })),
    )
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let sub = match state.store.get(&submission_id) {
        Ok(v) => v,
        Err(e) => return grading_err(&req.id, &e),
    };
    let Some(snapshot) = sub.grade_snapshot else {
        return grading_err(
            &req.id,
            &GradingError::InvalidTransition {
                action: "review",
                from: sub.status,
            },
        );
    };

    // Pending edits survive a second open; review.discard starts over.
    if let Some(existing) = state.sessions.get(&submission_id) {
        tracing::info!(%submission_id, edited = existing.edited_count(), "review already open");
        let mut out = snapshot_result(&existing.snapshot(), existing.edited_count());
        out["alreadyOpen"] = json!(true);
        return ok(&req.id, out);
    }

    let session = match sub.original_snapshot.as_ref() {
        Some(original) => GradeEditSession::resume(snapshot, original),
        None => GradeEditSession::open(snapshot),
    };
    let mut out = snapshot_result(&session.snapshot(), session.edited_count());
    out["alreadyOpen"] = json!(false);
    state.sessions.insert(submission_id, session);
    ok(&req.id, out)
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.sessions.get(&submission_id) {
        Some(session) => ok(
            &req.id,
            snapshot_result(&session.snapshot(), session.edited_count()),
        ),
        None => no_session(req, &submission_id),
    }
}

fn handle_set_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let question_id = match required_str(req, "questionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let score = match required_f64(req, "score") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(session) = state.sessions.get_mut(&submission_id) else {
        return no_session(req, &submission_id);
    };
    match session.set_score(&question_id, score) {
        Ok(snapshot) => ok(&req.id, snapshot_result(&snapshot, session.edited_count())),
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_set_feedback(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let question_id = match required_str(req, "questionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Empty feedback is allowed; only the type is checked.
    let Some(feedback) = req.params.get("feedback").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.feedback", None);
    };
    let Some(session) = state.sessions.get_mut(&submission_id) else {
        return no_session(req, &submission_id);
    };
    match session.set_feedback(&question_id, feedback) {
        Ok(snapshot) => ok(&req.id, snapshot_result(&snapshot, session.edited_count())),
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_finalize(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(session) = state.sessions.remove(&submission_id) else {
        return no_session(req, &submission_id);
    };
    let edited_count = session.edited_count();
    match state.store.reconcile(&submission_id, session.snapshot()) {
        Ok(t) => {
            tracing::info!(submission_id = session.submission_id(), edited_count, "review finalized");
            let mut out = transition_json(&t);
            out["editedCount"] = json!(edited_count);
            ok(&req.id, out)
        }
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_discard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let discarded = state.sessions.remove(&submission_id).is_some();
    ok(&req.id, json!({ "discarded": discarded }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "review.open" => Some(handle_open(state, req)),
        "review.get" => Some(handle_get(state, req)),
        "review.setScore" => Some(handle_set_score(state, req)),
        "review.setFeedback" => Some(handle_set_feedback(state, req)),
        "review.finalize" => Some(handle_finalize(state, req)),
        "review.discard" => Some(handle_discard(state, req)),
        _ => None,
    }
}
