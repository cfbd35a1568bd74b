use crate::ipc::error::{err, grading_err, ok};
use crate::ipc::helpers::{required_str, summary_json, transition_json};
use crate::ipc::types::{AppState, Request};
use crate::model::{self, GradeSnapshot, RubricItem, Submission, SubmissionStatus};
use crate::rubrics;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submissions = match req.params.get("status").and_then(|v| v.as_str()) {
        None => state.store.list(),
        Some(raw) => match SubmissionStatus::parse(raw) {
            Some(status) => state.store.list_by_status(status),
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "status must be one of: pending_grading, graded, released",
                    Some(json!({ "status": raw })),
                )
            }
        },
    };
    ok(&req.id, json!({ "submissions": submissions }))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.get(&submission_id) {
        Ok(sub) => {
            let summary = sub.grade_snapshot.as_ref().map(summary_json);
            ok(
                &req.id,
                json!({
                    "submission": sub,
                    "summary": summary,
                    "reviewOpen": state.sessions.contains_key(&submission_id),
                }),
            )
        }
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_buckets(state: &mut AppState, req: &Request) -> serde_json::Value {
    let b = state.store.buckets();
    ok(
        &req.id,
        json!({
            "pending": b.pending,
            "graded": b.graded,
            "released": b.released,
        }),
    )
}

fn parse_questions(req: &Request, assignment_type: &str) -> Result<Vec<RubricItem>, serde_json::Value> {
    let Some(raw) = req.params.get("questions").filter(|v| !v.is_null()) else {
        return rubrics::rubric_for(assignment_type).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("no rubric for assignment type {assignment_type}; pass params.questions"),
                Some(json!({ "knownTypes": rubrics::known_assignment_types() })),
            )
        });
    };

    let items: Vec<RubricItem> = serde_json::from_value(raw.clone()).map_err(|e| {
        err(
            &req.id,
            "bad_params",
            format!("params.questions is malformed: {e}"),
            None,
        )
    })?;
    if items.is_empty() {
        return Err(err(&req.id, "bad_params", "params.questions is empty", None));
    }
    model::check_question_set(items.iter().map(|q| (q.question_id.as_str(), q.max_points)))
        .map_err(|e| grading_err(&req.id, &e))?;
    Ok(items)
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_name = match required_str(req, "studentName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let filename = match required_str(req, "filename") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_type = match required_str(req, "assignmentType") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let questions = match parse_questions(req, &assignment_type) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let submission_id = req
        .params
        .get("submissionId")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            let raw = uuid::Uuid::new_v4().simple().to_string();
            format!("sub_{}", &raw[..8])
        });

    let submission = Submission::pending(
        submission_id,
        student_name,
        student_id,
        filename,
        assignment_type,
        questions,
    );
    match state.store.add(submission) {
        Ok(sub) => ok(&req.id, json!({ "submission": sub })),
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.gateway().list_submissions() {
        Ok(listed) => {
            let listed_count = listed.len();
            let imported = state.store.import(listed);
            ok(
                &req.id,
                json!({
                    "listed": listed_count,
                    "imported": imported,
                    "rosterSize": state.store.len(),
                }),
            )
        }
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_grade(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.grade(&submission_id) {
        Ok(t) => ok(&req.id, transition_json(&t)),
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_reconcile(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(raw) = req.params.get("snapshot") else {
        return err(&req.id, "bad_params", "missing params.snapshot", None);
    };
    let snapshot: GradeSnapshot = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("params.snapshot is malformed: {e}"),
                None,
            )
        }
    };

    match state.store.reconcile(&submission_id, snapshot) {
        Ok(t) => {
            // An open review would otherwise overwrite this snapshot on finalize.
            let session_closed = state.sessions.remove(&submission_id).is_some();
            let mut out = transition_json(&t);
            out["reviewClosed"] = json!(session_closed);
            ok(&req.id, out)
        }
        Err(e) => grading_err(&req.id, &e),
    }
}

fn handle_release(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission_id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.release(&submission_id) {
        Ok(t) => ok(&req.id, transition_json(&t)),
        Err(e) => grading_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submissions.list" => Some(handle_list(state, req)),
        "submissions.get" => Some(handle_get(state, req)),
        "submissions.buckets" => Some(handle_buckets(state, req)),
        "submissions.create" => Some(handle_create(state, req)),
        "submissions.refresh" => Some(handle_refresh(state, req)),
        "submissions.grade" => Some(handle_grade(state, req)),
        "submissions.reconcile" => Some(handle_reconcile(state, req)),
        "submissions.release" => Some(handle_release(state, req)),
        _ => None,
    }
}
