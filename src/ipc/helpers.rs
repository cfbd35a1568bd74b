use crate::calc;
use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::model::GradeSnapshot;
use crate::store::{Transition, TransitionOutcome};
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing params.{key}"), None))
}

pub fn required_f64(req: &Request, key: &str) -> Result<f64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("params.{key} must be a number"),
                None,
            )
        })
}

pub fn summary_json(snapshot: &GradeSnapshot) -> serde_json::Value {
    json!(calc::summarize(snapshot))
}

pub fn outcome_json(outcome: &TransitionOutcome) -> serde_json::Value {
    match outcome {
        TransitionOutcome::Applied => json!({ "kind": "applied" }),
        TransitionOutcome::Fallback(reason) => json!({ "kind": "fallback", "reason": reason }),
        TransitionOutcome::Unchanged(e) => json!({
            "kind": "unchanged",
            "code": e.code(),
            "message": e.to_string(),
        }),
    }
}

pub fn transition_json(t: &Transition) -> serde_json::Value {
    let mut out = json!({
        "submission": t.submission,
        "outcome": outcome_json(&t.outcome),
    });
    if let Some(snap) = t.submission.grade_snapshot.as_ref() {
        out["summary"] = summary_json(snap);
    }
    out
}
