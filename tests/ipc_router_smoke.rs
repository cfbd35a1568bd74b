mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{create_submission, request, spawn_sidecar};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let mut sidecar = spawn_sidecar(&[("GRADINGD_SERVICE", "mock")]);
    let _ = create_submission(&mut sidecar, "0", "sub_smoke", "Smoke Student", "essay");

    let calls = [
        ("health", json!({})),
        ("submissions.list", json!({})),
        ("submissions.get", json!({ "submissionId": "sub_smoke" })),
        ("submissions.buckets", json!({})),
        ("submissions.refresh", json!({})),
        ("submissions.grade", json!({ "submissionId": "sub_smoke" })),
        ("review.open", json!({ "submissionId": "sub_smoke" })),
        ("review.get", json!({ "submissionId": "sub_smoke" })),
        (
            "review.setScore",
            json!({ "submissionId": "sub_smoke", "questionId": "q1", "score": 30 }),
        ),
        (
            "review.setFeedback",
            json!({ "submissionId": "sub_smoke", "questionId": "q1", "feedback": "Strong thesis" }),
        ),
        ("review.finalize", json!({ "submissionId": "sub_smoke" })),
        ("review.discard", json!({ "submissionId": "sub_smoke" })),
        (
            "submissions.reconcile",
            json!({ "submissionId": "sub_smoke", "snapshot": { "questions": [] } }),
        ),
        ("submissions.release", json!({ "submissionId": "sub_smoke" })),
        ("reports.student", json!({ "submissionId": "sub_smoke" })),
    ];

    for (i, (method, params)) in calls.into_iter().enumerate() {
        let resp = request(&mut sidecar, &format!("{}", i + 1), method, params);
        if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
            let code = resp
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            assert_ne!(code, "not_implemented", "unexpected unknown method for {}", method);
        }
    }

    let unknown = request(&mut sidecar, "99", "marksets.list", json!({}));
    assert_eq!(unknown["ok"], json!(false));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));
}

#[test]
fn unparseable_lines_get_bad_json_and_the_loop_continues() {
    let mut sidecar = spawn_sidecar(&[]);

    writeln!(sidecar.stdin, "{{not json").expect("write garbage");
    sidecar.stdin.flush().expect("flush");
    let mut line = String::new();
    sidecar.reader.read_line(&mut line).expect("read response");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["error"]["code"], json!("bad_json"));
    assert!(value.get("id").is_none());

    let health = request(&mut sidecar, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["serviceMode"], json!("offline"));
    assert_eq!(health["result"]["rosterSize"], json!(0));
}
