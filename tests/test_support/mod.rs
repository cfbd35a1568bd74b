#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Sidecar {
    pub child: Child,
    pub stdin: ChildStdin,
    pub reader: BufReader<ChildStdout>,
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Spawns gradingd with a clean `GRADINGD_*` environment plus `envs`.
pub fn spawn_sidecar(envs: &[(&str, &str)]) -> Sidecar {
    let exe = env!("CARGO_BIN_EXE_gradingd");
    let mut cmd = Command::new(exe);
    for key in [
        "GRADINGD_SERVICE",
        "GRADINGD_SERVICE_URL",
        "GRADINGD_TIMEOUT_SECS",
        "GRADINGD_ROSTER",
        "GRADINGD_LOG",
    ] {
        cmd.env_remove(key);
    }
    let mut child = cmd
        .envs(envs.iter().copied())
        .current_dir(temp_dir("gradingd-cwd"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradingd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    Sidecar {
        child,
        stdin,
        reader: BufReader::new(stdout),
    }
}

pub fn request(
    sidecar: &mut Sidecar,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(sidecar.stdin, "{}", payload).expect("write request");
    sidecar.stdin.flush().expect("flush request");

    let mut line = String::new();
    sidecar
        .reader
        .read_line(&mut line)
        .expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    sidecar: &mut Sidecar,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(sidecar, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(json!({}))
}

/// Sends a request that must fail and returns its error code.
pub fn request_err(
    sidecar: &mut Sidecar,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(sidecar, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

pub fn create_submission(
    sidecar: &mut Sidecar,
    id: &str,
    submission_id: &str,
    student_name: &str,
    assignment_type: &str,
) -> serde_json::Value {
    let result = request_ok(
        sidecar,
        id,
        "submissions.create",
        json!({
            "submissionId": submission_id,
            "studentName": student_name,
            "studentId": format!("{}-id", submission_id),
            "filename": format!("{}.pdf", submission_id),
            "assignmentType": assignment_type,
        }),
    );
    result.get("submission").cloned().expect("submission")
}
