use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::rubrics;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "serviceMode": state.service_mode.as_str(),
            "service": state.store.gateway().service_name(),
            "rosterSize": state.store.len(),
            "openReviews": state.sessions.len(),
            "assignmentTypes": rubrics::known_assignment_types(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        _ => None,
    }
}
