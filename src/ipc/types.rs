use std::collections::HashMap;

use serde::Deserialize;

use crate::config::ServiceMode;
use crate::session::GradeEditSession;
use crate::store::LifecycleStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: LifecycleStore,
    /// Open review sessions keyed by submission id.
    pub sessions: HashMap<String, GradeEditSession>,
    pub service_mode: ServiceMode,
}

impl AppState {
    pub fn new(store: LifecycleStore, service_mode: ServiceMode) -> Self {
        Self {
            store,
            sessions: HashMap::new(),
            service_mode,
        }
    }
}
