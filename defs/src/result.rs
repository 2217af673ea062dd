use serde::{Deserialize, Serialize};

use crate::log::RunLog;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Terminal outcome of one run, produced exactly once.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineResult {
    pub run_id: String,
    pub success: bool,
    pub service_url: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u128,
    pub logs: Vec<RunLog>,
}
