use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deploy_defs::{DeploymentRequest, PipelineResult, RunStatus};
use deploy_utils::get_timestamp;

/// Status record for one run. Snapshots handed out by the store are
/// eventually consistent: the run's own task is the only writer, readers
/// may observe a record mid-update.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_id: String,
    pub status: RunStatus,
    pub created_at: String,
    pub request: DeploymentRequest,
    pub result: Option<PipelineResult>,
}

/// Concurrency-safe table of run records keyed by run id. Passed
/// explicitly into the pipeline; there is no ambient global registry.
#[derive(Clone, Default)]
pub struct RunStore {
    inner: Arc<Mutex<HashMap<String, RunRecord>>>,
}

impl RunStore {
    pub fn new() -> Self {
        RunStore::default()
    }

    pub fn create(&self, run_id: &str, request: &DeploymentRequest) -> RunRecord {
        let record = RunRecord {
            run_id: run_id.to_string(),
            status: RunStatus::Pending,
            created_at: get_timestamp(),
            request: request.clone(),
            result: None,
        };
        if let Ok(mut records) = self.inner.lock() {
            records.insert(run_id.to_string(), record.clone());
        }
        record
    }

    pub fn set_status(&self, run_id: &str, status: RunStatus) {
        if let Ok(mut records) = self.inner.lock() {
            if let Some(record) = records.get_mut(run_id) {
                record.status = status;
            }
        }
    }

    pub fn complete(&self, run_id: &str, result: &PipelineResult) {
        if let Ok(mut records) = self.inner.lock() {
            if let Some(record) = records.get_mut(run_id) {
                record.status = if result.success {
                    RunStatus::Succeeded
                } else {
                    RunStatus::Failed
                };
                record.result = Some(result.clone());
            }
        }
    }

    pub fn get(&self, run_id: &str) -> Option<RunRecord> {
        self.inner.lock().ok().and_then(|r| r.get(run_id).cloned())
    }

    pub fn list(&self) -> Vec<RunRecord> {
        self.inner
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default()
    }
}
