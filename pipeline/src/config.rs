use std::env;
use std::path::PathBuf;

use deploy_defs::Region;
use iac_generator::BackendSettings;

/// Execution-mode flags and external resource identifiers, read once from
/// the environment at startup. Simulated modes skip the real build and
/// terraform execution while still exercising the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub real_build: bool,
    pub real_deploy: bool,
    pub registry: Option<String>,
    pub work_root: PathBuf,
    pub template_root: PathBuf,
    pub state_bucket: String,
    pub lock_table: String,
    pub region_override: Option<Region>,
}

impl ExecutionConfig {
    pub fn from_env() -> Self {
        ExecutionConfig {
            real_build: env_flag("AUTODEPLOY_REAL_BUILD"),
            real_deploy: env_flag("AUTODEPLOY_REAL_DEPLOY"),
            registry: env::var("AUTODEPLOY_REGISTRY").ok().filter(|v| !v.is_empty()),
            work_root: env::var("AUTODEPLOY_WORK_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("autodeploy")),
            template_root: env::var("AUTODEPLOY_TEMPLATE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./stacks")),
            state_bucket: env::var("AUTODEPLOY_STATE_BUCKET")
                .unwrap_or_else(|_| "autodeploy-tfstate".to_string()),
            lock_table: env::var("AUTODEPLOY_LOCK_TABLE")
                .unwrap_or_else(|_| "autodeploy-tf-locks".to_string()),
            region_override: env::var("AUTODEPLOY_REGION")
                .ok()
                .and_then(|v| Region::parse(&v)),
        }
    }

    /// Fully simulated configuration: no registry, no real build, no real
    /// deploy. Useful for demos and tests.
    pub fn simulated(work_root: PathBuf, template_root: PathBuf) -> Self {
        ExecutionConfig {
            real_build: false,
            real_deploy: false,
            registry: None,
            work_root,
            template_root,
            state_bucket: "autodeploy-tfstate".to_string(),
            lock_table: "autodeploy-tf-locks".to_string(),
            region_override: None,
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            bucket: self.state_bucket.clone(),
            lock_table: self.lock_table.clone(),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| {
            let v = v.to_lowercase();
            v == "true" || v == "1" || v == "yes"
        })
        .unwrap_or(false)
}
