mod config;
mod log;
mod plan;
mod repo;
mod request;
mod result;
mod spec;
mod stack;
pub mod tfvars;

pub use config::GeneratedConfig;
pub use log::{LogLevel, LogSink, RunLog, RunLogger};
pub use plan::{NetworkPlan, Plan, Runtime};
pub use repo::{AppRole, RepoApp, RepoFacts};
pub use request::DeploymentRequest;
pub use result::{PipelineResult, RunStatus};
pub use spec::{
    CacheKind, CloudProvider, DataSpec, DbKind, DeploySpec, HintLevel, Hints, Region, ServiceKind,
    ServiceSpec,
};
pub use stack::{StackKind, KV_TABLE_ADDRESS, KV_TABLE_DEFAULT_NAME};
pub use tfvars::TfVars;
