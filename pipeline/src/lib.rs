//! End-to-end deployment pipeline: request parsing, repository
//! acquisition, planning, IaC generation, build and deploy, sequenced
//! strictly per run with fail-fast error handling.

mod build;
mod clone;
mod collaborators;
mod config;
mod errors;
mod orchestrator;
mod patch;
mod store;

pub use build::{select_build_backend, BuildBackend};
pub use clone::clone_repository;
pub use collaborators::{AppBuilder, BuildArtifact, BuildContext, RepoAnalyzer, RequestParser};
pub use config::ExecutionConfig;
pub use errors::StageError;
pub use orchestrator::Pipeline;
pub use patch::{apply_prebuild_patch, apply_predeploy_patch, FLASK_STANDARD_PORT};
pub use store::{RunRecord, RunStore};
