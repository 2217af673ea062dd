use std::path::{Path, PathBuf};

use async_trait::async_trait;

use deploy_defs::{DeploySpec, RepoApp, RepoFacts};

use crate::build::BuildBackend;

/// Turns the natural-language request text into a normalized spec.
/// Implemented outside the core (LLM- or rule-based).
#[async_trait]
pub trait RequestParser: Send + Sync {
    async fn parse(&self, description: &str) -> Result<DeploySpec, anyhow::Error>;
}

/// Detects the deployable units in a cloned repository tree.
#[async_trait]
pub trait RepoAnalyzer: Send + Sync {
    async fn analyze(&self, repo_dir: &Path) -> Result<RepoFacts, anyhow::Error>;
}

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub run_id: String,
    pub repo_dir: PathBuf,
    pub registry: Option<String>,
    pub backend: BuildBackend,
}

/// What a build produced: an image reference for container backends, a
/// local artifact directory for static builds.
#[derive(Debug, Clone, Default)]
pub struct BuildArtifact {
    pub image: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// Builds one app with the backend selected by `select_build_backend`.
/// The docker/buildpack/static implementations live outside the core.
#[async_trait]
pub trait AppBuilder: Send + Sync {
    async fn build(
        &self,
        app: &RepoApp,
        context: &BuildContext,
    ) -> Result<BuildArtifact, anyhow::Error>;
}
