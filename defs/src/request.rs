use serde::{Deserialize, Serialize};

/// What the outer surface (HTTP or CLI) forwards into the pipeline: the
/// natural-language request text plus the repository to deploy.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeploymentRequest {
    pub description: String,
    pub repo_url: String,
    #[serde(default)]
    pub branch: Option<String>,
}
