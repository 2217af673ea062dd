use serde::{Deserialize, Serialize};

use crate::spec::DbKind;

/// The runtime families the planner chooses between, abstracted from any
/// provider product name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    #[serde(rename = "managed-container-service")]
    ManagedContainerService,
    #[serde(rename = "orchestrated-container-cluster")]
    OrchestratedContainerCluster,
    #[serde(rename = "static-cdn-bucket")]
    StaticCdnBucket,
    #[serde(rename = "vm")]
    Vm,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::ManagedContainerService => "managed-container-service",
            Runtime::OrchestratedContainerCluster => "orchestrated-container-cluster",
            Runtime::StaticCdnBucket => "static-cdn-bucket",
            Runtime::Vm => "vm",
        }
    }

    /// Short form used in generated names and placeholder URLs.
    pub fn slug(&self) -> &'static str {
        match self {
            Runtime::ManagedContainerService => "service",
            Runtime::OrchestratedContainerCluster => "cluster",
            Runtime::StaticCdnBucket => "static",
            Runtime::Vm => "vm",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    pub tls: bool,
    #[serde(default)]
    pub host: Option<String>,
}

impl Default for NetworkPlan {
    fn default() -> Self {
        NetworkPlan {
            tls: true,
            host: None,
        }
    }
}

/// Infrastructure decision produced by the planner. The runtime fully
/// determines which stacks the generator emits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Plan {
    pub runtime: Runtime,
    #[serde(default)]
    pub db: Option<DbKind>,
    #[serde(default)]
    pub front: Option<Runtime>,
    #[serde(default)]
    pub network: NetworkPlan,
}
