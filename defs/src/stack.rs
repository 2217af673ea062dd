use serde::{Deserialize, Serialize};

/// Fixed name of the demo key-value table seeded into cluster deployments.
/// The terraform runner imports a pre-existing table of this name at
/// `KV_TABLE_ADDRESS` when apply reports it already exists.
pub const KV_TABLE_DEFAULT_NAME: &str = "autodeploy-demo-kv";
pub const KV_TABLE_ADDRESS: &str = "module.kv_table.aws_dynamodb_table.this";

/// One reusable infrastructure module template. `dir_name` is the on-disk
/// template directory as well as the target under `<work_dir>/modules/`;
/// `module_name` is the name of the module block in the generated root file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StackKind {
    Registry,
    ContainerService,
    ContainerCluster,
    StaticSite,
    Routing,
    Database,
    KvTable,
}

impl StackKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            StackKind::Registry => "registry",
            StackKind::ContainerService => "container-service",
            StackKind::ContainerCluster => "container-cluster",
            StackKind::StaticSite => "static-site",
            StackKind::Routing => "routing",
            StackKind::Database => "database",
            StackKind::KvTable => "kv-table",
        }
    }

    pub fn module_name(&self) -> &'static str {
        match self {
            StackKind::Registry => "registry",
            StackKind::ContainerService => "container_service",
            StackKind::ContainerCluster => "container_cluster",
            StackKind::StaticSite => "static_site",
            StackKind::Routing => "routing",
            StackKind::Database => "database",
            StackKind::KvTable => "kv_table",
        }
    }
}
