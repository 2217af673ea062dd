//! Generates a self-contained terraform configuration tree for one run:
//! stack selection, template materialization and root-file synthesis.

mod generate;
mod rootfiles;
mod sizing;
mod stacks;

pub use generate::{
    generate_iac, BackendSettings, DEFAULT_CONTAINER_PORT, DEFAULT_HEALTH_CHECK_PATH,
};
pub use sizing::{cluster_cpu, cluster_memory, db_instance_class, service_cpu, service_memory};
pub use stacks::select_stacks;
