use deploy_defs::{Plan, Runtime, StackKind};

/// Ordered stack selection for a plan. Deterministic and idempotent: the
/// same plan always yields the same ordered list.
pub fn select_stacks(plan: &Plan) -> Vec<StackKind> {
    let mut stacks = Vec::new();

    if plan.runtime != Runtime::StaticCdnBucket {
        stacks.push(StackKind::Registry);
    }

    match plan.runtime {
        Runtime::ManagedContainerService => stacks.push(StackKind::ContainerService),
        Runtime::OrchestratedContainerCluster => stacks.push(StackKind::ContainerCluster),
        Runtime::StaticCdnBucket => {}
        Runtime::Vm => {}
    }

    let is_cluster = plan.runtime == Runtime::OrchestratedContainerCluster;

    if plan.front.is_some() && is_cluster {
        stacks.push(StackKind::Routing);
    }

    if plan.runtime == Runtime::StaticCdnBucket || plan.front == Some(Runtime::StaticCdnBucket) {
        stacks.push(StackKind::StaticSite);
    }

    if plan.db.is_some() {
        stacks.push(StackKind::Database);
    }

    // Demo fixture seeded into every cluster deployment; not user-configurable
    if is_cluster {
        stacks.push(StackKind::KvTable);
    }

    stacks
}

/// Variables each stack requires from the root module. The union over the
/// selected stacks becomes `variables.tf`; `tf_type` is the declared type.
pub(crate) fn stack_variables(stack: StackKind) -> &'static [(&'static str, &'static str)] {
    match stack {
        StackKind::Registry => &[("app_name", "string")],
        StackKind::ContainerService => &[
            ("app_name", "string"),
            ("region", "string"),
            ("image", "string"),
            ("container_port", "number"),
            ("health_check_path", "string"),
            ("cpu", "string"),
            ("memory", "string"),
            ("environment", "map(string)"),
        ],
        StackKind::ContainerCluster => &[
            ("app_name", "string"),
            ("region", "string"),
            ("image", "string"),
            ("container_port", "number"),
            ("health_check_path", "string"),
            ("cpu", "number"),
            ("memory", "number"),
            ("desired_count", "number"),
            ("environment", "map(string)"),
        ],
        StackKind::StaticSite => &[
            ("app_name", "string"),
            ("domain", "string"),
            ("enable_tls", "bool"),
        ],
        StackKind::Routing => &[
            ("app_name", "string"),
            ("domain", "string"),
            ("enable_tls", "bool"),
        ],
        StackKind::Database => &[
            ("app_name", "string"),
            ("db_engine", "string"),
            ("db_instance_class", "string"),
            ("db_name", "string"),
            ("db_username", "string"),
        ],
        StackKind::KvTable => &[("kv_table_name", "string")],
    }
}
