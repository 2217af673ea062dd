use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use deploy_defs::{
    tfvars, DeploySpec, GeneratedConfig, Plan, StackKind, TfVars, KV_TABLE_DEFAULT_NAME,
};
use deploy_utils::copy_dir_recursive;

use crate::rootfiles::{
    render_backend_tf, render_main_tf, render_outputs_tf, render_summary, render_variables_tf,
};
use crate::sizing::{cluster_cpu, cluster_memory, db_instance_class, service_cpu, service_memory};
use crate::stacks::select_stacks;

pub const DEFAULT_CONTAINER_PORT: u16 = 8080;
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";

/// Remote-state location the generated backend file points at. The bucket
/// and lock table must exist before any run.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub bucket: String,
    pub lock_table: String,
}

/// Writes a complete terraform configuration for the plan into `work_dir`:
/// materialized stack modules plus synthesized root files. The returned
/// config carries the variable set for later patching.
///
/// Fails before writing anything if a selected stack has no template
/// directory under `template_root`. The caller provides a work directory
/// unique to the run, so the write is collision-free per run.
pub fn generate_iac(
    spec: &DeploySpec,
    plan: &Plan,
    work_dir: &Path,
    template_root: &Path,
    backend: &BackendSettings,
) -> Result<GeneratedConfig> {
    let stacks = select_stacks(plan);

    let missing: Vec<&str> = stacks
        .iter()
        .map(|s| s.dir_name())
        .filter(|dir| !template_root.join(dir).is_dir())
        .collect();
    if !missing.is_empty() {
        bail!(
            "Missing stack template directories under {}: {}",
            template_root.display(),
            missing.join(", ")
        );
    }

    let modules_dir = work_dir.join("modules");
    std::fs::create_dir_all(&modules_dir)
        .with_context(|| format!("Failed to create {}", modules_dir.display()))?;

    for stack in &stacks {
        let source = template_root.join(stack.dir_name());
        let target = modules_dir.join(stack.dir_name());
        copy_dir_recursive(&source, &target)?;
        log::debug!("Materialized stack {} into {}", stack.dir_name(), target.display());
    }

    write_file(work_dir, "main.tf", &render_main_tf(&stacks))?;
    write_file(work_dir, "variables.tf", &render_variables_tf(&stacks))?;
    write_file(
        work_dir,
        "backend.tf",
        &render_backend_tf(
            &spec.app_name,
            spec.region.as_str(),
            &backend.bucket,
            &backend.lock_table,
        ),
    )?;
    write_file(work_dir, "outputs.tf", &render_outputs_tf(&stacks))?;
    write_file(work_dir, "SUMMARY.md", &render_summary(spec, plan, &stacks))?;

    let variables = default_tfvars(spec, plan, &stacks);
    let tfvars_path = work_dir.join("terraform.tfvars.json");
    variables.write_json_file(&tfvars_path)?;

    log::info!(
        "Generated {} stacks for {} in {}",
        stacks.len(),
        spec.app_name,
        work_dir.display()
    );

    Ok(GeneratedConfig {
        work_dir: work_dir.to_path_buf(),
        tfvars_path,
        stacks,
        variables,
    })
}

fn write_file(work_dir: &Path, name: &str, content: &str) -> Result<()> {
    let path = work_dir.join(name);
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn default_tfvars(spec: &DeploySpec, plan: &Plan, stacks: &[StackKind]) -> TfVars {
    let mut vars = TfVars::new();
    vars.set_str(tfvars::APP_NAME, &spec.app_name);
    vars.set_str(tfvars::REGION, spec.region.as_str());

    if stacks.contains(&StackKind::ContainerService) {
        vars.set_str(tfvars::IMAGE, "");
        vars.set_number(tfvars::CONTAINER_PORT, DEFAULT_CONTAINER_PORT as u64);
        vars.set_str(tfvars::HEALTH_CHECK_PATH, DEFAULT_HEALTH_CHECK_PATH);
        vars.set_str(tfvars::CPU, service_cpu(spec.hints.perf));
        vars.set_str(tfvars::MEMORY, service_memory(spec.hints.perf));
        vars.set(tfvars::ENVIRONMENT, Value::Object(Map::new()));
    }

    if stacks.contains(&StackKind::ContainerCluster) {
        vars.set_str(tfvars::IMAGE, "");
        vars.set_number(tfvars::CONTAINER_PORT, DEFAULT_CONTAINER_PORT as u64);
        vars.set_str(tfvars::HEALTH_CHECK_PATH, DEFAULT_HEALTH_CHECK_PATH);
        vars.set_number(tfvars::CPU, cluster_cpu(spec.hints.perf));
        vars.set_number(tfvars::MEMORY, cluster_memory(spec.hints.perf));
        vars.set_number(tfvars::DESIRED_COUNT, 1);
        vars.set(tfvars::ENVIRONMENT, Value::Object(Map::new()));
    }

    if stacks.contains(&StackKind::StaticSite) || stacks.contains(&StackKind::Routing) {
        vars.set_str(tfvars::DOMAIN, plan.network.host.as_deref().unwrap_or(""));
        vars.set_bool(tfvars::ENABLE_TLS, plan.network.tls);
    }

    if let Some(db) = plan.db {
        vars.set_str(tfvars::DB_ENGINE, db.as_str());
        vars.set_str(tfvars::DB_INSTANCE_CLASS, db_instance_class(spec.hints.cost));
        vars.set_str(tfvars::DB_NAME, &sanitize_db_name(&spec.app_name));
        vars.set_str(tfvars::DB_USERNAME, "app");
    }

    if stacks.contains(&StackKind::KvTable) {
        vars.set_str(tfvars::KV_TABLE_NAME, KV_TABLE_DEFAULT_NAME);
    }

    vars
}

// Database names must start with a letter and stay alphanumeric
fn sanitize_db_name(app_name: &str) -> String {
    let cleaned: String = app_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if cleaned.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        cleaned
    } else {
        format!("app_{}", cleaned)
    }
}
