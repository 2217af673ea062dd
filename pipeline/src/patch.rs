use anyhow::Result;
use serde_json::Value;

use deploy_defs::{tfvars, DeploySpec, GeneratedConfig, Plan, RepoFacts, RunLogger, Runtime};
use iac_generator::{
    cluster_cpu, cluster_memory, DEFAULT_CONTAINER_PORT, DEFAULT_HEALTH_CHECK_PATH,
};

const STAGE: &str = "patch_vars";

/// Port the managed service expects well-known Python web apps on; Flask
/// containers are normalized to it so the health check, the service port
/// and the app's PORT env var line up.
pub const FLASK_STANDARD_PORT: u16 = 8000;

/// Pre-build patch: for a Flask app on the managed container service the
/// container port is pinned to the standard value before the image is
/// built. Returns whether the normalization applied, so the pre-deploy
/// patch does not overwrite the port with the detected one.
pub fn apply_prebuild_patch(
    config: &mut GeneratedConfig,
    plan: &Plan,
    facts: &RepoFacts,
    logger: &RunLogger,
) -> Result<bool> {
    if plan.runtime != Runtime::ManagedContainerService {
        return Ok(false);
    }
    let is_flask = facts
        .primary_app()
        .is_some_and(|app| app.has_framework("flask"));
    if !is_flask {
        return Ok(false);
    }

    let port = FLASK_STANDARD_PORT as u64;
    config.variables.set_number(tfvars::CONTAINER_PORT, port);
    config
        .variables
        .set_str(tfvars::HEALTH_CHECK_PATH, DEFAULT_HEALTH_CHECK_PATH);
    config.variables.set_env_var("PORT", &port.to_string());
    config.variables.write_json_file(&config.tfvars_path)?;

    logger.info(
        STAGE,
        &format!(
            "Normalized Flask container port to {} and aligned health check",
            port
        ),
    );
    Ok(true)
}

/// Pre-deploy patch: injects the values only known after the build into
/// the variables file. Applied in real-execution mode just before
/// terraform runs.
pub fn apply_predeploy_patch(
    config: &mut GeneratedConfig,
    spec: &DeploySpec,
    plan: &Plan,
    facts: &RepoFacts,
    image: Option<&str>,
    port_normalized: bool,
    logger: &RunLogger,
) -> Result<()> {
    let vars = &mut config.variables;

    if let Some(image) = image {
        vars.set_str(tfvars::IMAGE, image);
    }

    if !port_normalized {
        let detected_port = facts
            .primary_app()
            .and_then(|app| app.ports.first().copied())
            .unwrap_or(DEFAULT_CONTAINER_PORT);
        vars.set_number(tfvars::CONTAINER_PORT, detected_port as u64);
    }

    vars.set_if_absent(
        tfvars::HEALTH_CHECK_PATH,
        Value::String(DEFAULT_HEALTH_CHECK_PATH.to_string()),
    );

    let port = vars
        .get_u64(tfvars::CONTAINER_PORT)
        .unwrap_or(DEFAULT_CONTAINER_PORT as u64);
    vars.set_env_var("PORT", &port.to_string());
    vars.set_env_var("AWS_REGION", spec.region.as_str());
    vars.set_env_var("AWS_DEFAULT_REGION", spec.region.as_str());

    if plan.runtime == Runtime::OrchestratedContainerCluster {
        vars.set_if_absent(tfvars::CPU, Value::from(cluster_cpu(spec.hints.perf)));
        vars.set_if_absent(tfvars::MEMORY, Value::from(cluster_memory(spec.hints.perf)));
        vars.set_if_absent(tfvars::DESIRED_COUNT, Value::from(1));
    }

    config.variables.write_json_file(&config.tfvars_path)?;
    logger.info(
        STAGE,
        &format!(
            "Patched variables for deploy (image: {}, port: {})",
            image.unwrap_or("<none>"),
            port
        ),
    );
    Ok(())
}
