use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use deploy_defs::{RunLogger, TfVars, KV_TABLE_ADDRESS, KV_TABLE_DEFAULT_NAME};

use crate::cmd::{run_generic_command, CommandResult};
use crate::recovery::{classify_failure, RecoverableFailure};

const STAGE: &str = "deploy";
const PLAN_FILE: &str = "planfile";

/// Drives terraform over one generated working directory:
/// init -> plan -> apply, plus destroy as an independent entry point.
///
/// Plan and apply carry bounded recovery for the two recoverable failure
/// classes; each signature is retried exactly once per invocation. All raw
/// tool output flows into the run logger regardless of outcome.
pub struct TerraformRunner {
    work_dir: PathBuf,
    logger: RunLogger,
}

impl TerraformRunner {
    pub fn new(work_dir: &Path, logger: RunLogger) -> Self {
        TerraformRunner {
            work_dir: work_dir.to_path_buf(),
            logger,
        }
    }

    async fn run(&self, args: &[&str], max_output_lines: usize) -> Result<CommandResult> {
        let mut exec = tokio::process::Command::new("terraform");
        exec.args(args)
            .arg("-no-color")
            .current_dir(&self.work_dir);
        self.logger
            .debug(STAGE, &format!("Running terraform {}", args.join(" ")));
        run_generic_command(&mut exec, &self.logger, STAGE, max_output_lines).await
    }

    /// Initializes the backend. Failure is fatal, there is no recovery
    /// before a working backend exists.
    pub async fn init(&self) -> Result<()> {
        self.logger.info(STAGE, "Running terraform init");
        let result = self.run(&["init", "-input=false"], 200).await?;
        if !result.success {
            bail!("terraform init failed: {}", result.error_text());
        }
        Ok(())
    }

    /// Produces the reusable plan artifact. On a state-lock conflict the
    /// identified lock is force-released and the plan retried once; the
    /// retry's result is propagated as-is.
    pub async fn plan(&self) -> Result<()> {
        let first = self.plan_once().await?;
        if first.success {
            return Ok(());
        }

        if let Some(RecoverableFailure::StateLockConflict { lock_id }) =
            classify_failure(&first.combined())
        {
            self.logger.warn(
                STAGE,
                &format!("State lock conflict during plan, force-unlocking {}", lock_id),
            );
            self.force_unlock(&lock_id).await?;
            let retry = self.plan_once().await?;
            if retry.success {
                return Ok(());
            }
            bail!(
                "terraform plan failed after lock recovery: {}",
                retry.error_text()
            );
        }

        bail!("terraform plan failed: {}", first.error_text());
    }

    /// Applies the plan artifact, computing it first if absent, and reads
    /// back the declared outputs. Two independently evaluated recovery
    /// branches, each bounded to a single retry:
    /// a surviving fixed-name demo table is imported into state, a held
    /// state lock is force-released.
    pub async fn apply(&self) -> Result<HashMap<String, String>> {
        if !self.work_dir.join(PLAN_FILE).is_file() {
            self.plan().await?;
        }

        let first = self.apply_once().await?;
        if first.success {
            return self.outputs().await;
        }

        match classify_failure(&first.combined()) {
            Some(RecoverableFailure::KvTableExists) => {
                self.logger.warn(
                    STAGE,
                    "Demo table already exists, importing it into state and retrying apply",
                );
                self.import_kv_table().await?;
                self.retry_apply("after importing existing table").await
            }
            Some(RecoverableFailure::StateLockConflict { lock_id }) => {
                self.logger.warn(
                    STAGE,
                    &format!("State lock conflict during apply, force-unlocking {}", lock_id),
                );
                self.force_unlock(&lock_id).await?;
                self.retry_apply("after lock recovery").await
            }
            None => bail!("terraform apply failed: {}", first.error_text()),
        }
    }

    /// Tears the deployment down. Mirrors apply without plan reuse and
    /// without conflict recovery; destruction failures are terminal.
    pub async fn destroy(&self) -> Result<()> {
        self.logger.info(STAGE, "Running terraform destroy");
        let result = self
            .run(&["destroy", "-input=false", "-auto-approve"], 500)
            .await?;
        if !result.success {
            bail!("terraform destroy failed: {}", result.error_text());
        }
        Ok(())
    }

    /// All declared outputs as a flat key -> value map.
    pub async fn outputs(&self) -> Result<HashMap<String, String>> {
        let result = self.run(&["output", "-json"], 1000).await?;
        if !result.success {
            bail!("terraform output failed: {}", result.error_text());
        }
        parse_outputs(&result.stdout)
    }

    async fn plan_once(&self) -> Result<CommandResult> {
        self.run(
            &["plan", "-input=false", &format!("-out={}", PLAN_FILE)],
            500,
        )
        .await
    }

    async fn apply_once(&self) -> Result<CommandResult> {
        self.run(&["apply", "-input=false", PLAN_FILE], 500).await
    }

    // One plan + apply round for the recovery branches. The plain
    // plan_once keeps the retry bounded: a second conflict of either kind
    // fails the run.
    async fn retry_apply(&self, context: &str) -> Result<HashMap<String, String>> {
        let plan = self.plan_once().await?;
        if !plan.success {
            bail!("terraform plan failed {}: {}", context, plan.error_text());
        }
        let retry = self.apply_once().await?;
        if !retry.success {
            bail!("terraform apply failed {}: {}", context, retry.error_text());
        }
        self.outputs().await
    }

    async fn force_unlock(&self, lock_id: &str) -> Result<()> {
        let result = self.run(&["force-unlock", "-force", lock_id], 50).await?;
        if !result.success {
            bail!(
                "terraform force-unlock {} failed: {}",
                lock_id,
                result.error_text()
            );
        }
        Ok(())
    }

    async fn import_kv_table(&self) -> Result<()> {
        let table_name = self.kv_table_name();
        let result = self
            .run(
                &["import", "-input=false", KV_TABLE_ADDRESS, &table_name],
                200,
            )
            .await?;
        if !result.success {
            bail!(
                "terraform import of {} failed: {}",
                table_name,
                result.error_text()
            );
        }
        Ok(())
    }

    fn kv_table_name(&self) -> String {
        TfVars::from_json_file(&self.work_dir.join("terraform.tfvars.json"))
            .ok()
            .and_then(|vars| {
                vars.get_str(deploy_defs::tfvars::KV_TABLE_NAME)
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| KV_TABLE_DEFAULT_NAME.to_string())
    }
}

fn parse_outputs(stdout: &str) -> Result<HashMap<String, String>> {
    let value: Value =
        serde_json::from_str(stdout).context("Could not parse terraform output json")?;

    let mut outputs = HashMap::new();
    if let Some(object) = value.as_object() {
        for (key, entry) in object {
            // `terraform output -json` wraps each output in {value, type}
            let inner = entry.get("value").unwrap_or(entry);
            let rendered = match inner {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            outputs.insert(key.clone(), rendered);
        }
    }
    Ok(outputs)
}
