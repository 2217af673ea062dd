use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use deploy_defs::{
    DeploymentRequest, LogSink, PipelineResult, RepoFacts, RunLogger, RunStatus, Runtime,
};
use deploy_utils::new_run_id;
use iac_generator::generate_iac;
use terraform_runner::TerraformRunner;

use crate::build::select_build_backend;
use crate::clone::clone_repository;
use crate::collaborators::{AppBuilder, BuildContext, RepoAnalyzer, RequestParser};
use crate::config::ExecutionConfig;
use crate::errors::StageError;
use crate::patch::{apply_prebuild_patch, apply_predeploy_patch};
use crate::store::RunStore;

// Terraform output keys considered for the service URL, in preference
// order.
const SERVICE_URL_OUTPUT: &str = "service_url";
const CDN_DOMAIN_OUTPUT: &str = "cdn_domain";

/// Top-level sequencer. One `execute` call is one run: a fresh run id, an
/// exclusively owned work directory and log buffer, and a single terminal
/// `PipelineResult`. Runs share nothing but the run store; concurrent
/// deployments of the same app name are serialized by the remote state
/// lock, not here.
pub struct Pipeline {
    config: ExecutionConfig,
    store: RunStore,
    parser: Arc<dyn RequestParser>,
    analyzer: Arc<dyn RepoAnalyzer>,
    builder: Arc<dyn AppBuilder>,
    sink: Option<Arc<dyn LogSink>>,
}

impl Pipeline {
    pub fn new(
        config: ExecutionConfig,
        store: RunStore,
        parser: Arc<dyn RequestParser>,
        analyzer: Arc<dyn RepoAnalyzer>,
        builder: Arc<dyn AppBuilder>,
    ) -> Self {
        Pipeline {
            config,
            store,
            parser,
            analyzer,
            builder,
            sink: None,
        }
    }

    /// Streams every log entry to `sink` as it is produced, in addition to
    /// buffering it for the result. Sink failures are non-fatal.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Runs the full pipeline for one request. Never returns an error:
    /// every stage failure is converted into a failed result carrying the
    /// triggering message and the complete log trail.
    pub async fn execute(&self, request: DeploymentRequest) -> PipelineResult {
        let run_id = new_run_id();
        let started = Instant::now();
        let logger = match &self.sink {
            Some(sink) => RunLogger::with_sink(&run_id, sink.clone()),
            None => RunLogger::new(&run_id),
        };

        self.store.create(&run_id, &request);
        self.store.set_status(&run_id, RunStatus::Running);

        let outcome = self.run_stages(&run_id, &request, &logger).await;

        let result = match outcome {
            Ok(service_url) => {
                logger.info("finish", "Run completed successfully");
                PipelineResult {
                    run_id: run_id.clone(),
                    success: true,
                    service_url,
                    error: None,
                    duration_ms: started.elapsed().as_millis(),
                    logs: logger.entries(),
                }
            }
            Err(e) => {
                let message = e.to_string();
                logger.error("finish", &format!("Run failed: {}", message));
                PipelineResult {
                    run_id: run_id.clone(),
                    success: false,
                    service_url: None,
                    error: Some(message),
                    duration_ms: started.elapsed().as_millis(),
                    logs: logger.entries(),
                }
            }
        };

        self.store.complete(&run_id, &result);
        result
    }

    /// Tears down the infrastructure of a previously generated work
    /// directory. Destruction failures are terminal, there is no recovery.
    pub async fn destroy(&self, run_id: &str, work_dir: &Path) -> Result<()> {
        let logger = match &self.sink {
            Some(sink) => RunLogger::with_sink(run_id, sink.clone()),
            None => RunLogger::new(run_id),
        };
        let runner = TerraformRunner::new(work_dir, logger);
        runner.init().await?;
        runner.destroy().await
    }

    async fn run_stages(
        &self,
        run_id: &str,
        request: &DeploymentRequest,
        logger: &RunLogger,
    ) -> Result<Option<String>> {
        // parse
        logger.info("parse", "Parsing deployment request");
        let mut spec = self
            .parser
            .parse(&request.description)
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;
        if let Some(region) = self.config.region_override {
            spec.region = region;
        }
        logger.info(
            "parse",
            &format!("Parsed request for app {} in {}", spec.app_name, spec.region.as_str()),
        );

        // clone
        let run_root = self.config.work_root.join(run_id);
        let repo_dir = run_root.join("source");
        logger.info("clone", &format!("Acquiring repository {}", request.repo_url));
        clone_repository(&request.repo_url, request.branch.as_deref(), &repo_dir, logger)
            .await
            .map_err(|e| StageError::Acquisition(e.to_string()))?;

        // analyze
        logger.info("analyze", "Analyzing repository");
        let facts = self
            .analyzer
            .analyze(&repo_dir)
            .await
            .map_err(|e| StageError::Analyze(e.to_string()))?;
        logger.log_with(
            "analyze",
            deploy_defs::LogLevel::Info,
            &format!("Detected {} app(s)", facts.apps.len()),
            Some(serde_json::json!({ "monorepo": facts.monorepo })),
        );

        // plan
        logger.info("plan", "Creating infrastructure plan");
        let plan = planner::create_plan(&spec, &facts);
        let violations = planner::validate_plan(&plan, &spec, &facts);
        if !violations.is_empty() {
            return Err(StageError::Validation(violations.join("; ")).into());
        }
        logger.info(
            "plan",
            &format!(
                "Selected runtime {} (db: {})",
                plan.runtime.as_str(),
                plan.db.map(|db| db.as_str()).unwrap_or("none")
            ),
        );

        // iac_generate
        logger.info("iac_generate", "Generating terraform configuration");
        let iac_dir = run_root.join("iac");
        let mut config = generate_iac(
            &spec,
            &plan,
            &iac_dir,
            &self.config.template_root,
            &self.config.backend_settings(),
        )
        .map_err(|e| StageError::Generation(e.to_string()))?;

        // pre-build variable patch
        let port_normalized = apply_prebuild_patch(&mut config, &plan, &facts, logger)
            .map_err(|e| StageError::Generation(e.to_string()))?;

        // build
        let image = if plan.runtime == Runtime::StaticCdnBucket {
            None
        } else {
            self.build_stage(run_id, &spec.app_name, &facts, &repo_dir, logger)
                .await?
        };

        // pre-deploy variable patch, only meaningful before a real deploy
        if self.config.real_deploy {
            apply_predeploy_patch(
                &mut config,
                &spec,
                &plan,
                &facts,
                image.as_deref(),
                port_normalized,
                logger,
            )
            .map_err(|e| StageError::Generation(e.to_string()))?;
        }

        // deploy
        let service_url = if self.config.real_deploy {
            logger.info("deploy", "Deploying with terraform");
            let runner = TerraformRunner::new(&config.work_dir, logger.clone());
            runner
                .init()
                .await
                .map_err(|e| StageError::Infra(e.to_string()))?;
            let outputs = runner
                .apply()
                .await
                .map_err(|e| StageError::Infra(e.to_string()))?;
            derive_service_url(&outputs, logger)
        } else {
            let url = simulated_url(&spec.app_name, plan.runtime);
            logger.info(
                "deploy",
                &format!("Simulated deploy, service would be available at {}", url),
            );
            Some(url)
        };

        Ok(service_url)
    }

    async fn build_stage(
        &self,
        run_id: &str,
        app_name: &str,
        facts: &RepoFacts,
        repo_dir: &Path,
        logger: &RunLogger,
    ) -> Result<Option<String>> {
        logger.info("build", "Building application");

        if !self.config.real_build {
            return match &self.config.registry {
                Some(registry) => {
                    let image = format!("{}/{}:{}", registry, app_name, run_id);
                    logger.info("build", &format!("Simulated build, image tag {}", image));
                    Ok(Some(image))
                }
                None => {
                    logger.warn(
                        "build",
                        "Simulated build with no registry configured, skipping image tag",
                    );
                    Ok(None)
                }
            };
        }

        let primary = facts
            .primary_app()
            .ok_or_else(|| StageError::Build("No deployable app detected".to_string()))?;
        let context = BuildContext {
            run_id: run_id.to_string(),
            repo_dir: PathBuf::from(repo_dir),
            registry: self.config.registry.clone(),
            backend: select_build_backend(primary),
        };
        logger.info(
            "build",
            &format!("Building {} with {:?} backend", primary.path, context.backend),
        );
        let artifact = self
            .builder
            .build(primary, &context)
            .await
            .map_err(|e| StageError::Build(e.to_string()))?;
        if let Some(image) = &artifact.image {
            logger.info("build", &format!("Built image {}", image));
        }
        Ok(artifact.image)
    }
}

/// Prefers the primary service endpoint, falls back to the CDN endpoint,
/// otherwise warns and leaves the URL unset. Success is still reported
/// without a URL.
fn derive_service_url(outputs: &HashMap<String, String>, logger: &RunLogger) -> Option<String> {
    if let Some(url) = outputs.get(SERVICE_URL_OUTPUT).filter(|v| !v.is_empty()) {
        return Some(url.clone());
    }
    if let Some(domain) = outputs.get(CDN_DOMAIN_OUTPUT).filter(|v| !v.is_empty()) {
        return Some(format!("https://{}", domain));
    }
    logger.warn(
        "deploy",
        "No service endpoint found in terraform outputs, leaving service URL unset",
    );
    None
}

fn simulated_url(app_name: &str, runtime: Runtime) -> String {
    format!("https://{}-{}.simulated.local", app_name, runtime.slug())
}
