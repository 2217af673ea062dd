//! End-to-end pipeline runs in simulated execution mode, against local git
//! fixture repositories and stub collaborators.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use async_trait::async_trait;
use deploy_defs::{
    AppRole, DeploySpec, DeploymentRequest, RepoApp, RepoFacts, RunStatus,
};
use pipeline::{
    AppBuilder, BuildArtifact, BuildContext, ExecutionConfig, Pipeline, RepoAnalyzer,
    RequestParser, RunStore,
};

struct StubParser(DeploySpec);

#[async_trait]
impl RequestParser for StubParser {
    async fn parse(&self, _description: &str) -> Result<DeploySpec, anyhow::Error> {
        Ok(self.0.clone())
    }
}

struct StubAnalyzer(RepoFacts);

#[async_trait]
impl RepoAnalyzer for StubAnalyzer {
    async fn analyze(&self, _repo_dir: &Path) -> Result<RepoFacts, anyhow::Error> {
        Ok(self.0.clone())
    }
}

struct NoopBuilder;

#[async_trait]
impl AppBuilder for NoopBuilder {
    async fn build(
        &self,
        _app: &RepoApp,
        _context: &BuildContext,
    ) -> Result<BuildArtifact, anyhow::Error> {
        Ok(BuildArtifact::default())
    }
}

struct FailingBuilder;

#[async_trait]
impl AppBuilder for FailingBuilder {
    async fn build(
        &self,
        _app: &RepoApp,
        _context: &BuildContext,
    ) -> Result<BuildArtifact, anyhow::Error> {
        Err(anyhow::anyhow!("docker daemon unavailable"))
    }
}

fn demo_spec() -> DeploySpec {
    DeploySpec {
        app_name: "demo".to_string(),
        cloud: Default::default(),
        region: Default::default(),
        hints: Default::default(),
        services: vec![],
        data: Default::default(),
        domain: None,
    }
}

fn flask_facts() -> RepoFacts {
    RepoFacts::from_apps(vec![RepoApp {
        role: AppRole::Api,
        language: "python".to_string(),
        framework: Some("flask".to_string()),
        has_dockerfile: false,
        build_command: None,
        start_command: Some("gunicorn app:app".to_string()),
        ports: vec![5000],
        needs_db: false,
        path: ".".to_string(),
    }])
}

fn template_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .join("stacks")
}

fn run_git(args: &[&str], cwd: &Path) {
    let status = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

fn git_fixture_repo(default_branch: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    run_git(
        &["-c", &format!("init.defaultBranch={}", default_branch), "init"],
        dir.path(),
    );
    std::fs::write(dir.path().join("app.py"), "print('hello')\n").unwrap();
    run_git(&["add", "."], dir.path());
    run_git(
        &[
            "-c",
            "user.email=dev@example.com",
            "-c",
            "user.name=dev",
            "commit",
            "-m",
            "initial",
        ],
        dir.path(),
    );
    dir
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn simulated_pipeline(
    work_root: &Path,
    parser: Arc<dyn RequestParser>,
    analyzer: Arc<dyn RepoAnalyzer>,
    builder: Arc<dyn AppBuilder>,
) -> (Pipeline, RunStore) {
    let config = ExecutionConfig::simulated(work_root.to_path_buf(), template_root());
    let store = RunStore::new();
    let pipeline = Pipeline::new(config, store.clone(), parser, analyzer, builder);
    (pipeline, store)
}

#[tokio::test]
async fn test_simulated_run_succeeds_end_to_end() {
    let work_root = tempfile::tempdir().unwrap();
    let repo = git_fixture_repo("main");
    let (pipeline, store) = simulated_pipeline(
        work_root.path(),
        Arc::new(StubParser(demo_spec())),
        Arc::new(StubAnalyzer(flask_facts())),
        Arc::new(NoopBuilder),
    );

    let result = pipeline
        .execute(DeploymentRequest {
            description: "deploy my flask app".to_string(),
            repo_url: file_url(repo.path()),
            branch: None,
        })
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(
        result.service_url.as_deref(),
        Some("https://demo-service.simulated.local")
    );

    // Every stage left at least one log entry
    for stage in ["parse", "clone", "analyze", "plan", "iac_generate", "build", "deploy", "finish"] {
        assert!(
            result.logs.iter().any(|e| e.stage == stage),
            "missing log entries for stage {}",
            stage
        );
    }

    // The generated tree is in place under the run's work directory
    let iac_dir = work_root.path().join(&result.run_id).join("iac");
    assert!(iac_dir.join("main.tf").is_file());
    assert!(iac_dir.join("terraform.tfvars.json").is_file());
    assert!(iac_dir.join("modules/container-service/main.tf").is_file());

    let record = store.get(&result.run_id).unwrap();
    assert_eq!(record.status, RunStatus::Succeeded);
    assert!(record.result.is_some());
}

#[tokio::test]
async fn test_clone_falls_back_to_detected_default_branch() {
    let work_root = tempfile::tempdir().unwrap();
    let repo = git_fixture_repo("trunk");
    let (pipeline, _store) = simulated_pipeline(
        work_root.path(),
        Arc::new(StubParser(demo_spec())),
        Arc::new(StubAnalyzer(flask_facts())),
        Arc::new(NoopBuilder),
    );

    let result = pipeline
        .execute(DeploymentRequest {
            description: "deploy".to_string(),
            repo_url: file_url(repo.path()),
            branch: None,
        })
        .await;

    assert!(result.success, "error: {:?}", result.error);
    let clone_messages: Vec<&str> = result
        .logs
        .iter()
        .filter(|e| e.stage == "clone")
        .map(|e| e.message.as_str())
        .collect();
    assert!(clone_messages.iter().any(|m| m.contains("Clone attempt 1")));
    assert!(
        clone_messages.iter().any(|m| m.contains("Clone attempt 2")),
        "expected a second attempt with the detected branch: {:?}",
        clone_messages
    );
    assert!(
        !clone_messages.iter().any(|m| m.contains("Clone attempt 3")),
        "fallback must stop at the first success"
    );
}

#[tokio::test]
async fn test_clone_exhaustion_yields_failed_result_with_trail() {
    let work_root = tempfile::tempdir().unwrap();
    let (pipeline, store) = simulated_pipeline(
        work_root.path(),
        Arc::new(StubParser(demo_spec())),
        Arc::new(StubAnalyzer(flask_facts())),
        Arc::new(NoopBuilder),
    );

    let result = pipeline
        .execute(DeploymentRequest {
            description: "deploy".to_string(),
            repo_url: "file:///nonexistent/autodeploy-fixture.git".to_string(),
            branch: None,
        })
        .await;

    assert!(!result.success);
    let error = result.error.as_deref().unwrap();
    assert!(error.contains("Repository acquisition failed"), "{}", error);

    let clone_messages: Vec<&str> = result
        .logs
        .iter()
        .filter(|e| e.stage == "clone")
        .map(|e| e.message.as_str())
        .collect();
    assert!(clone_messages.iter().any(|m| m.contains("Clone attempt 1")));
    assert!(clone_messages.iter().any(|m| m.contains("Clone attempt 3")));

    assert_eq!(store.get(&result.run_id).unwrap().status, RunStatus::Failed);
}

#[tokio::test]
async fn test_builder_failure_aborts_run_with_its_error() {
    let work_root = tempfile::tempdir().unwrap();
    let repo = git_fixture_repo("main");
    let config = {
        let mut config =
            ExecutionConfig::simulated(work_root.path().to_path_buf(), template_root());
        config.real_build = true;
        config
    };
    let store = RunStore::new();
    let pipeline = Pipeline::new(
        config,
        store.clone(),
        Arc::new(StubParser(demo_spec())),
        Arc::new(StubAnalyzer(flask_facts())),
        Arc::new(FailingBuilder),
    );

    let result = pipeline
        .execute(DeploymentRequest {
            description: "deploy".to_string(),
            repo_url: file_url(repo.path()),
            branch: None,
        })
        .await;

    assert!(!result.success);
    let error = result.error.as_deref().unwrap();
    assert!(error.contains("Build failed"), "{}", error);
    assert!(error.contains("docker daemon unavailable"), "{}", error);

    // No deploy stage entries after the failing build
    assert!(!result.logs.iter().any(|e| e.stage == "deploy"));
}

#[tokio::test]
async fn test_static_only_run_skips_build_and_uses_static_url() {
    let work_root = tempfile::tempdir().unwrap();
    let repo = git_fixture_repo("main");
    let static_facts = RepoFacts::from_apps(vec![RepoApp {
        role: AppRole::Web,
        language: "javascript".to_string(),
        framework: Some("react".to_string()),
        has_dockerfile: false,
        build_command: Some("npm run build".to_string()),
        start_command: None,
        ports: vec![],
        needs_db: false,
        path: "web".to_string(),
    }]);
    let (pipeline, _store) = simulated_pipeline(
        work_root.path(),
        Arc::new(StubParser(demo_spec())),
        Arc::new(StubAnalyzer(static_facts)),
        Arc::new(NoopBuilder),
    );

    let result = pipeline
        .execute(DeploymentRequest {
            description: "deploy static site".to_string(),
            repo_url: file_url(repo.path()),
            branch: None,
        })
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(
        result.service_url.as_deref(),
        Some("https://demo-static.simulated.local")
    );

    // Static deployments have nothing to build
    assert!(!result.logs.iter().any(|e| e.stage == "build"));

    // Only the static-site stack was generated
    let iac_dir = work_root.path().join(&result.run_id).join("iac");
    assert!(iac_dir.join("modules/static-site/main.tf").is_file());
    assert!(!iac_dir.join("modules/registry").exists());
}
