use std::path::Path;

use anyhow::{bail, Result};

use deploy_defs::RunLogger;
use terraform_runner::run_generic_command;

const STAGE: &str = "clone";
const DEFAULT_BRANCH: &str = "main";

/// Acquires the repository with a three-level fallback: shallow clone of
/// the requested branch, shallow clone of the remote's detected default
/// branch, and finally a shallow clone of the remote HEAD with no branch
/// argument. Stops at the first success; only exhaustion of all three
/// fails the stage.
pub async fn clone_repository(
    repo_url: &str,
    requested_branch: Option<&str>,
    destination: &Path,
    logger: &RunLogger,
) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let first_branch = requested_branch.unwrap_or(DEFAULT_BRANCH);

    logger.info(
        STAGE,
        &format!("Clone attempt 1: branch {} of {}", first_branch, repo_url),
    );
    match clone_once(repo_url, Some(first_branch), destination, logger).await {
        Ok(()) => return Ok(()),
        Err(e) => {
            logger.warn(STAGE, &format!("Clone attempt 1 failed: {}", e));
        }
    }

    match detect_default_branch(repo_url, logger).await {
        Some(default_branch) if default_branch != first_branch => {
            logger.info(
                STAGE,
                &format!("Clone attempt 2: detected default branch {}", default_branch),
            );
            match clone_once(repo_url, Some(&default_branch), destination, logger).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    logger.warn(STAGE, &format!("Clone attempt 2 failed: {}", e));
                }
            }
        }
        Some(_) => {
            logger.info(
                STAGE,
                "Detected default branch equals the requested branch, skipping retry",
            );
        }
        None => {
            logger.warn(STAGE, "Could not detect the remote default branch");
        }
    }

    logger.info(STAGE, "Clone attempt 3: remote HEAD with no branch argument");
    match clone_once(repo_url, None, destination, logger).await {
        Ok(()) => Ok(()),
        Err(e) => {
            logger.error(STAGE, &format!("Clone attempt 3 failed: {}", e));
            bail!("Exhausted all clone strategies for {}: {}", repo_url, e)
        }
    }
}

async fn clone_once(
    repo_url: &str,
    branch: Option<&str>,
    destination: &Path,
    logger: &RunLogger,
) -> Result<()> {
    // A failed attempt can leave a partial directory behind that would
    // make the next attempt fail for the wrong reason
    if destination.exists() {
        std::fs::remove_dir_all(destination)?;
    }

    let mut exec = tokio::process::Command::new("git");
    exec.arg("clone").arg("--depth").arg("1");
    if let Some(branch) = branch {
        exec.arg("--branch").arg(branch);
    }
    exec.arg(repo_url).arg(destination);

    let result = run_generic_command(&mut exec, logger, STAGE, 50).await?;
    if !result.success {
        bail!("{}", result.error_text());
    }
    Ok(())
}

async fn detect_default_branch(repo_url: &str, logger: &RunLogger) -> Option<String> {
    let mut exec = tokio::process::Command::new("git");
    exec.arg("ls-remote").arg("--symref").arg(repo_url).arg("HEAD");

    match run_generic_command(&mut exec, logger, STAGE, 50).await {
        Ok(result) if result.success => parse_symref_head(&result.stdout),
        _ => None,
    }
}

// `git ls-remote --symref <url> HEAD` reports the default branch as
// "ref: refs/heads/<name>\tHEAD"
fn parse_symref_head(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("ref: refs/heads/"))
        .and_then(|rest| rest.split_whitespace().next())
        .map(|name| name.to_string())
}
