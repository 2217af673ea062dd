use std::collections::VecDeque;

use anyhow::{Context, Result};
use deploy_defs::RunLogger;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Captured outcome of one external process invocation. A non-zero exit is
/// data rather than an error so callers can classify the output.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandResult {
    /// Both streams, for signature matching across whichever stream the
    /// tool wrote to.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// The most useful text to attach to an error.
    pub fn error_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Spawns the command and streams both output pipes line by line into the
/// run's log, keeping the last `max_output_lines` of each for the result.
pub async fn run_generic_command(
    exec: &mut tokio::process::Command,
    logger: &RunLogger,
    stage: &str,
    max_output_lines: usize,
) -> Result<CommandResult> {
    exec.stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());

    let mut child = exec.spawn().context("Failed to spawn command")?;

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    let mut last_stdout_lines = VecDeque::new();
    let mut last_stderr_lines = VecDeque::new();

    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stdout_done || !stderr_done {
        tokio::select! {
            stdout_line = stdout_reader.next_line(), if !stdout_done => {
                match stdout_line {
                    Ok(Some(line)) => {
                        logger.debug(stage, &line);
                        last_stdout_lines.push_back(line);
                        if last_stdout_lines.len() > max_output_lines {
                            last_stdout_lines.pop_front();
                        }
                    },
                    Ok(None) => {
                        stdout_done = true;
                    },
                    Err(e) => {
                        logger.warn(stage, &format!("Error reading stdout: {}", e));
                        stdout_done = true;
                    },
                }
            },
            stderr_line = stderr_reader.next_line(), if !stderr_done => {
                match stderr_line {
                    Ok(Some(line)) => {
                        logger.debug(stage, &line);
                        last_stderr_lines.push_back(line);
                        if last_stderr_lines.len() > max_output_lines {
                            last_stderr_lines.pop_front();
                        }
                    },
                    Ok(None) => {
                        stderr_done = true;
                    },
                    Err(e) => {
                        logger.warn(stage, &format!("Error reading stderr: {}", e));
                        stderr_done = true;
                    },
                }
            },
        }
    }

    let exit_status = child.wait().await.context("Failed to wait for command")?;

    let stdout_text = last_stdout_lines
        .iter()
        .fold(String::new(), |acc, line| acc + line.as_str() + "\n");
    let stderr_text = last_stderr_lines
        .iter()
        .fold(String::new(), |acc, line| acc + line.as_str() + "\n");

    Ok(CommandResult {
        stdout: stdout_text,
        stderr: stderr_text,
        success: exit_status.success(),
    })
}
