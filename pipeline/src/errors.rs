use thiserror::Error;

/// Failure taxonomy of the pipeline. Every variant is fatal to its run;
/// the recoverable infrastructure classes are retried inside the terraform
/// runner and only surface here once recovery is exhausted.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Request parsing failed: {0}")]
    Parse(String),

    #[error("Repository acquisition failed: {0}")]
    Acquisition(String),

    #[error("Repository analysis failed: {0}")]
    Analyze(String),

    #[error("Plan validation failed: {0}")]
    Validation(String),

    #[error("IaC generation failed: {0}")]
    Generation(String),

    #[error("Build failed: {0}")]
    Build(String),

    #[error("Infrastructure operation failed: {0}")]
    Infra(String),
}
