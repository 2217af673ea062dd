use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::stack::StackKind;
use crate::tfvars::TfVars;

/// On-disk IaC artifact set produced by the generator for one run.
///
/// `variables` mirrors what was written to `tfvars_path`; later pipeline
/// stages patch it and re-serialize rather than re-parsing the file ad hoc.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratedConfig {
    pub work_dir: PathBuf,
    pub tfvars_path: PathBuf,
    pub stacks: Vec<StackKind>,
    pub variables: TfVars,
}
