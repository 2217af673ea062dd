mod cmd;
mod recovery;
mod terraform;

pub use cmd::{run_generic_command, CommandResult};
pub use recovery::{classify_failure, RecoverableFailure};
pub use terraform::TerraformRunner;
