mod file;
mod ids;
mod logging;
mod time;

pub use file::copy_dir_recursive;
pub use ids::new_run_id;
pub use logging::setup_logging;
pub use time::{get_epoch, get_timestamp};
