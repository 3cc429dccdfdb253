pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{
    default_output_dir, history_output_path, metrics_output_path, ranking_output_path,
};
pub use logging::init_logging;
pub use progress::ProgressReporter;
