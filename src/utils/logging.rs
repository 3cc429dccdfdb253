use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Install the global subscriber.
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG` is
/// honoured and falls back to warnings only, leaving stdout to the printed
/// summaries. Log lines go to stderr unless `log_file` is given.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("mesh_growth=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mesh_growth=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }

    Ok(())
}
