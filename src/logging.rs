use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives are read from this variable, e.g. `FLASHDRILL_LOG=debug`.
pub const LOG_ENV: &str = "FLASHDRILL_LOG";

/// Append structured logs to `path`. The terminal belongs to the UI, so
/// nothing is ever written to stdout or stderr.
pub fn init_logging(path: &Path) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
