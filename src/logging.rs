use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// `$HOME/.local/share/metrodeck/logs`
pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("metrodeck")
        .join("logs"))
}

/// Sends all log output to `app.log` in [`log_dir`]. The terminal is left to
/// the panel display. Returns the log file path.
pub fn init_logger(level: LevelFilter) -> Result<PathBuf, Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("app.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    INIT.call_once(|| {
        if let Ok(()) = CombinedLogger::init(vec![WriteLogger::new(level, config, log_file)]) {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(log_path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}
