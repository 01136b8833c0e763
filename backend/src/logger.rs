use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;

use crate::get_create_data_dir;

/// Log levels representing increasing verbosity.
///
/// Setting a log level enables that level and all less verbose levels below
/// it. The level can be set via the `LOG_LEVEL` environment variable or at
/// runtime using `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "Silent",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }
}

/// Rotates log files, keeping only the last 5 log files
fn rotate_log_files(log_file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match log_file.try_exists() {
        Ok(true) => {}
        Ok(false) => return Ok(()),
        Err(_) => return Ok(()),
    }

    let metadata = std::fs::metadata(log_file)?;
    let modified = metadata.modified()?;

    let datetime: DateTime<Local> = modified.into();
    let timestamp = datetime.format("%Y-%m-%dT%H-%M-%S");

    let parent = log_file.parent().ok_or("No parent directory")?;
    let new_name = format!("log.{}.txt", timestamp);
    let new_path = parent.join(&new_name);

    std::fs::rename(log_file, &new_path)?;

    let mut log_files: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                filename.starts_with("log.") && filename.ends_with(".txt") && filename != "log.txt"
            } else {
                false
            }
        })
        .collect();

    // Sort by filename (which sorts by datetime)
    log_files.sort();

    if log_files.len() > 5 {
        for file in &log_files[0..log_files.len() - 5] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: PathBuf,
    disable_log: bool,
    enable_print_log: bool,
    level: Arc<Mutex<Level>>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = get_create_data_dir()
            .map_err(|e| format!("Failed to get data dir: {}", e))?;

        std::fs::create_dir_all(&data_dir)?;
        let log_file = data_dir.join("log.txt");

        if let Err(e) = rotate_log_files(&log_file) {
            eprintln!("Failed to rotate log files: {}", e);
        }

        let disable_log = std::env::var("DISABLE_LOG")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let enable_print_log = std::env::var("ENABLE_PRINT_LOG")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_str(&v))
            .unwrap_or(Level::Info);

        Ok(Logger {
            log_file,
            disable_log,
            enable_print_log,
            level: Arc::new(Mutex::new(level)),
        })
    }

    pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(false)
            .with_line_number(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    fn write_to_file(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.disable_log {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        let log_line = format!("[{}] {}\n", timestamp, message);

        file.write_all(log_line.as_bytes())?;

        Ok(())
    }

    fn log(&self, min_level: Level, label: &str, msg: &str) {
        if let Ok(level) = self.level.lock() {
            if *level < min_level {
                return;
            }
        }

        if self.enable_print_log {
            match min_level {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                _ => tracing::info!("{}", msg),
            }
        }

        let formatted_msg = format!("{}: {}", label, msg);
        if let Err(e) = self.write_to_file(&formatted_msg) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, "DEBUG", msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, "INFO", msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, "WARN", msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, "ERROR", msg);
    }

    pub fn get_level(&self) -> Level {
        self.level.lock().map(|l| *l).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, new_level: Level) {
        if let Ok(mut level) = self.level.lock() {
            *level = new_level;
        }
    }
}

// Global logger instance using OnceLock for thread-safe initialization
pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(e) = Logger::init_tracing() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });

    let logger = LOGGER.get_or_init(|| {
        match Logger::new() {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Failed to create logger: {}", e);
                // Return a disabled logger that will silently do nothing
                Logger {
                    log_file: PathBuf::new(),
                    disable_log: true,
                    enable_print_log: false,
                    level: Arc::new(Mutex::new(Level::Info)),
                }
            }
        }
    });

    f(logger)
}

// Public API functions
pub fn info(msg: &str) {
    with_logger(|logger| logger.info(msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.warn(msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.error(msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.debug(msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the log level from a string (case insensitive).
///
/// Valid values: "silent", "error", "warn", "info", "debug"
///
/// Returns true if successful, false if the string is not a valid level.
pub fn set_log_level_str(level_str: &str) -> bool {
    if let Some(level) = Level::from_str(level_str) {
        set_log_level(level);
        true
    } else {
        false
    }
}
