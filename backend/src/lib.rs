pub mod types;
pub mod helpers;
pub mod logger;
pub mod parse;
pub mod fetch;
pub mod cache;
pub mod stats;
pub mod app_data;

pub mod db;

use std::env;
use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use app_dirs::{get_app_root, AppDataType, AppInfo};

/// The corpus has six volumes (kandas 1-6 on the upstream site).
pub static VOLUME_COUNT: u32 = 6;

/// Hard cap for the sequential end-of-volume scan. No volume in the corpus
/// comes near this many chapters.
pub static MAX_CHAPTER_SCAN: u32 = 300;

pub static CORPUS_DB_FILENAME: &'static str = "corpus.sqlite3";

pub const APP_INFO: AppInfo = AppInfo { name: "ramayana-reader", author: "ramayana" };

pub fn get_create_app_root() -> Result<PathBuf, Box<dyn Error>> {
    let p = get_app_root(AppDataType::UserData, &APP_INFO)?;
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}

/// The directory holding the corpus database and log files.
/// The RAMAYANA_DIR environment variable overrides the platform default.
pub fn get_create_data_dir() -> Result<PathBuf, Box<dyn Error>> {
    if let Ok(s) = env::var("RAMAYANA_DIR") {
        let p = PathBuf::from(s);
        if !p.exists() {
            create_dir_all(&p)?;
        }
        return Ok(p);
    }
    get_create_app_root()
}

pub fn get_corpus_db_path() -> PathBuf {
    get_create_data_dir()
        .unwrap_or(PathBuf::from("."))
        .join(CORPUS_DB_FILENAME)
}
