mod warmup;

use std::path::PathBuf;
use std::process::exit;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use ramayana_backend::app_data::AppData;
use ramayana_backend::get_create_data_dir;
use ramayana_backend::helpers::trim_closing_formula;
use ramayana_backend::types::{Language, VerseRecord};
use ramayana_backend::MAX_CHAPTER_SCAN;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ramayana Reader CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Optional path to the data directory holding the corpus database.
    /// If not provided, the RAMAYANA_DIR environment variable is used,
    /// then the platform default.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "RAMAYANA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover per-chapter verse counts and volume totals
    BuildStats {
        /// Volumes to scan
        #[arg(long, value_delimiter = ',', default_values_t = vec![1u32, 2, 3, 4, 5, 6])]
        volumes: Vec<u32>,

        /// Upper bound for the chapter scan within a volume
        #[arg(long, default_value_t = MAX_CHAPTER_SCAN)]
        max_chapter: u32,

        /// Parallel workers
        #[arg(long, default_value_t = 8)]
        jobs: usize,

        /// Language code to fetch (te or dv)
        #[arg(long, default_value = "te")]
        lang: Language,
    },

    /// Fetch and store verse content for every chapter known to the stats
    /// table that is not yet cached
    BuildCache {
        /// Parallel workers
        #[arg(long, default_value_t = 8)]
        jobs: usize,

        /// Language code to fetch (te or dv)
        #[arg(long, default_value = "te")]
        lang: Language,
    },

    /// Print a chapter or a single verse through the cache
    #[command(arg_required_else_help = true)]
    Show {
        #[arg(long)]
        volume: u32,

        #[arg(long)]
        chapter: u32,

        /// 1-based verse number; all verses when omitted
        #[arg(long)]
        verse: Option<u32>,

        /// Language code to fetch (te or dv)
        #[arg(long, default_value = "te")]
        lang: Language,

        /// Print records as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn print_record(record: &VerseRecord) {
    println!("{}", record.canonical_number);
    println!();
    println!("{}", record.verse_text);
    println!();
    if !record.gloss.is_empty() {
        let mut tokens: Vec<&String> = record.gloss.keys().collect();
        tokens.sort();
        for token in tokens {
            println!("  {} - {}", token, record.gloss[token]);
        }
        println!();
    }
    println!("{}", trim_closing_formula(&record.translation));
}

fn show(
    app: &AppData,
    volume: u32,
    chapter: u32,
    verse: Option<u32>,
    lang: Language,
    json: bool,
) -> Result<()> {
    let records = app.cache.get_or_fetch(volume, chapter, lang)?;
    if records.is_empty() {
        return Err(anyhow!("no verses found for volume {} chapter {}", volume, chapter));
    }

    let selected: Vec<&VerseRecord> = match verse {
        Some(n) => {
            let record = records
                .iter()
                .find(|r| r.verse_index == n as i32)
                .ok_or_else(|| {
                    anyhow!(
                        "verse {} not in volume {} chapter {} (1-{})",
                        n,
                        volume,
                        chapter,
                        records.len()
                    )
                })?;
            vec![record]
        }
        None => records.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else {
        for (i, record) in selected.iter().enumerate() {
            if i > 0 {
                println!();
                println!("----");
                println!();
            }
            print_record(record);
        }
    }

    Ok(())
}

fn main() {
    if dotenv().is_err() {
        println!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    // Data directory precedence:
    // - given with --data-dir
    // - set with env var RAMAYANA_DIR
    // - platform default
    let data_dir = match cli.data_dir {
        Some(path) => path,
        None => match get_create_data_dir() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to get data directory: {}", e);
                eprintln!("Use the --data-dir option or set the RAMAYANA_DIR environment variable.");
                exit(1);
            }
        },
    };

    let app = match AppData::new(&data_dir) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to open the corpus database: {}", e);
            exit(1);
        }
    };

    let command_result = match cli.command {
        Commands::BuildStats { volumes, max_chapter, jobs, lang } => {
            warmup::build_stats(&app, &volumes, max_chapter, jobs, lang)
        }

        Commands::BuildCache { jobs, lang } => {
            warmup::build_cache(&app, jobs, lang)
        }

        Commands::Show { volume, chapter, verse, lang, json } => {
            show(&app, volume, chapter, verse, lang, json)
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {}", e);
        exit(1);
    }
}
