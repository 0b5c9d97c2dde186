use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trackdex::db::models::Track;
use trackdex::loader::LoadError;

#[derive(Parser)]
#[command(name = "trackdex", version, about = "CSV music-track loader and artist search")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV file of track metadata into the library
    Load {
        /// CSV file to load
        csv: PathBuf,
    },

    /// Find tracks whose artists field contains a substring
    Find {
        /// Artist name (or fragment) to search for
        artist: String,
    },

    /// List every track in the library
    List,

    /// Show library statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = trackdex::config::AppConfig::load();

    // Resolve database path: CLI > config > XDG default
    let db_path = cli
        .db_path
        .or(config.db_path.clone())
        .unwrap_or_else(trackdex::config::default_db_path);
    log::info!("Database: {}", db_path.display());

    let db = trackdex::db::Database::open(&db_path).context("Failed to open database")?;

    match cli.command {
        Commands::Load { csv } => {
            let result = match trackdex::loader::load_into(&db, &csv, config.delimiter()) {
                Ok(result) => result,
                Err(LoadError::Rows(bad)) => {
                    for b in &bad {
                        eprintln!("line {}: {}", b.line, b.error);
                    }
                    anyhow::bail!("{} row(s) failed to parse; nothing was loaded", bad.len());
                }
                Err(e) => return Err(e).context("Load failed"),
            };
            println!("Loaded {} tracks into {}", result.inserted, db_path.display());
        }

        Commands::Find { artist } => {
            let results = db.find_by_artist(&artist).context("Query failed")?;

            if results.is_empty() {
                println!("No tracks matching \"{}\".", artist);
                return Ok(());
            }

            println!("{} tracks matching \"{}\":", results.len(), artist);
            println!();
            print_track_table(&results);
        }

        Commands::List => {
            let results = db.get_all().context("Query failed")?;

            if results.is_empty() {
                println!("Library is empty. Run `trackdex load <csv>` first.");
                return Ok(());
            }

            print_track_table(&results);
        }

        Commands::Stats => {
            let stats = db.stats().context("Failed to get stats")?;
            println!("Library Statistics");
            println!("==================");
            println!("Total tracks:     {}", stats.total_tracks);
            println!("Distinct artists: {}", stats.distinct_artists);
            if let Some(tempo) = stats.avg_tempo {
                println!("Average tempo:    {:.1} BPM", tempo);
            }
            if let Some(duration_ms) = stats.avg_duration_ms {
                println!("Average length:   {:.1} min", duration_ms / 60_000.0);
            }
        }
    }

    Ok(())
}

/// Print a table of tracks.
fn print_track_table(tracks: &[Track]) {
    println!(
        "{:<30} {:<25} {:>6} {:>5}  {:>3} {:>3} {:>5} {:>5}",
        "Name", "Artists", "Tempo", "Min", "Key", "Sig", "Dnc", "Enr"
    );
    println!("{}", "-".repeat(90));

    for t in tracks {
        println!(
            "{:<30} {:<25} {:>6.1} {:>5.1}  {:>3} {:>3} {:>5.2} {:>5.2}",
            truncate(&t.name, 30),
            truncate(&t.artists, 25),
            t.tempo,
            t.duration_min(),
            t.key,
            t.time_signature,
            t.danceability,
            t.energy,
        );
    }

    // Legend
    println!();
    println!("Sig=Time signature  Dnc=Danceability  Enr=Energy");
}

/// Truncate long names to `max` characters for table display.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
