mod import;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use recipebook_server::{database, seed};

/// Recipebook maintenance tool.
#[derive(Parser)]
#[command(name = "recipebook", version, about = "Recipebook maintenance tool")]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import ingredients from a `.csv` (name,measurement_unit) or `.json` file
    ImportIngredients {
        /// Path to the data file
        file: PathBuf,
    },
    /// Import tags from a `.csv` (name,color,slug) or `.json` file
    ImportTags {
        /// Path to the data file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let url = cli
        .database_url
        .context("No database URL: pass --database-url or set DATABASE_URL")?;

    match cli.command {
        Command::ImportIngredients { file } => {
            let rows = import::load_ingredients(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            tracing::debug!(rows = rows.len(), file = %file.display(), "Parsed import file");
            let db = database::init_db(&url).await?;
            let inserted = seed::seed_ingredients(&db, &rows).await?;
            report("ingredients", rows.len(), inserted, &file);
        }
        Command::ImportTags { file } => {
            let rows = import::load_tags(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            tracing::debug!(rows = rows.len(), file = %file.display(), "Parsed import file");
            let db = database::init_db(&url).await?;
            let inserted = seed::seed_tags(&db, &rows).await?;
            report("tags", rows.len(), inserted, &file);
        }
    }

    Ok(())
}

fn report(what: &str, read: usize, inserted: u64, file: &std::path::Path) {
    println!(
        "{} {} new {} ({} read from {}, {} already present)",
        style("Imported").green().bold(),
        inserted,
        what,
        read,
        file.display(),
        (read as u64).saturating_sub(inserted),
    );
}
