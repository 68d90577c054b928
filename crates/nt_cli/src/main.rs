mod commands;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use nt_core::{BuilderConfig, ErrorPolicy};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Normalize scraped news articles and report on clusters",
    long_about = None
)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build raw scraped articles and merge them into a document
    Ingest {
        /// JSON array of raw scraped articles
        raw: PathBuf,
        /// Label of the outlet the articles were scraped from
        #[arg(long)]
        source: String,
        /// Article document to create or update
        #[arg(long)]
        out: PathBuf,
        /// Skip records with unextractable fields instead of keeping them with defaults
        #[arg(long)]
        strict: bool,
        /// Language used when detection fails
        #[arg(long, default_value = "en")]
        default_language: String,
        /// Title used when a record has none
        #[arg(long, default_value = "untitled")]
        placeholder_title: String,
    },
    /// Print articles grouped by cluster
    Clusters { doc: PathBuf },
    /// Select articles by language
    Filter {
        doc: PathBuf,
        #[arg(long)]
        language: String,
        /// Save the selection to this document instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print one article as JSON
    Show { doc: PathBuf, id: String },
    /// Print the entity links of one type for an article
    Links {
        doc: PathBuf,
        id: String,
        #[arg(long = "type")]
        entity_type: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Ingest {
            raw,
            source,
            out,
            strict,
            default_language,
            placeholder_title,
        } => {
            let policy = if strict { ErrorPolicy::Abort } else { ErrorPolicy::Degrade };
            let config = BuilderConfig::new()
                .with_default_language(default_language)
                .with_placeholder_title(placeholder_title)
                .with_error_policy(policy);
            info!("📰 Ingesting {} from {}", raw.display(), source);
            commands::ingest(&raw, &source, &out, config)?;
        }
        Commands::Clusters { doc } => commands::clusters(&doc, stdout)?,
        Commands::Filter { doc, language, out } => {
            commands::filter(&doc, &language, out, stdout)?;
        }
        Commands::Show { doc, id } => commands::show(&doc, &id, stdout)?,
        Commands::Links { doc, id, entity_type } => {
            commands::links(&doc, &id, &entity_type, stdout)?;
        }
    }

    Ok(())
}
