//! Index SQL CLI
//!
//! Renders indexer source blocks for a JSON index configuration.
//!
//! # Usage
//!
//! ```bash
//! # Render every source
//! index-sql indices.json
//!
//! # Render a single source
//! index-sql indices.json --source article_delta
//!
//! # Print the generated statements as JSON instead
//! index-sql indices.json --json
//! ```
//!
//! # Environment Variables
//!
//! - `INDEX_SQL_CONFIG` - Configuration file, if not given as an argument
//! - `RUST_LOG` - Log filter (default: `info,helios_index_sql=debug`)

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use helios_index_sql::{IndexConfiguration, SourceQueries};
use helios_index_sql::config::render_source;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "index-sql")]
#[command(about = "Generate indexer source SQL from an index configuration")]
struct Args {
    /// Index configuration file (JSON)
    #[arg(env = "INDEX_SQL_CONFIG")]
    config: PathBuf,

    /// Only render the named source
    #[arg(short, long)]
    source: Option<String>,

    /// Print the generated statements as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helios_index_sql=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = IndexConfiguration::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let builders = config.builders()?;

    let selected: Vec<_> = builders
        .iter()
        .filter(|builder| {
            args.source
                .as_deref()
                .is_none_or(|name| builder.source().name == name)
        })
        .collect();

    if selected.is_empty() {
        if let Some(name) = &args.source {
            bail!("no source named '{}'", name);
        }
    }

    tracing::info!(sources = selected.len(), "Rendering sources");

    if args.json {
        let queries: Vec<_> = selected.iter().map(|builder| builder.queries()).collect();
        let queries: Vec<&SourceQueries> = queries.iter().map(AsRef::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&queries)?);
    } else {
        let blocks: Vec<String> = selected.iter().map(|builder| render_source(builder)).collect();
        print!("{}", blocks.join("\n"));
    }

    Ok(())
}
