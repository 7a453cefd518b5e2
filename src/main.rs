//! # Article Search CLI
//!
//! ```bash
//! article-search serve                       # start the HTTP API
//! article-search fetch                       # provision the index, print its path
//! article-search search "borrow checker" --tag rust --limit 5
//! article-search tags --top 20
//! ```
//!
//! Configuration comes from `--config <file>` (optional) and environment
//! variables; see the `config` module. Logging is controlled by `RUST_LOG`.

use anyhow::Context;
use article_search::config;
use article_search::provision::IndexProvisioner;
use article_search::query::{build_expression, Pagination};
use article_search::{search, server, tags};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Full-text article search over a lazily fetched SQLite index.
#[derive(Parser)]
#[command(name = "article-search", version, about)]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Provision the index artifact and print its local path.
    Fetch,

    /// Run a search and print ranked results.
    Search {
        /// Free-text term (FTS5 syntax).
        #[arg(default_value = "")]
        query: String,

        /// Restrict to articles carrying this tag.
        #[arg(long)]
        tag: Option<String>,

        /// Page size (clamped to 1..=50).
        #[arg(long)]
        limit: Option<String>,

        /// 1-based page number.
        #[arg(long)]
        page: Option<String>,
    },

    /// Print tag frequencies.
    Tags {
        /// Only print the first N tags.
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Fetch => {
            let provisioner = IndexProvisioner::from_config(&cfg);
            let path = provisioner.ensure_index().await?;
            println!("{}", path.display());
        }
        Commands::Search {
            query,
            tag,
            limit,
            page,
        } => {
            let expression = build_expression(&query, tag.as_deref().unwrap_or_default())
                .context("Missing search criteria: pass a query or --tag")?;
            let pagination = Pagination::from_raw(limit.as_deref(), page.as_deref());
            let provisioner = IndexProvisioner::from_config(&cfg);
            let results = search::search(&provisioner, &expression, &pagination).await?;

            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }

            let first = pagination.offset() + 1;
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", first + i as i64, result.title);
                println!("    path: {}", result.path);
                if !result.author.is_empty() {
                    println!("    author: {}", result.author);
                }
                if !result.tags.is_empty() {
                    println!("    tags: {}", result.tags.join(", "));
                }
                println!("    excerpt: \"{}\"", result.snippet.replace('\n', " ").trim());
                println!("    id: {}", result.id);
                println!();
            }
        }
        Commands::Tags { top } => {
            let provisioner = IndexProvisioner::from_config(&cfg);
            let ranked = tags::aggregate_tags(&provisioner).await?;
            let shown = top.unwrap_or(ranked.len());
            for tag in ranked.iter().take(shown) {
                println!("{:>6}  {}", tag.count, tag.name);
            }
        }
    }

    Ok(())
}
