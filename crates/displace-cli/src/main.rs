//! displace CLI - Command-line interface
//!
//! Usage:
//!   displace extract <parsed-article.json>
//!   displace extract - < parsed-article.json
//!   displace dates <parsed-article.json> --published 2017-05-10
//!   displace keywords

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use displace_core::{AppConfig, KeywordConfig, ParsedDocument, SuffixLemmatizer};
use displace_extractor::{DateResolver, Engine};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod phrase;

use phrase::SimpleDateParser;

#[derive(Parser)]
#[command(name = "displace")]
#[command(about = "Extract displacement reports from dependency-parsed news articles")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reports from a parsed article (JSON), "-" for stdin
    Extract {
        /// Path to the parsed article
        input: String,
        /// Keyword override file (TOML)
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Resolve date mentions in a parsed article (JSON), "-" for stdin
    Dates {
        /// Path to the parsed article
        input: String,
        /// Publication date (YYYY-MM-DD) to anchor relative phrases
        #[arg(long)]
        published: Option<NaiveDate>,
    },
    /// Print the effective keyword configuration as TOML
    Keywords,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            input,
            keywords,
            pretty,
        } => extract(&config, &input, keywords, pretty),
        Commands::Dates { input, published } => dates(&input, published),
        Commands::Keywords => print_keywords(&config),
    }
}

fn load_keywords(config: &AppConfig, flag: Option<PathBuf>) -> anyhow::Result<KeywordConfig> {
    let path = flag.or_else(|| config.keywords.clone());
    match path {
        Some(path) => KeywordConfig::from_file(&path)
            .with_context(|| format!("loading keywords from {}", path.display())),
        None => Ok(KeywordConfig::default()),
    }
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading parsed article from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}

fn extract(
    config: &AppConfig,
    input: &str,
    keywords: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let keywords = load_keywords(config, keywords)?;
    let engine = Engine::new(&keywords, Box::new(SuffixLemmatizer::new()));

    let content = read_input(input)?;
    let doc: ParsedDocument =
        serde_json::from_str(&content).context("parsing article JSON")?;

    let reports = engine.process_article(&doc);
    info!(count = reports.len(), "extraction finished");

    let out = if pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{out}");
    Ok(())
}

fn dates(input: &str, published: Option<NaiveDate>) -> anyhow::Result<()> {
    let content = read_input(input)?;
    let doc: ParsedDocument =
        serde_json::from_str(&content).context("parsing article JSON")?;

    let parser = SimpleDateParser;
    let resolver = DateResolver::new(&parser);
    let published: Option<NaiveDateTime> = published.and_then(|d| d.and_hms_opt(0, 0, 0));
    let dates = resolver.extract_all_dates(&doc, published);

    let formatted: Vec<String> = dates.iter().map(|d| d.date().to_string()).collect();
    println!("{}", serde_json::to_string(&formatted)?);
    Ok(())
}

fn print_keywords(config: &AppConfig) -> anyhow::Result<()> {
    let keywords = load_keywords(config, None)?;
    print!("{}", toml::to_string_pretty(&keywords)?);
    Ok(())
}
