//! Pdf-Harvest command line interface

use clap::{Parser, Subcommand};
use pdf_harvest::config::{load_config_or_default, Config};
use pdf_harvest::crawler::Crawler;
use pdf_harvest::index::{
    HttpSearchEngine, Indexer, PdfTextExtractor, SearchEngine, DEFAULT_SEARCH_SIZE,
};
use pdf_harvest::manifest;
use pdf_harvest::pipeline::{Pipeline, RunOutcome};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Pdf-Harvest: crawl a site for PDF documents and make them searchable
#[derive(Parser, Debug)]
#[command(name = "pdf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Crawls a site for PDF documents, downloads them, and makes them searchable", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from a seed URL, download PDFs, and index them
    Crawl {
        /// Seed URL the crawl starts from
        url: String,

        /// Host the crawl may follow links into (repeatable); defaults
        /// to the seed's host
        #[arg(long = "host", value_name = "HOST")]
        hosts: Vec<String>,

        /// Follow links to any host (unbounded on the open web)
        #[arg(long, conflicts_with = "hosts")]
        all_hosts: bool,
    },

    /// Search indexed documents
    Search {
        /// Query matched against name, content, and URLs
        query: String,

        /// Maximum number of hits
        #[arg(long, default_value_t = DEFAULT_SEARCH_SIZE)]
        size: usize,
    },

    /// List documents not yet indexed
    Pending,

    /// Show library statistics from the manifest
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Crawl {
            url,
            hosts,
            all_hosts,
        } => handle_crawl(config, &url, hosts, all_hosts).await?,
        Command::Search { query, size } => handle_search(&config, &query, size).await?,
        Command::Pending => handle_pending(&config),
        Command::Stats => handle_stats(&config),
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pdf_harvest=info,warn"),
            1 => EnvFilter::new("pdf_harvest=debug,info"),
            2 => EnvFilter::new("pdf_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_engine(config: &Config) -> anyhow::Result<HttpSearchEngine> {
    Ok(HttpSearchEngine::new(
        &config.index.engine_url,
        &config.index.index_name,
        Duration::from_secs(config.index.request_timeout_secs),
    )?)
}

/// Resolves the crawl's host scope: CLI hosts win over the config
/// list, which wins over the seed's own host; `--all-hosts` disables
/// scoping entirely
fn resolve_allowed_hosts(
    config: &Config,
    cli_hosts: Vec<String>,
    all_hosts: bool,
    seed: &str,
) -> anyhow::Result<Option<HashSet<String>>> {
    if all_hosts {
        return Ok(None);
    }
    if !cli_hosts.is_empty() {
        return Ok(Some(cli_hosts.into_iter().collect()));
    }
    if !config.crawler.allowed_hosts.is_empty() {
        return Ok(Some(config.crawler.allowed_hosts.iter().cloned().collect()));
    }

    let seed_url = Url::parse(seed)?;
    let host = seed_url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("seed URL {} has no host", seed))?;
    let mut hosts = HashSet::from([host.to_string()]);
    if let Some(port) = seed_url.port() {
        hosts.insert(format!("{host}:{port}"));
    }
    Ok(Some(hosts))
}

async fn handle_crawl(
    config: Config,
    url: &str,
    hosts: Vec<String>,
    all_hosts: bool,
) -> anyhow::Result<()> {
    let allowed_hosts = resolve_allowed_hosts(&config, hosts, all_hosts, url)?;
    match &allowed_hosts {
        Some(hosts) => tracing::info!("Crawl scoped to host(s): {:?}", hosts),
        None => tracing::warn!("Crawl is not host-scoped; this can run unbounded"),
    }

    let engine = build_engine(&config)?;
    // A down engine must not stop the crawl; indexing defers naturally
    if let Err(e) = engine.ensure_index().await {
        tracing::warn!("Could not prepare search index, indexing may be deferred: {}", e);
    }

    let crawler = Crawler::new(&config.crawler, allowed_hosts)?;
    let indexer = Indexer::new(engine, PdfTextExtractor);
    let pipeline = Pipeline::new(crawler, indexer, config.storage.download_dir.clone());

    match pipeline.run(url).await? {
        RunOutcome::Completed(report) => {
            println!("=== Harvest Report ===");
            println!("Downloaded:      {}", report.downloaded);
            println!("Newly indexed:   {}", report.indexed_new);
            println!("Backlog indexed: {}", report.indexed_pending);
            println!("Duplicates:      {}", report.duplicates);
            println!("Skipped:         {}", report.skipped);
            println!("Library total:   {}", report.library_total);
        }
        RunOutcome::Deferred {
            downloaded,
            library_total,
            reason,
        } => {
            println!("Search engine unavailable; indexing deferred ({reason})");
            println!(
                "Downloaded {downloaded} file(s); all recorded in the manifest and will be \
                 indexed on the next run."
            );
            println!("Library total: {library_total}");
        }
    }
    Ok(())
}

async fn handle_search(config: &Config, query: &str, size: usize) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let hits = engine.search(query, size).await?;

    if hits.is_empty() {
        println!("No documents matched '{query}'");
        return Ok(());
    }

    println!("{} hit(s) for '{query}':\n", hits.len());
    for hit in hits {
        println!("  {:.2}  {}", hit.score, hit.name);
        println!("        {}", hit.url);
        if let Some(snippet) = hit.highlight {
            println!("        ...{}...", snippet.replace('\n', " "));
        }
        println!();
    }
    Ok(())
}

fn handle_pending(config: &Config) {
    let manifest = manifest::load(&config.storage.download_dir);
    let pending = manifest::pending(&manifest);

    if pending.is_empty() {
        println!("No pending documents");
        return;
    }

    println!("{} pending document(s):", pending.len());
    for doc in pending {
        println!("  [{}] {}  {}", doc.status, doc.name, doc.url);
    }
}

fn handle_stats(config: &Config) {
    let manifest = manifest::load(&config.storage.download_dir);
    let stats = &manifest.stats;

    println!("=== Library Statistics ===");
    println!("Documents:  {}", stats.total);
    println!("Indexed:    {}", stats.indexed);
    println!("Duplicates: {}", stats.duplicates);
    println!("Skipped:    {}", stats.skipped);
    println!("Total size: {} bytes", stats.total_size);

    if !stats.status_breakdown.is_empty() {
        println!("\nBy status:");
        for (status, count) in &stats.status_breakdown {
            println!("  {status}: {count}");
        }
    }
    if let Some(updated_at) = manifest.updated_at {
        println!("\nLast updated: {}", updated_at.to_rfc3339());
    }
}
