//! CLI for profiling a job posting
//!
//! Prints the combined profile as JSON on stdout. Logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use job_profiler::{
    FirecrawlFetcher, HttpFetcher, OpenAiCompatBackend, PageFetcher, Pipeline,
    PipelineConfig, ProviderConfig, DEFAULT_PROVIDER,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "job-profiler")]
#[command(about = "Extract a job posting and the company profile behind it")]
struct Cli {
    /// URL of the job posting
    #[arg(long)]
    job_url: Url,

    /// Company homepage to discover "about" pages from
    #[arg(long)]
    homepage: Option<Url>,

    /// LLM provider as <provider>/<model>
    #[arg(long, default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// How pages are fetched
    #[arg(long, value_enum, default_value_t = FetcherKind::Http)]
    fetcher: FetcherKind,

    /// Translate company text into this language
    #[arg(long)]
    output_language: Option<String>,

    /// Maximum fetch + extract operations in flight
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Maximum number of discovered links to extract
    #[arg(long)]
    max_links: Option<usize>,

    /// Page timeout in seconds
    #[arg(long, default_value_t = 80)]
    timeout_secs: u64,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FetcherKind {
    /// Plain HTTP, no JavaScript rendering
    Http,
    /// Firecrawl scrape API (needs FIRECRAWL_API_KEY)
    Firecrawl,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_profiler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let fetcher: Arc<dyn PageFetcher> = match cli.fetcher {
        FetcherKind::Http => Arc::new(HttpFetcher::new().context("Failed to create HTTP fetcher")?),
        FetcherKind::Firecrawl => {
            Arc::new(FirecrawlFetcher::from_env().context("Failed to create Firecrawl fetcher")?)
        }
    };

    let provider = ProviderConfig::from_env(&cli.provider)
        .with_context(|| format!("Invalid provider: {}", cli.provider))?;
    let llm = OpenAiCompatBackend::from_config(&provider)
        .with_context(|| format!("Failed to configure provider {}", cli.provider))?;

    let mut config = PipelineConfig::new()
        .with_concurrency(cli.concurrency)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(language) = cli.output_language {
        config = config.with_output_language(language);
    }
    if let Some(max) = cli.max_links {
        config = config.with_max_about_links(max);
    }

    tracing::info!(provider = %cli.provider, ?config, "Starting job profiler");

    let pipeline = Pipeline::with_config(fetcher, llm, config);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let profile = pipeline
        .run_with_cancel(&cli.job_url, cli.homepage.as_ref(), cancel)
        .await
        .context("Job profiling failed")?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&profile)?
    } else {
        serde_json::to_string(&profile)?
    };
    println!("{json}");

    Ok(())
}
