use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod output;
mod source;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("html2vec error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = bootstrap::load_config(&cli)?;
    let html = source::load(&cli.input(), &config.fetch).await?;

    // Model init (possibly a download) and fitting are synchronous.
    let records = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let model = bootstrap::build_model(&config)?;
        let records: Vec<_> = model.fit(&html).context("failed to fit document")?.collect();
        Ok(records)
    })
    .await
    .context("fit task panicked")??;

    output::output(&records, cli.format)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("HTML2VEC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
