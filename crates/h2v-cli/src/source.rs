use std::time::Duration;

use anyhow::Context;
use h2v_config::FetchConfig;

use crate::cli::Input;

/// Page used when neither a URL nor a file is given.
pub const SAMPLE_PAGE: &str = include_str!("../assets/sample.html");

/// Read the HTML for `input`.
pub async fn load(input: &Input, fetch: &FetchConfig) -> anyhow::Result<String> {
    match input {
        Input::Url(url) => fetch_url(url, fetch).await,
        Input::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        Input::Sample => {
            tracing::info!("no URL or file given; using the bundled sample page");
            Ok(SAMPLE_PAGE.to_string())
        }
    }
}

async fn fetch_url(url: &str, config: &FetchConfig) -> anyhow::Result<String> {
    let url = reqwest::Url::parse(url).with_context(|| format!("invalid URL '{url}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("unsupported URL scheme '{}': expected http or https", url.scheme());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .context("failed to build HTTP client")?;

    tracing::info!(%url, "fetching page");
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?;

    response
        .text()
        .await
        .with_context(|| format!("failed to read body of {url}"))
}
