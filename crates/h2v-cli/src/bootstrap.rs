use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use h2v_config::{EmbeddingBackend, EmbeddingsConfig, H2vConfig};
use h2v_embeddings::{CachedEmbedder, FastEmbedEngine, HashEmbedder, TextEmbedder};
use h2v_graph::Html2VecModel;

use crate::cli::Cli;

/// Load layered config and apply command-line overrides on top.
pub fn load_config(cli: &Cli) -> anyhow::Result<H2vConfig> {
    let mut config = H2vConfig::load_with_dotenv().context("failed to load configuration")?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut H2vConfig, cli: &Cli) {
    if let Some(rounds) = cli.rounds {
        config.model.rounds = rounds;
    }
    if let Some(mode) = cli.mode {
        config.model.mode = mode;
    }
    if let Some(backend) = cli.backend {
        config.embeddings.backend = backend.into();
    }
}

/// Build the configured embedding backend, memoized if requested.
///
/// Initializing fastembed may download the model; call from a blocking context.
pub fn build_embedder(config: &EmbeddingsConfig) -> anyhow::Result<Arc<dyn TextEmbedder>> {
    let embedder: Arc<dyn TextEmbedder> = match config.backend {
        EmbeddingBackend::Fastembed => {
            let engine = if config.has_cache_dir() {
                FastEmbedEngine::with_cache_dir(PathBuf::from(&config.cache_dir))
            } else {
                FastEmbedEngine::new()
            }
            .context("failed to initialize fastembed model")?;
            wrap(engine, config.memoize)
        }
        EmbeddingBackend::Hash => {
            let embedder = HashEmbedder::new(config.hash_dimension)?;
            wrap(embedder, config.memoize)
        }
    };

    tracing::debug!(
        backend = ?config.backend,
        dimension = embedder.dimension(),
        memoize = config.memoize,
        "embedding backend ready"
    );
    Ok(embedder)
}

fn wrap<E: TextEmbedder + 'static>(embedder: E, memoize: bool) -> Arc<dyn TextEmbedder> {
    if memoize {
        Arc::new(CachedEmbedder::new(embedder))
    } else {
        Arc::new(embedder)
    }
}

pub fn build_model(config: &H2vConfig) -> anyhow::Result<Html2VecModel> {
    let embedder = build_embedder(&config.embeddings)?;
    Ok(Html2VecModel::new(embedder)
        .with_rounds(config.model.rounds)
        .with_mode(config.model.mode))
}
