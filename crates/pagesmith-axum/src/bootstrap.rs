//! Composition root for the pagesmith web server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};

use pagesmith_core::{
    DEFAULT_GPU_LAYERS, DEFAULT_HOST, DEFAULT_LLAMA_CLI, DEFAULT_MODELS_DIR, DEFAULT_PORT,
    GeneratorConfig, find_model_file,
};

use crate::routes::{create_router, create_spa_router};
use crate::state::AppState;

/// Which origins may call the API.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Any origin.
    #[default]
    AllowAll,
    /// Only the listed origins.
    AllowOrigins(Vec<String>),
}

/// Startup options for [`start_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Binary the generation endpoint runs.
    pub llama_cli: PathBuf,
    /// Directory scanned for the first `.gguf` model.
    pub models_dir: PathBuf,
    pub gpu_layers: u16,
    /// Frontend directory; `None` serves the API only.
    pub static_dir: Option<PathBuf>,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            llama_cli: PathBuf::from(DEFAULT_LLAMA_CLI),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            gpu_layers: DEFAULT_GPU_LAYERS,
            static_dir: None,
            cors: CorsConfig::default(),
        }
    }
}

/// Everything request handlers need, assembled once at startup.
#[derive(Debug)]
pub struct AxumContext {
    pub generator: GeneratorConfig,
    /// Kept for the user-facing message when no model was found.
    pub models_dir: PathBuf,
}

/// Resolve startup state: scan the models directory and sanity-check
/// the configured binary.
///
/// Neither a missing model nor a missing binary is fatal; the server
/// starts anyway and generation requests answer with an error event.
/// The binary is re-checked per request, so it can appear later. The
/// model is resolved here once; adding one takes a restart.
pub fn bootstrap(config: &ServerConfig) -> anyhow::Result<AxumContext> {
    let model = find_model_file(&config.models_dir).context("model discovery failed")?;

    match &model {
        Some(path) => tracing::info!(model = %path.display(), "model found"),
        None => tracing::warn!(
            models_dir = %config.models_dir.display(),
            "no .gguf model found; add one and restart to enable generation"
        ),
    }

    if config.llama_cli.is_file() {
        tracing::info!(llama_cli = %config.llama_cli.display(), "generator binary found");
    } else {
        tracing::warn!(
            llama_cli = %config.llama_cli.display(),
            "llama-cli not found; the API will not work until it exists"
        );
    }

    Ok(AxumContext {
        generator: GeneratorConfig::new(config.llama_cli.clone(), model, config.gpu_layers),
        models_dir: config.models_dir.clone(),
    })
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let context = bootstrap(&config)?;
    let state: AppState = Arc::new(context);

    let router = match &config.static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            if !index.is_file() {
                bail!(
                    "static directory '{}' has no index.html; fix the path or serve with --api-only",
                    dir.display()
                );
            }
            create_spa_router(state, dir, &config.cors)
        }
        None => create_router(state, &config.cors),
    };

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("backend running at http://{address}");
    if let Some(dir) = &config.static_dir {
        tracing::info!(frontend = %dir.join("index.html").display(), "serving frontend");
    }

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
