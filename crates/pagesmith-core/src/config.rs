//! Immutable service configuration resolved once at startup.

use std::path::PathBuf;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port, matching the llama.cpp ecosystem convention.
pub const DEFAULT_PORT: u16 = 11434;

/// Default number of model layers offloaded to the GPU.
pub const DEFAULT_GPU_LAYERS: u16 = 18;

/// Default directory scanned for `.gguf` model files.
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Default directory holding the web frontend.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Default llama-cli location. The leading `./` keeps the existence
/// check and the spawn looking at the same file instead of searching
/// `PATH`.
pub const DEFAULT_LLAMA_CLI: &str = "./llama-cli";

/// Everything the generation pipeline needs to know, fixed at startup.
///
/// The model path is resolved by [`crate::discovery::find_model_file`]
/// during bootstrap. `None` means the server still runs, but generation
/// requests are answered with a single error event.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Path to the llama-cli binary.
    pub llama_cli: PathBuf,
    /// Resolved model file, if any was found.
    pub model: Option<PathBuf>,
    /// Layer count passed as `--n-gpu-layers`.
    pub gpu_layers: u16,
}

impl GeneratorConfig {
    pub fn new(llama_cli: impl Into<PathBuf>, model: Option<PathBuf>, gpu_layers: u16) -> Self {
        Self {
            llama_cli: llama_cli.into(),
            model,
            gpu_layers,
        }
    }

    /// File name of the configured binary, for user-facing messages.
    pub fn executable_name(&self) -> String {
        self.llama_cli.file_name().map_or_else(
            || self.llama_cli.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}
