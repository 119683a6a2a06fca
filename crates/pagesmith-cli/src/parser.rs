//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pagesmith_core::{
    DEFAULT_GPU_LAYERS, DEFAULT_HOST, DEFAULT_LLAMA_CLI, DEFAULT_MODELS_DIR, DEFAULT_PORT,
    DEFAULT_STATIC_DIR,
};

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Generate single-file websites with a local llama.cpp model")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and frontend
    Serve {
        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST, env = "PAGESMITH_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PAGESMITH_PORT")]
        port: u16,

        /// Path to the llama-cli binary
        #[arg(long, default_value = DEFAULT_LLAMA_CLI, env = "PAGESMITH_LLAMA_CLI")]
        llama_cli: PathBuf,

        /// Directory scanned for .gguf model files
        #[arg(long, default_value = DEFAULT_MODELS_DIR, env = "PAGESMITH_MODELS_DIR")]
        models_dir: PathBuf,

        /// Model layers to offload to the GPU
        #[arg(long, default_value_t = DEFAULT_GPU_LAYERS, env = "PAGESMITH_GPU_LAYERS")]
        gpu_layers: u16,

        /// Frontend directory served at /
        #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "PAGESMITH_STATIC_DIR")]
        static_dir: PathBuf,

        /// Serve only the API, without the frontend
        #[arg(long)]
        api_only: bool,

        /// Open the frontend in the default browser once running
        #[arg(long)]
        open: bool,
    },
}
