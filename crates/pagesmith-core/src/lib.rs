#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod config;
pub mod discovery;
pub mod domain;
pub mod prompt;

pub use config::{
    DEFAULT_GPU_LAYERS, DEFAULT_HOST, DEFAULT_LLAMA_CLI, DEFAULT_MODELS_DIR, DEFAULT_PORT,
    DEFAULT_STATIC_DIR, GeneratorConfig,
};
pub use discovery::{DiscoveryError, find_model_file};
pub use domain::{GenerationRequest, OutputSource, TaggedLine};
pub use prompt::render_page_prompt;
