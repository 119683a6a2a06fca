#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod command;
pub mod error;
pub mod process;
pub mod stream;

pub use command::GenerationJob;
pub use error::SpawnError;
pub use process::GenerationPipeline;
pub use stream::{LineInspector, NoopInspector};
