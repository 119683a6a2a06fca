//! Child process lifecycle: spawn, stream, terminate, reap.

mod pipeline;
mod shutdown;

pub use pipeline::GenerationPipeline;
