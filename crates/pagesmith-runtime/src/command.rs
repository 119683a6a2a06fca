//! Builds the llama-cli invocation.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

/// One generation, fully resolved: which binary to run, which model to
/// load and the prompt to feed it.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub llama_cli: PathBuf,
    pub model: PathBuf,
    pub prompt: String,
    pub gpu_layers: u16,
}

/// Build the `llama-cli` command line for `job`.
///
/// `--n-predict -1` lets the model run until it emits an end-of-stream
/// token; `--no-display-prompt` keeps the instruction block out of
/// stdout so only generated HTML reaches the data channel.
pub(crate) fn build_command(job: &GenerationJob) -> Command {
    let mut command = Command::new(&job.llama_cli);
    command
        .arg("-m")
        .arg(&job.model)
        .arg("-p")
        .arg(&job.prompt)
        .arg("--n-predict")
        .arg("-1")
        .arg("--temp")
        .arg("0.4")
        .arg("--no-display-prompt")
        .arg("--n-gpu-layers")
        .arg(job.gpu_layers.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}
