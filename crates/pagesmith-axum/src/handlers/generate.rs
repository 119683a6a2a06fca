//! The generation endpoint: one POST in, a stream of framed events out.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::Json;
use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures_util::Stream;

use pagesmith_core::{GenerationRequest, TaggedLine, render_page_prompt};
use pagesmith_runtime::{GenerationJob, GenerationPipeline};

use crate::state::AppState;

/// Closing sentinel; clients stop reading here.
const DONE_PAYLOAD: &str = "[DONE]";

/// Frame one child line for the wire: `[DATA] ...` or `[STATUS] ...`.
fn frame_line(line: &TaggedLine) -> String {
    format!("[{}] {}", line.source.label(), line.text)
}

fn error_payload(message: &str) -> String {
    format!("[ERROR] {message}")
}

/// POST /api/generate
///
/// Streams the generation as server-sent events. Data and status lines
/// arrive as they are produced, and a stream whose child ran always
/// ends with `[DONE]`, whatever the exit status was. When generation
/// cannot start at all the response is a single `[ERROR]` event with no
/// `[DONE]`, so clients can tell "never ran" from "ran and finished".
///
/// Disconnecting mid-stream drops the pipeline, which terminates and
/// reaps the child in the background.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream! {
        if !state.generator.llama_cli.is_file() {
            let name = state.generator.executable_name();
            tracing::warn!(executable = %name, "generation refused: binary missing");
            yield Ok(Event::default().data(error_payload(&format!("'{name}' not found."))));
            return;
        }

        let Some(model) = state.generator.model.clone() else {
            tracing::warn!(models_dir = %state.models_dir.display(), "generation refused: no model");
            yield Ok(Event::default().data(error_payload(&format!(
                "No model file found in '{}'.",
                state.models_dir.display()
            ))));
            return;
        };

        let job = GenerationJob {
            llama_cli: state.generator.llama_cli.clone(),
            model,
            prompt: render_page_prompt(&request.prompt),
            gpu_layers: state.generator.gpu_layers,
        };

        let mut pipeline = match GenerationPipeline::spawn(&job) {
            Ok(pipeline) => pipeline,
            Err(error) => {
                tracing::error!(%error, "failed to start generation");
                yield Ok(Event::default().data(error_payload(&error.to_string())));
                return;
            }
        };

        while let Some(line) = pipeline.next_line().await {
            yield Ok(Event::default().data(frame_line(&line)));
        }

        // Reap before closing so no zombie outlives the response. The
        // exit status is informational; the page already streamed.
        match pipeline.finish().await {
            Ok(status) if status.success() => tracing::info!("llama-cli finished"),
            Ok(status) => tracing::warn!(%status, "llama-cli exited abnormally"),
            Err(error) => tracing::warn!(%error, "failed to reap llama-cli"),
        }

        yield Ok(Event::default().data(DONE_PAYLOAD));
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_core::OutputSource;

    #[test]
    fn frames_lines_with_channel_tags() {
        let data = TaggedLine::new(OutputSource::Data, "<p>hi</p>");
        let status = TaggedLine::new(OutputSource::Status, "loading tensors");
        assert_eq!(frame_line(&data), "[DATA] <p>hi</p>");
        assert_eq!(frame_line(&status), "[STATUS] loading tensors");
    }

    #[test]
    fn empty_lines_keep_the_tag_and_separator() {
        let blank = TaggedLine::new(OutputSource::Data, "");
        assert_eq!(frame_line(&blank), "[DATA] ");
    }

    #[test]
    fn error_payload_is_prefixed() {
        assert_eq!(error_payload("'llama-cli' not found."), "[ERROR] 'llama-cli' not found.");
    }
}
