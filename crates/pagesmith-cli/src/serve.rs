//! The serve command: startup banner, browser launch and the blocking
//! server loop.

use std::process::Stdio;

use anyhow::Result;
use tokio::process::Command;

use pagesmith_axum::bootstrap::{ServerConfig, start_server};
use pagesmith_core::find_model_file;

/// Run the server; optionally open the frontend once it is starting.
pub async fn run(config: ServerConfig, open: bool) -> Result<()> {
    let url = format!("http://{}:{}", config.host, config.port);
    tracing::info!("pagesmith: local AI website generator");

    if open {
        // Same scan bootstrap does next; a browser pointed at a server
        // with no model would only ever show the error event.
        let model = find_model_file(&config.models_dir).ok().flatten();
        if model.is_some() {
            open_browser(&url);
        } else {
            tracing::warn!("not opening a browser; no model is available yet");
        }
    }

    start_server(config).await
}

fn open_browser(url: &str) {
    match browser_command(url).spawn() {
        Ok(mut child) => {
            tracing::info!(%url, "opening browser");
            // Reap the launcher in the background.
            tokio::spawn(async move {
                let _ = child.wait().await;
            });
        }
        Err(error) => {
            tracing::warn!(%error, %url, "could not open a browser; visit the URL manually");
        }
    }
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url).stdout(Stdio::null()).stderr(Stdio::null());
    command
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command
        .args(["/C", "start", url])
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

#[cfg(all(unix, not(target_os = "macos")))]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url).stdout(Stdio::null()).stderr(Stdio::null());
    command
}
