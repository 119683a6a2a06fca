//! Owns one llama-cli run from spawn to reap.

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::Child;

use pagesmith_core::TaggedLine;

use crate::command::{GenerationJob, build_command};
use crate::error::SpawnError;
use crate::stream::{CutoffSignal, LineInspector, MergedOutput, NoopInspector};

use super::shutdown;

/// A running generation: the child process plus the merged view of its
/// output channels.
///
/// The child is reaped exactly once on every path. [`finish`] waits on
/// it directly; dropping an unfinished pipeline hands the child to a
/// background teardown task instead.
///
/// [`finish`]: GenerationPipeline::finish
#[derive(Debug)]
pub struct GenerationPipeline {
    child: Option<Child>,
    output: MergedOutput,
    cutoff: Arc<CutoffSignal>,
    terminated: bool,
}

impl GenerationPipeline {
    /// Spawn `llama-cli` for `job` with no line inspection.
    pub fn spawn(job: &GenerationJob) -> Result<Self, SpawnError> {
        Self::spawn_with_inspector(job, Arc::new(NoopInspector))
    }

    /// Spawn with a custom [`LineInspector`] deciding when to cut the
    /// generation short.
    pub fn spawn_with_inspector(
        job: &GenerationJob,
        inspector: Arc<dyn LineInspector>,
    ) -> Result<Self, SpawnError> {
        let mut child = build_command(job)
            .spawn()
            .map_err(|source| SpawnError::Spawn {
                executable: job.llama_cli.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(SpawnError::MissingPipe {
            channel: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or(SpawnError::MissingPipe {
            channel: "stderr",
        })?;

        tracing::info!(
            pid = ?child.id(),
            model = %job.model.display(),
            "spawned llama-cli"
        );

        let cutoff = Arc::new(CutoffSignal::default());
        let output = MergedOutput::new(stdout, stderr, inspector, Arc::clone(&cutoff));

        Ok(Self {
            child: Some(child),
            output,
            cutoff,
            terminated: false,
        })
    }

    /// OS process id, while the child is still running and owned.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Next line of output, or `None` once both channels have drained.
    ///
    /// Also reacts to an inspector cutoff: the child is asked to
    /// terminate, which closes its pipes and lets the merge run to a
    /// normal end instead of hanging on the surviving channel.
    pub async fn next_line(&mut self) -> Option<TaggedLine> {
        loop {
            if self.cutoff.fired() && !self.terminated {
                self.request_termination();
            }
            tokio::select! {
                line = self.output.next() => return line,
                () = self.cutoff.notified(), if !self.terminated => {}
            }
        }
    }

    fn request_termination(&mut self) {
        self.terminated = true;
        if let Some(child) = self.child.as_mut() {
            tracing::debug!(pid = ?child.id(), "terminating child after cutoff");
            shutdown::request_terminate(child);
        }
    }

    /// Wait for the child and return its exit status, consuming the
    /// pipeline. A non-zero status is not an error here; callers log it
    /// and close their stream normally.
    pub async fn finish(mut self) -> io::Result<ExitStatus> {
        let Some(mut child) = self.child.take() else {
            return Err(io::Error::other("child already reaped"));
        };
        if self.terminated || self.cutoff.fired() {
            // The child was already asked to stop; escalate if it
            // lingers instead of waiting forever.
            return shutdown::shutdown_child(child).await;
        }
        child.wait().await
    }
}

impl Drop for GenerationPipeline {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        // Reader tasks die with MergedOutput; the child still needs a
        // terminate-and-reap, which cannot block the Drop path.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match shutdown::shutdown_child(child).await {
                        Ok(status) => {
                            tracing::debug!(%status, "abandoned generation child reaped");
                        }
                        Err(error) => {
                            tracing::warn!(%error, "failed to reap abandoned generation child");
                        }
                    }
                });
            }
            Err(_) => {
                // No runtime left, so this is process teardown; a hard
                // kill is the best that can be done synchronously.
                let _ = child.start_kill();
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pagesmith_core::OutputSource;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    /// Writes an executable shell script standing in for llama-cli.
    fn fake_cli(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-llama-cli");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn job_for(llama_cli: PathBuf) -> GenerationJob {
        GenerationJob {
            llama_cli,
            model: PathBuf::from("model.gguf"),
            prompt: "ignored by the fake".to_string(),
            gpu_layers: 0,
        }
    }

    async fn drain(pipeline: &mut GenerationPipeline) -> (Vec<String>, Vec<String>) {
        let mut data = Vec::new();
        let mut status = Vec::new();
        let collect = async {
            while let Some(line) = pipeline.next_line().await {
                match line.source {
                    OutputSource::Data => data.push(line.text),
                    OutputSource::Status => status.push(line.text),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), collect)
            .await
            .expect("stream should end");
        (data, status)
    }

    async fn wait_until_reaped(raw_pid: u32) {
        use nix::errno::Errno;
        use nix::sys::signal;
        use nix::unistd::Pid;

        #[allow(clippy::cast_possible_wrap)]
        let pid = Pid::from_raw(raw_pid as i32);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while signal::kill(pid, None) != Err(Errno::ESRCH) {
            assert!(
                tokio::time::Instant::now() < deadline,
                "child {raw_pid} was not reaped in time"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[tokio::test]
    async fn streams_both_channels_to_completion() {
        let tmp = TempDir::new().unwrap();
        let cli = fake_cli(
            &tmp,
            "echo '<html>'\necho 'loading model' >&2\necho '</html>'",
        );

        let mut pipeline = GenerationPipeline::spawn(&job_for(cli)).unwrap();
        let (data, status) = drain(&mut pipeline).await;

        assert_eq!(data, vec!["<html>", "</html>"]);
        assert_eq!(status, vec!["loading model"]);

        let exit = assert_ok!(pipeline.finish().await);
        assert!(exit.success());
    }

    #[tokio::test]
    async fn silent_child_still_completes() {
        let tmp = TempDir::new().unwrap();
        let cli = fake_cli(&tmp, "exit 0");

        let mut pipeline = GenerationPipeline::spawn(&job_for(cli)).unwrap();
        let (data, status) = drain(&mut pipeline).await;

        assert!(data.is_empty());
        assert!(status.is_empty());
        assert!(assert_ok!(pipeline.finish().await).success());
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let cli = fake_cli(&tmp, "echo 'partial'\nexit 3");

        let mut pipeline = GenerationPipeline::spawn(&job_for(cli)).unwrap();
        let (data, _status) = drain(&mut pipeline).await;

        assert_eq!(data, vec!["partial"]);
        let exit = assert_ok!(pipeline.finish().await);
        assert_eq!(exit.code(), Some(3));
    }

    #[tokio::test]
    async fn spawn_failure_names_the_executable() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("not-there");

        let error = GenerationPipeline::spawn(&job_for(missing)).unwrap_err();

        assert!(matches!(error, SpawnError::Spawn { .. }));
        assert!(error.to_string().contains("not-there"));
    }

    #[tokio::test]
    async fn dropping_midstream_reaps_the_child() {
        let tmp = TempDir::new().unwrap();
        let cli = fake_cli(&tmp, "while :; do echo tick; sleep 0.05; done");

        let mut pipeline = GenerationPipeline::spawn(&job_for(cli)).unwrap();
        let pid = pipeline.id().expect("running child has a pid");

        let first = tokio::time::timeout(Duration::from_secs(5), pipeline.next_line())
            .await
            .expect("child should produce output");
        assert!(first.is_some());

        drop(pipeline);
        wait_until_reaped(pid).await;
    }

    #[tokio::test]
    async fn cutoff_terminates_a_runaway_child() {
        struct StopOnSpam;
        impl LineInspector for StopOnSpam {
            fn should_stop(&self, line: &TaggedLine) -> bool {
                line.source == OutputSource::Data && line.text.contains("spam")
            }
        }

        let tmp = TempDir::new().unwrap();
        let cli = fake_cli(&tmp, "while :; do echo spam; done");

        let mut pipeline =
            GenerationPipeline::spawn_with_inspector(&job_for(cli), Arc::new(StopOnSpam)).unwrap();
        let (data, _status) = drain(&mut pipeline).await;

        // The triggering line is discarded, so nothing reaches the consumer.
        assert!(data.is_empty());
        let exit = assert_ok!(pipeline.finish().await);
        assert!(!exit.success());
    }
}
