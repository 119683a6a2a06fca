//! Fan-in of the child's output channels into one tagged sequence.

use std::sync::Arc;

use tokio::io::{AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use pagesmith_core::{OutputSource, TaggedLine};

use super::inspector::{CutoffSignal, LineInspector};
use super::reader::next_line_lossy;

/// Queue depth between the reader tasks and the consumer. Bounded so a
/// slow client applies backpressure to the child instead of buffering
/// its whole output in memory.
const QUEUE_CAPACITY: usize = 256;

/// What travels through the merge queue.
#[derive(Debug)]
enum QueueItem {
    Line(TaggedLine),
    /// Posted exactly once by each reader when its channel ends.
    Closed(OutputSource),
}

/// Both output channels of one child, merged in queue arrival order.
///
/// Each channel keeps its own relative order; no ordering across
/// channels is promised. The merged sequence ends only after every
/// reader has posted its `Closed` marker.
#[derive(Debug)]
pub(crate) struct MergedOutput {
    rx: mpsc::Receiver<QueueItem>,
    readers: Vec<JoinHandle<()>>,
    open_channels: usize,
}

impl MergedOutput {
    pub(crate) fn new<O, E>(
        stdout: O,
        stderr: E,
        inspector: Arc<dyn LineInspector>,
        cutoff: Arc<CutoffSignal>,
    ) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let readers = vec![
            spawn_tagged_reader(
                stdout,
                OutputSource::Data,
                tx.clone(),
                Arc::clone(&inspector),
                Arc::clone(&cutoff),
            ),
            spawn_tagged_reader(stderr, OutputSource::Status, tx, inspector, cutoff),
        ];
        let open_channels = readers.len();
        Self {
            rx,
            readers,
            open_channels,
        }
    }

    /// Next merged line, or `None` once every channel has closed.
    pub(crate) async fn next(&mut self) -> Option<TaggedLine> {
        while self.open_channels > 0 {
            match self.rx.recv().await {
                Some(QueueItem::Line(line)) => return Some(line),
                Some(QueueItem::Closed(source)) => {
                    self.open_channels -= 1;
                    tracing::debug!(%source, remaining = self.open_channels, "output channel closed");
                }
                None => {
                    // Readers post Closed before dropping their sender,
                    // so reaching this arm means one was torn down.
                    tracing::error!(
                        open = self.open_channels,
                        "merge queue closed with channels still open"
                    );
                    self.open_channels = 0;
                }
            }
        }
        None
    }
}

impl Drop for MergedOutput {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

fn spawn_tagged_reader<R>(
    channel: R,
    source: OutputSource,
    queue: mpsc::Sender<QueueItem>,
    inspector: Arc<dyn LineInspector>,
    cutoff: Arc<CutoffSignal>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(channel);
        let mut buf = Vec::with_capacity(1024);
        while let Some(text) = next_line_lossy(&mut reader, &mut buf).await {
            let line = TaggedLine::new(source, text);
            if inspector.should_stop(&line) {
                tracing::debug!(%source, "inspector requested cutoff");
                cutoff.fire();
                break;
            }
            if queue.send(QueueItem::Line(line)).await.is_err() {
                // Consumer dropped the queue; no point reading further.
                break;
            }
        }
        let _ = queue.send(QueueItem::Closed(source)).await;
        tracing::debug!(%source, "reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::super::inspector::NoopInspector;
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn plain(inspector: impl LineInspector + 'static) -> Arc<dyn LineInspector> {
        Arc::new(inspector)
    }

    async fn drain(merged: &mut MergedOutput) -> (Vec<String>, Vec<String>) {
        let mut data = Vec::new();
        let mut status = Vec::new();
        while let Some(line) = merged.next().await {
            match line.source {
                OutputSource::Data => data.push(line.text),
                OutputSource::Status => status.push(line.text),
            }
        }
        (data, status)
    }

    #[tokio::test]
    async fn merges_channels_and_keeps_per_channel_order() {
        // More data lines than the queue holds, so the readers have to
        // yield to consumer pacing instead of buffering everything.
        let data_input: String = (0..300).map(|i| format!("data-{i}\n")).collect();
        let status_input: String = (0..40).map(|i| format!("status-{i}\n")).collect();

        let mut merged = MergedOutput::new(
            Cursor::new(data_input.into_bytes()),
            Cursor::new(status_input.into_bytes()),
            plain(NoopInspector),
            Arc::new(CutoffSignal::default()),
        );

        let (data, status) = drain(&mut merged).await;

        let expected_data: Vec<String> = (0..300).map(|i| format!("data-{i}")).collect();
        let expected_status: Vec<String> = (0..40).map(|i| format!("status-{i}")).collect();
        assert_eq!(data, expected_data);
        assert_eq!(status, expected_status);
    }

    #[tokio::test]
    async fn waits_for_the_slow_channel_before_ending() {
        let (mut status_writer, status_reader) = tokio::io::duplex(64);

        let mut merged = MergedOutput::new(
            &b"page\n"[..],
            status_reader,
            plain(NoopInspector),
            Arc::new(CutoffSignal::default()),
        );

        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            status_writer.write_all(b"late status\n").await.unwrap();
            // Dropping the writer closes the channel.
        });

        let (data, status) = drain(&mut merged).await;
        writer.await.unwrap();

        assert_eq!(data, vec!["page"]);
        assert_eq!(status, vec!["late status"]);
    }

    #[tokio::test]
    async fn empty_channels_end_cleanly() {
        let mut merged = MergedOutput::new(
            &b""[..],
            &b""[..],
            plain(NoopInspector),
            Arc::new(CutoffSignal::default()),
        );

        let next = tokio::time::timeout(Duration::from_secs(1), merged.next())
            .await
            .expect("merge should end without waiting");
        assert!(next.is_none());
    }

    struct StopOnFence;

    impl LineInspector for StopOnFence {
        fn should_stop(&self, line: &TaggedLine) -> bool {
            line.source == OutputSource::Data && line.text.contains("```")
        }
    }

    #[tokio::test]
    async fn inspector_cutoff_closes_the_channel_early() {
        let cutoff = Arc::new(CutoffSignal::default());
        let mut merged = MergedOutput::new(
            &b"<html>\n```\nnever delivered\n"[..],
            &b"loading\n"[..],
            plain(StopOnFence),
            Arc::clone(&cutoff),
        );

        let (data, status) = drain(&mut merged).await;

        // The triggering line and everything after it stay unqueued.
        assert_eq!(data, vec!["<html>"]);
        assert_eq!(status, vec!["loading"]);
        assert!(cutoff.fired());
    }
}
