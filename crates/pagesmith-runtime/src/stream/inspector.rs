//! Per-line inspection hook for cutting a generation short.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use pagesmith_core::TaggedLine;

/// Looks at every line a reader produces before it is queued.
///
/// Returning `true` stops that reader: the inspected line is discarded,
/// the channel is marked closed and the pipeline terminates the child.
/// The default [`NoopInspector`] never stops anything, so keyword
/// cutoff for runaway generations can be layered on later without
/// changing the merge logic.
pub trait LineInspector: Send + Sync {
    fn should_stop(&self, line: &TaggedLine) -> bool;
}

/// Inspector that lets every line through.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInspector;

impl LineInspector for NoopInspector {
    fn should_stop(&self, _line: &TaggedLine) -> bool {
        false
    }
}

/// One-shot flag a reader raises to request child termination.
///
/// `notify_one` stores a permit, so a waiter arriving after the flag
/// was raised still wakes up.
#[derive(Debug, Default)]
pub(crate) struct CutoffSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl CutoffSignal {
    pub(crate) fn fire(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.notify.notify_one();
        }
    }

    pub(crate) fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }
}
