//! Failures that prevent a pipeline from starting.
//!
//! Everything after a successful spawn is deliberately not an error:
//! unreadable bytes are decoded lossily, and a non-zero exit status is
//! reported to the caller as data, not as a fault.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a generation process could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The OS refused to start the binary, usually because the path
    /// does not exist or is not executable.
    #[error("failed to spawn '{}': {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        source: io::Error,
    },

    /// A requested pipe was not attached to the child. Only reachable
    /// if the spawn configuration stops piping a channel.
    #[error("spawned process exposed no {channel} pipe")]
    MissingPipe { channel: &'static str },
}
