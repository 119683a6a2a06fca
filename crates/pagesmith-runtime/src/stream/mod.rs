//! Line-oriented consumption of the child's output channels.
//!
//! One reader task per channel turns raw bytes into tagged lines and
//! feeds them into a shared bounded queue; [`MergedOutput`] drains that
//! queue and tracks per-channel end markers so the merged sequence ends
//! exactly when both channels have.

mod inspector;
mod multiplex;
mod reader;

pub use inspector::{LineInspector, NoopInspector};

pub(crate) use inspector::CutoffSignal;
pub(crate) use multiplex::MergedOutput;
