//! Advisory progress reporting for long loads.
//!
//! A UI thread driving a multi-file load wants feedback, not control:
//! events carry a percentage and the current file, and have no effect
//! on outcome or ordering.

use std::path::PathBuf;

/// Snapshot emitted before each file in a dataset load.
///
/// The percentage is computed against the worklist as currently known;
/// it can regress when a file declares new imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: u8,
    pub current_file: PathBuf,
    pub files_done: usize,
    pub files_pending: usize,
}

/// Receiver for load progress events.
pub trait ProgressObserver {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F: Fn(&ProgressEvent)> ProgressObserver for F {
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}
