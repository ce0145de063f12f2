//! Progress reporting and the cooperative skip signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Phase of the fill run an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    Empty,
    BeforeAll,
    Before,
    GenerateData,
    After,
    AfterAll,
}

impl fmt::Display for FillStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::BeforeAll => "beforeAll",
            Self::Before => "before",
            Self::GenerateData => "generateData",
            Self::After => "after",
            Self::AfterAll => "afterAll",
        };
        f.write_str(name)
    }
}

/// Whether a step is still going or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Running,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Table being processed; `None` for run-level hooks
    pub table: Option<String>,
    pub step: FillStep,
    pub current: u64,
    pub max: u64,
    pub state: ProgressState,
    /// Generator errors, stalls and skips
    pub comment: Option<String>,
}

impl ProgressEvent {
    pub fn is_done(&self) -> bool {
        self.state == ProgressState::Done
    }
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Logs progress events; the default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: &ProgressEvent) {
        let table = event.table.as_deref().unwrap_or("*");
        match (&event.comment, event.state) {
            (Some(comment), _) => info!(
                "[{table}] {}: {}/{} ({comment})",
                event.step, event.current, event.max
            ),
            (None, ProgressState::Done) => info!(
                "[{table}] {}: {}/{} done",
                event.step, event.current, event.max
            ),
            (None, ProgressState::Running) => debug!(
                "[{table}] {}: {}/{}",
                event.step, event.current, event.max
            ),
        }
    }
}

/// Cloneable handle asking the fill engine to skip the current table.
///
/// The request is honoured at the next batch boundary and cleared once
/// consumed.
#[derive(Debug, Clone, Default)]
pub struct SkipHandle {
    requested: Arc<AtomicBool>,
}

impl SkipHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_skip(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_skip_is_consumed_once() {
        let handle = SkipHandle::new();
        let remote = handle.clone();
        assert!(!handle.take());
        remote.request_skip();
        assert!(handle.take());
        assert!(!handle.take());
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: &ProgressEvent| seen.lock().unwrap().push(event.step);
        sink.report(&ProgressEvent {
            table: None,
            step: FillStep::BeforeAll,
            current: 0,
            max: 1,
            state: ProgressState::Running,
            comment: None,
        });
        assert_eq!(*seen.lock().unwrap(), vec![FillStep::BeforeAll]);
    }
}
