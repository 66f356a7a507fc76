//! Run-wide cancellation and per-unit deadlines, both checked cooperatively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use verity_core::InfraError;

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct RunCancellation {
    cancelled: Arc<AtomicBool>,
}

impl RunCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Time budget of one unit, plus the run's cancellation flag.
#[derive(Debug, Clone)]
pub struct UnitBudget {
    started: Instant,
    timeout: Option<Duration>,
    cancellation: RunCancellation,
}

impl UnitBudget {
    pub fn new(timeout: Duration, cancellation: RunCancellation) -> Self {
        Self {
            started: Instant::now(),
            timeout: Some(timeout),
            cancellation,
        }
    }

    /// No deadline and a private, never-set cancellation flag.
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            timeout: None,
            cancellation: RunCancellation::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Err once the run was cancelled or the deadline passed.
    pub fn check(&self) -> Result<(), InfraError> {
        if self.cancellation.is_cancelled() {
            return Err(InfraError::Cancelled);
        }
        match self.timeout {
            Some(timeout) if self.started.elapsed() > timeout => Err(InfraError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
            _ => Ok(()),
        }
    }
}
