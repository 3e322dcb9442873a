//! Caller-held scan sessions.
//!
//! A dashboard or interactive shell that needs to watch a scan in progress
//! owns a [`ScanSession`] and hands it to the engine. The engine itself keeps
//! nothing between scans.

use crate::error::SessionError;
use crate::scanner::result::ScanResult;
use crate::scanner::traits::ScanObserver;
use crate::types::ScanId;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

/// Snapshot of scan progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    last_result: Option<Arc<ScanResult>>,
}

/// Progress and last result of the scans run through it.
///
/// At most one scan runs per session at a time.
#[derive(Debug)]
pub struct ScanSession {
    id: ScanId,
    completed: AtomicUsize,
    total: AtomicUsize,
    inner: Mutex<Inner>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: ScanId::new(),
            completed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                last_result: None,
            }),
        }
    }

    pub fn id(&self) -> ScanId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }

    /// Result of the most recent completed scan.
    pub fn last_result(&self) -> Option<Arc<ScanResult>> {
        self.lock().last_result.clone()
    }

    // A panic while holding the lock leaves plain data behind; keep using it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark the session running. The returned guard resets it to idle if the
    /// scan is dropped before [`RunGuard::finish`].
    pub(crate) fn begin(&self, total: usize) -> Result<RunGuard<'_>, SessionError> {
        let mut inner = self.lock();
        if inner.state == SessionState::Running {
            return Err(SessionError::AlreadyRunning);
        }
        inner.state = SessionState::Running;
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);

        Ok(RunGuard {
            session: self,
            finished: false,
        })
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ScanSession {
    fn on_progress(&self, completed: usize, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(completed, Ordering::Relaxed);
    }
}

/// Holds a session in the running state for the lifetime of one scan.
pub(crate) struct RunGuard<'a> {
    session: &'a ScanSession,
    finished: bool,
}

impl RunGuard<'_> {
    pub(crate) fn finish(mut self, result: ScanResult) -> Arc<ScanResult> {
        let result = Arc::new(result);
        let mut inner = self.session.lock();
        inner.state = SessionState::Finished;
        inner.last_result = Some(Arc::clone(&result));
        self.finished = true;
        result
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.lock().state = SessionState::Idle;
        }
    }
}
