// Signal handling module
//
// SIGTERM and SIGINT both trigger a graceful shutdown. Non-unix targets
// only listen for Ctrl+C.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

const REASON_NONE: u8 = 0;
const REASON_SIGTERM: u8 = 1;
const REASON_SIGINT: u8 = 2;
const REASON_REQUESTED: u8 = 3;

/// Shared shutdown flag that the accept loop waits on
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    notify: Notify,
    requested: AtomicBool,
    reason: AtomicU8,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown programmatically
    pub fn trigger(&self) {
        self.fire(REASON_REQUESTED);
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> &'static str {
        match self.inner.reason.load(Ordering::SeqCst) {
            REASON_SIGTERM => "SIGTERM",
            REASON_SIGINT => "SIGINT",
            REASON_REQUESTED => "requested",
            _ => "unknown",
        }
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }

    fn fire(&self, reason: u8) {
        // First reason wins
        let _ = self
            .inner
            .reason
            .compare_exchange(REASON_NONE, reason, Ordering::SeqCst, Ordering::SeqCst);
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }
}

/// Start the signal listener task
#[cfg(unix)]
pub fn start_signal_handler(signal: ShutdownSignal) -> std::io::Result<()> {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut sigterm = unix_signal(SignalKind::terminate())?;
    let mut sigint = unix_signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => signal.fire(REASON_SIGTERM),
            _ = sigint.recv() => signal.fire(REASON_SIGINT),
        }
    });
    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(signal: ShutdownSignal) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            signal.fire(REASON_SIGINT);
        }
    });
    Ok(())
}
