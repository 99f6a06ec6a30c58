//! Cooperative cancellation on Ctrl+C / SIGTERM.
//!
//! The handler only raises a flag; the advisor polls it between commits, so
//! a git command that is already running always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

/// Shared shutdown flag checked by the advisor loop.
pub type ShutdownFlag = Arc<AtomicBool>;

/// A flag that is never raised by a signal. Useful for tests and embedding.
pub fn new_shutdown_flag() -> ShutdownFlag {
    Arc::new(AtomicBool::new(false))
}

/// Create a new shutdown flag and register OS signal handlers.
///
/// On SIGTERM or SIGINT (Ctrl+C), the flag is set to `true`. Must be called
/// from within a tokio runtime.
pub fn setup_signal_handlers() -> ShutdownFlag {
    let flag = new_shutdown_flag();
    let flag_clone = flag.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        flag_clone.store(true, Ordering::SeqCst);
    });

    flag
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "failed to register SIGTERM handler, listening for Ctrl+C only");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for Ctrl+C");
                // Keep honouring SIGTERM.
                sigterm.recv().await;
                info!("received SIGTERM, stopping after the current commit");
                return;
            }
            info!("received SIGINT (Ctrl+C), stopping after the current commit");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, stopping after the current commit");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, stopping after the current commit"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+C");
            // Never resolve, so the flag is not raised spuriously.
            std::future::pending::<()>().await;
        }
    }
}

/// Check whether the shutdown flag has been set.
pub fn is_shutdown_requested(flag: &ShutdownFlag) -> bool {
    flag.load(Ordering::SeqCst)
}

/// Raise the flag by hand, as a signal would.
pub fn request_shutdown(flag: &ShutdownFlag) {
    flag.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        let flag = new_shutdown_flag();
        assert!(!is_shutdown_requested(&flag));
    }

    #[test]
    fn test_request_is_visible_through_clones() {
        let flag = new_shutdown_flag();
        let observer = flag.clone();
        request_shutdown(&flag);
        assert!(is_shutdown_requested(&observer));
    }

    #[tokio::test]
    async fn test_handlers_do_not_raise_flag_on_their_own() {
        let flag = setup_signal_handlers();
        tokio::task::yield_now().await;
        assert!(!is_shutdown_requested(&flag));
    }
}
