//! Process-wide shutdown flag driven by SIGINT/SIGTERM.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_shutdown_signal(_: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the shutdown flag so the capture stream and
/// node registration are released on the normal exit path.
#[cfg(unix)]
pub fn install_shutdown_handler() -> Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        unsafe {
            // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
            let handler = handle_shutdown_signal as *const () as libc::sighandler_t;
            if libc::signal(signal, handler) == libc::SIG_ERR {
                anyhow::bail!("failed to install handler for signal {signal}");
            }
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install_shutdown_handler() -> Result<()> {
    tracing::warn!("signal-driven shutdown is not supported on this platform");
    Ok(())
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// The flag the relay loop polls.
pub fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}
