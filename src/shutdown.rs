use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Resolve once the user asks the program to stop.
///
/// If a listener cannot be installed the future never resolves and the
/// default signal behaviour applies.
#[cfg(unix)]
pub async fn wait_for_signal() {
    let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, exiting");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, exiting");
        }
    }
}

#[cfg(windows)]
pub async fn wait_for_signal() {
    let (mut ctrlc, mut ctrlbreak) = match (ctrl_c(), ctrl_break()) {
        (Ok(c), Ok(b)) => (c, b),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, exiting");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, exiting");
        }
    }
}
