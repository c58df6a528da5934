//! Signal handling for graceful shutdown
//!
//! SIGINT and SIGTERM flip a shared flag that the session checks at the top
//! of every state.

use tokio::sync::watch;
use tracing::{debug, error, info};

/// Owns the interrupt flag and the task that sets it on signals
pub struct ShutdownSignal {
    trigger_tx: watch::Sender<bool>,
}

/// Read side of the interrupt flag, cheap to clone
#[derive(Debug, Clone)]
pub struct Interrupt {
    trigger_rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (trigger_tx, _) = watch::channel(false);
        Self { trigger_tx }
    }

    /// Handle for observing the flag
    pub fn interrupt(&self) -> Interrupt {
        Interrupt {
            trigger_rx: self.trigger_tx.subscribe(),
        }
    }

    /// Set the flag; idempotent
    pub fn trigger(&self) {
        self.trigger_tx.send_replace(true);
    }

    /// Spawn a task that sets the flag on SIGINT or SIGTERM
    pub fn listen(&self) {
        let trigger_tx = self.trigger_tx.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(()) => {
                    info!("interrupt signal received");
                    trigger_tx.send_replace(true);
                }
                Err(e) => error!(error = %e, "failed to register signal handlers"),
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            debug!("received SIGTERM");
        }
        _ = sigint.recv() => {
            debug!("received SIGINT");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    debug!("received Ctrl-C");
    Ok(())
}

impl Interrupt {
    /// Interrupt handle that never fires
    pub fn never() -> Self {
        let (_, trigger_rx) = watch::channel(false);
        Self { trigger_rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.trigger_rx.borrow()
    }

    /// Resolve once the flag is set; pending forever if it never can be
    pub async fn triggered(&mut self) {
        let closed = self.trigger_rx.wait_for(|set| *set).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
