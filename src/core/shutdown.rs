//! Shutdown coordination
//!
//! Turns process signals into a broadcast the rest of the binary can
//! await. A second interrupt while shutdown is already in progress exits
//! the process immediately.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when a second signal forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

/// Coordinates graceful shutdown across the application
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
    signal_count: Arc<AtomicUsize>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            signal_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested, including before this call
    pub async fn wait(&self) {
        let mut shutdown_rx = self.subscribe();
        if self.is_shutdown_requested() {
            return;
        }
        let _ = shutdown_rx.recv().await;
    }

    /// Forward SIGINT/SIGTERM (Ctrl-C elsewhere) into this coordinator
    ///
    /// Must be called from within a tokio runtime.
    pub fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
                let coordinator = self.clone();
                tokio::spawn(async move {
                    match signal(kind) {
                        Ok(mut stream) => {
                            while stream.recv().await.is_some() {
                                coordinator.on_signal();
                            }
                        }
                        Err(error) => log::warn!("could not install signal handler: {}", error),
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let coordinator = self.clone();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    coordinator.on_signal();
                }
            });
        }
    }

    fn on_signal(&self) {
        let previous = self.signal_count.fetch_add(1, Ordering::AcqRel);
        if previous >= 1 {
            log::warn!("second interrupt received; exiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
        log::info!("interrupt received; shutting down");
        self.trigger_shutdown();
    }
}
