// Operator stop requests for the poll loop
//
// The interrupt handler is installed when `listen_for_interrupt` returns, not
// when the loop first sleeps, so a Ctrl+C during a slow cycle is still caught
// and turned into a clean stop.

use std::io;
use tokio::sync::watch;
use tracing::info;

/// Sending half: fires the stop request
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half, checked by the loop before every cycle and raced against each sleep
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_, signal) = shutdown_channel();
        signal
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once a stop was requested
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Trigger dropped without firing
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Install the SIGINT (Ctrl+C) handler now and return the signal it fires
pub fn listen_for_interrupt() -> io::Result<ShutdownSignal> {
    let (trigger, signal) = shutdown_channel();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        let mut stream = unix_signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            if stream.recv().await.is_some() {
                info!("🛑 Received SIGINT");
                trigger.trigger();
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("🛑 Received Ctrl+C");
                trigger.trigger();
            }
        });
    }

    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let (trigger, mut signal) = shutdown_channel();
        assert!(!signal.is_triggered());

        trigger.trigger();
        assert!(signal.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("wait should resolve once triggered");
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_signal_stays_pending() {
        let mut signal = ShutdownSignal::never();
        let waited = tokio::time::timeout(Duration::from_secs(3600), signal.wait()).await;
        assert!(waited.is_err());
        assert!(!signal.is_triggered());
    }
}
