//! Import cancellation
//!
//! A [`CancelHandle`] flips a `tokio::sync::watch` flag; every
//! [`CancelSignal`] cloned from it observes the flip. Awaiting work through
//! [`CancelSignal::run`] drops the work as soon as the flag is set.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{WalletError, WalletResult};

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelSignal { rx: Some(rx) })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Observer side of a [`CancelHandle`]. The default signal never fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Resolves once cancelled. Pending forever if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Await `fut` unless cancelled first.
    pub async fn run<F: Future>(&self, fut: F) -> WalletResult<F::Output> {
        if self.is_cancelled() {
            return Err(WalletError::cancelled());
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(WalletError::cancelled()),
            out = fut => Ok(out),
        }
    }
}
