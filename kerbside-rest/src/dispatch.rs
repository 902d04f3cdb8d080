use std::sync::Arc;

use kerbside_core::{PendingRequest, SyncCompletion};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::BinBackend;

/// Runs bin map requests against a backend, one tokio task per request.
///
/// Completions arrive on the receiver returned by [`Dispatcher::new`] in the
/// order the backend answers, not the order requests were sent. Nothing is
/// cancelled or retried.
pub struct Dispatcher<B> {
    backend: Arc<B>,
    tx: mpsc::UnboundedSender<SyncCompletion>,
}

impl<B> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            tx: self.tx.clone(),
        }
    }
}

impl<B: BinBackend + 'static> Dispatcher<B> {
    pub fn new(backend: B) -> (Self, mpsc::UnboundedReceiver<SyncCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            backend: Arc::new(backend),
            tx,
        };
        (dispatcher, rx)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Spawns `pending` on the current tokio runtime.
    pub fn dispatch(&self, pending: PendingRequest) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let PendingRequest { ticket, request } = pending;
            debug!(%ticket, "dispatching {}", request.describe());

            let result = backend.execute(request).await;
            if let Err(failure) = &result {
                warn!(%ticket, "request failed: {}", failure);
            }

            if tx.send(SyncCompletion { ticket, result }).is_err() {
                debug!(%ticket, "completion dropped, bin map is gone");
            }
        })
    }
}

/// Drains every completion that is ready without waiting.
pub fn drain_ready(rx: &mut mpsc::UnboundedReceiver<SyncCompletion>) -> Vec<SyncCompletion> {
    let mut ready = Vec::new();
    while let Ok(completion) = rx.try_recv() {
        ready.push(completion);
    }
    ready
}
