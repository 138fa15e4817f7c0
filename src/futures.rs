use engine::tracing;
use std::{
    any::{Any, TypeId},
    future::Future,
    sync::{mpsc, Arc},
};
use tokio::sync::Notify;

#[cfg(not(target_arch = "wasm32"))]
use tokio::spawn;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local as spawn;

type AnyItem = Box<dyn Any + Send + 'static>;

/// Spawns futures and collects their outputs until someone asks for them
/// by type.
pub struct Futures {
    queue: Vec<AnyItem>,
    rx: mpsc::Receiver<AnyItem>,
    tx: mpsc::Sender<AnyItem>,
    completed: Arc<Notify>,
    /// Spawned futures whose output hasn't been polled yet.
    pending: usize,
}

impl Futures {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            completed: Arc::new(Notify::new()),
            pending: 0,
            queue: Vec::new(),
        }
    }

    pub fn spawn<
        #[cfg(not(target_arch = "wasm32"))] Fut: Future<Output = Out> + Send + 'static,
        #[cfg(target_arch = "wasm32")] Fut: Future<Output = Out> + 'static,
        Out: Send + 'static,
    >(
        &mut self,
        fut: Fut,
    ) {
        let tx = self.tx.clone();
        let completed = self.completed.clone();
        self.pending += 1;
        spawn(async move {
            let result = fut.await;
            let item = Box::new(result);
            if tx.send(item).is_err() {
                tracing::debug!("future output dropped before result was sent");
            }
            completed.notify_one();
        });
    }

    /// Polls the futures for any output(s).
    pub fn poll(&mut self) {
        while let Ok(item) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.queue.push(item);
        }
    }

    /// Whether every spawned future has finished and been polled.
    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }

    /// Resolves once a spawned future finishes. Completions that happen
    /// before this is awaited are not lost.
    pub async fn completed(&self) {
        self.completed.notified().await
    }

    /// Extract all outputs which have the type `T`, in completion order.
    pub fn take<T: 'static>(&mut self) -> Vec<T> {
        let (matching, rest): (Vec<AnyItem>, Vec<AnyItem>) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|item| TypeId::of::<T>() == item.as_ref().type_id());
        self.queue = rest;

        matching
            .into_iter()
            .filter_map(|item| item.downcast::<T>().ok())
            .map(|item| *item)
            .collect()
    }
}

impl Default for Futures {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! handle_future {
    ($state:ident, |$val:ident: $val_ty:ty| $handler:expr) => {
        for $val in $state.futures.take::<$val_ty>() {
            $handler
        }
    };
}

pub(crate) use handle_future;
