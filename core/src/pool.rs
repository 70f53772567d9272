//! A fixed set of workers draining one shared queue.
//!
//! Each pool instance owns its queue and its fan-in channel, so a connect
//! scan and a probe pass never compete for slots. Workers stop pulling work
//! once the receiving side is gone: dropping the future returned by
//! [`WorkerPool::run`] lets every worker finish its current item and exit.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use seekr_common::error::ScanError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    name: &'static str,
    workers: usize,
}

impl WorkerPool {
    pub fn new(name: &'static str, workers: usize) -> Self {
        Self { name, workers }
    }

    /// Runs `work` over every item with at most `workers` items in flight
    /// and hands each result to `on_result` on the calling task, in
    /// completion order.
    pub async fn run<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        work: F,
        mut on_result: impl FnMut(R),
    ) -> Result<(), ScanError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(());
        }

        let worker_count = self.workers.min(items.len()).max(1);
        debug!("{} pool: {} items, {} workers", self.name, items.len(), worker_count);

        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::channel::<R>(worker_count);

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let work = Arc::clone(&work);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                while let Some(item) = next_item(&queue) {
                    let result = work(item).await;
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            on_result(result);
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| ScanError::Worker(format!("{} worker failed: {e}", self.name)))?;
        }
        Ok(())
    }
}

fn next_item<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().ok()?.pop_front()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
