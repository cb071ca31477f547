//! Trailing-edge debounce.
//!
//! Every [`Debouncer::push`] restarts the quiet window. When the window
//! elapses with no further input, the most recent value is handed to the
//! handler exactly once; earlier values are dropped, never queued.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task on the current tokio runtime.
    pub fn new<F>(window: Duration, handler: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(mut pending) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => pending = value,
                            None => return,
                        },
                        _ = tokio::time::sleep(window) => {
                            handler(pending);
                            break;
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::debug!("Debouncer task gone, input dropped");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
