//! Emit a value only after its input has been quiet for a fixed window.

use std::{future::Future, time::Duration};

use tokio::sync::mpsc;

/// The quiescence window used by the savings and deposit search boxes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// The quiescence window used by the loans search box.
pub const LOANS_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Defers a callback until no new value has been pushed for `window`.
///
/// Every [Debouncer::push] cancels the pending callback and starts the window
/// again, so a burst of pushes results in a single callback with the last
/// value. Dropping the debouncer flushes a pending value immediately.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task on the current tokio runtime.
    pub fn spawn<F, Fut>(window: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut pending) = receiver.recv().await {
                loop {
                    tokio::select! {
                        next = receiver.recv() => match next {
                            Some(value) => pending = value,
                            None => {
                                on_settle(pending).await;
                                return;
                            }
                        },
                        _ = tokio::time::sleep(window) => {
                            on_settle(pending).await;
                            break;
                        }
                    }
                }
            }
        });

        Self { sender }
    }

    /// Replace the pending value and restart the quiescence window.
    pub fn push(&self, value: T) {
        if self.sender.send(value).is_err() {
            tracing::warn!("debounce task has stopped, dropping value");
        }
    }
}
