//! Input debouncing for search-as-you-type.
//!
//! A raw value only becomes a settled value once it has stayed unchanged for
//! the whole quiet window. Any change restarts the window and values that are
//! replaced before settling are dropped.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::trace;

/// Spawns a task that turns `input` into a stream of settled values.
///
/// The value already in `input` is emitted at once. Later values settle after
/// one quiet window, and a settled value equal to the previous one is not
/// emitted again. The stream ends when the sender side of `input` is dropped
/// or the returned receiver is closed.
pub fn debounce<T>(mut input: watch::Receiver<T>, window: Duration) -> mpsc::Receiver<T>
where
    T: Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let initial = input.borrow_and_update().clone();
        trace!(value = ?initial, "Initial input");
        if tx.send(initial.clone()).await.is_err() {
            return;
        }
        let mut last_emitted = initial;

        'idle: while input.changed().await.is_ok() {
            loop {
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            break 'idle;
                        }
                    }
                    () = tokio::time::sleep(window) => {
                        let value = input.borrow_and_update().clone();

                        if value != last_emitted {
                            trace!(?value, "Input settled");
                            if tx.send(value.clone()).await.is_err() {
                                break 'idle;
                            }
                            last_emitted = value;
                        }
                        continue 'idle;
                    }
                }
            }
        }
    });

    rx
}
