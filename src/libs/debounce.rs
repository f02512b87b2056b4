//! A cancellable, single-slot scheduled action.
//!
//! Each [`Debouncer::schedule`] call supersedes the previous one, so at most
//! one timer is pending. When the timer elapses the action is sent through
//! the regular action channel and the owner checks it with
//! [`Debouncer::accept`]. Dropping the debouncer cancels the pending task.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::actions::{Action, ActionSender};

#[derive(Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Replace any pending task with a new one that sends
    /// `make_action(generation)` after the delay. Must run inside a tokio
    /// runtime.
    pub fn schedule<F>(&mut self, tx: &ActionSender, make_action: F) -> u64
    where
        F: FnOnce(u64) -> Action,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let action = make_action(generation);
        let tx = tx.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    trace!(generation, "debounced action superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    if let Err(err) = tx.try_send(action) {
                        warn!(generation, "debounced action dropped: {err}");
                    }
                }
            }
        });

        self.pending = Some(token);
        generation
    }

    /// Whether a fired action is the latest live one. Accepting settles it,
    /// so the same generation is never accepted twice.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.pending.take() {
            Some(token) if !token.is_cancelled() => true,
            other => {
                self.pending = other;
                false
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
