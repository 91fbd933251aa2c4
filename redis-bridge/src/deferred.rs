//! Deferred results and the FIFO resolution queue
//!
//! While a pipeline or transaction is open, every dispatched command produces
//! a [`Deferred`] placeholder instead of a realized value. The paired
//! conversion is parked in a [`ResultQueue`] in strict submission order and
//! applied once the driver hands back the raw result sequence.

use parking_lot::Mutex;
use redis_bridge_core::{BridgeError, BridgeResult, CommandDescriptor, Value};
use std::collections::VecDeque;
use std::sync::Arc;

enum SlotState<T> {
    Waiting,
    Ready(BridgeResult<T>),
    Taken,
    Discarded,
}

/// Placeholder for a result that becomes available after `commit`/`sync`
///
/// Reading before resolution is a caller error and reports
/// [`BridgeError::Unresolved`]; the handle is consumed exactly once.
pub struct Deferred<T> {
    slot: Arc<Mutex<SlotState<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.slot.lock() {
            SlotState::Waiting => "waiting",
            SlotState::Ready(_) => "ready",
            SlotState::Taken => "taken",
            SlotState::Discarded => "discarded",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

impl<T> Deferred<T> {
    pub(crate) fn unresolved() -> Self {
        Self {
            slot: Arc::new(Mutex::new(SlotState::Waiting)),
        }
    }

    /// Check whether the result has been resolved and not yet consumed
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(*self.slot.lock(), SlotState::Ready(_))
    }

    /// Consume the resolved result
    pub fn take(&self) -> BridgeResult<T> {
        let mut slot = self.slot.lock();
        match std::mem::replace(&mut *slot, SlotState::Taken) {
            SlotState::Ready(result) => result,
            SlotState::Waiting => {
                *slot = SlotState::Waiting;
                Err(BridgeError::Unresolved)
            }
            SlotState::Discarded => {
                *slot = SlotState::Discarded;
                Err(BridgeError::Discarded)
            }
            SlotState::Taken => Err(BridgeError::InvalidState(
                "deferred result was already consumed".to_string(),
            )),
        }
    }

    pub(crate) fn fill(&self, result: BridgeResult<T>) {
        *self.slot.lock() = SlotState::Ready(result);
    }

    pub(crate) fn cancel(&self) {
        *self.slot.lock() = SlotState::Discarded;
    }
}

/// Result of submitting one command to the runner
#[derive(Debug)]
pub enum Outcome<T> {
    /// Realized immediately (normal context)
    Immediate(T),
    /// Queued; read the handle after `exec`/`sync`
    Deferred(Deferred<T>),
}

impl<T> Outcome<T> {
    /// Check if the command executed immediately
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Unwrap the immediate result
    pub fn immediate(self) -> BridgeResult<T> {
        match self {
            Self::Immediate(value) => Ok(value),
            Self::Deferred(_) => Err(BridgeError::InvalidState(
                "command was queued; read its result after exec/sync".to_string(),
            )),
        }
    }

    /// Unwrap the deferred handle
    pub fn deferred(self) -> BridgeResult<Deferred<T>> {
        match self {
            Self::Deferred(handle) => Ok(handle),
            Self::Immediate(_) => Err(BridgeError::InvalidState(
                "command executed immediately; no deferred handle exists".to_string(),
            )),
        }
    }
}

/// Conversion applied once the positional raw result exists; `None` cancels
pub(crate) type Resolver<R> = Box<dyn FnOnce(Option<R>) -> BridgeResult<Value> + Send>;

struct QueuedConversion<R> {
    command: CommandDescriptor,
    resolve: Resolver<R>,
}

/// Strict-FIFO queue pairing each buffered command with its converter
///
/// Owned by the session while a pipeline or transaction is open. Every path
/// out of a batch (resolution, cancellation, mismatch) drains the queue, so
/// the connection never returns to normal mode with conversions parked.
pub(crate) struct ResultQueue<R> {
    items: VecDeque<QueuedConversion<R>>,
}

impl<R> ResultQueue<R> {
    pub(crate) fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn push(&mut self, command: CommandDescriptor, resolve: Resolver<R>) {
        self.items.push_back(QueuedConversion { command, resolve });
    }

    /// Apply each queued conversion to its positional raw result
    ///
    /// The queue is drained unconditionally. Conversion failures do not stop
    /// later entries from resolving; the first failure is reported after the
    /// whole batch has been walked.
    pub(crate) fn resolve_all(&mut self, raws: Vec<R>) -> BridgeResult<Vec<Value>> {
        if raws.len() != self.items.len() {
            let queued = self.items.len();
            self.cancel_all();
            return Err(BridgeError::CommitMismatch {
                queued,
                returned: raws.len(),
            });
        }

        let mut resolved = Vec::with_capacity(raws.len());
        let mut first_failure = None;
        for (item, raw) in self.items.drain(..).zip(raws) {
            match (item.resolve)(Some(raw)) {
                Ok(value) => resolved.push(value),
                Err(err) => {
                    tracing::warn!(command = %item.command, error = %err, "queued conversion failed");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                    resolved.push(Value::Nil);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(resolved),
        }
    }

    /// Drop every queued conversion, marking its handle discarded
    pub(crate) fn cancel_all(&mut self) {
        for item in self.items.drain(..) {
            let _ = (item.resolve)(None);
        }
    }
}
