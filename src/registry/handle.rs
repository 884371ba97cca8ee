//! Pollable handles for in-flight registry operations.
//!
//! A begin-operation hands back an [`OpHandle`] and keeps the matching
//! [`OpCompleter`]; the producer reports exactly one outcome through the
//! completer while the consumer polls the handle once per scheduler tick.
//! Polling never blocks.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use super::{OpKind, OperationError};

/// Observed state of an in-flight operation.
#[derive(Debug)]
pub enum OpStatus<T> {
    /// Not finished yet; poll again on a later tick.
    Pending,
    Succeeded(T),
    Failed(OperationError),
}

/// Consumer side of one registry operation.
#[derive(Debug)]
pub struct OpHandle<T> {
    kind: OpKind,
    rx: oneshot::Receiver<Result<T, OperationError>>,
}

/// Producer side of one registry operation. Consumed on completion, so an
/// operation can report at most one outcome.
#[derive(Debug)]
pub struct OpCompleter<T> {
    kind: OpKind,
    tx: oneshot::Sender<Result<T, OperationError>>,
}

impl<T> OpHandle<T> {
    /// Create a connected completer/handle pair for an operation of `kind`.
    pub fn pair(kind: OpKind) -> (OpCompleter<T>, OpHandle<T>) {
        let (tx, rx) = oneshot::channel();
        (OpCompleter { kind, tx }, OpHandle { kind, rx })
    }

    /// A handle that polls as already succeeded.
    pub fn succeeded(kind: OpKind, value: T) -> Self {
        let (completer, handle) = Self::pair(kind);
        completer.succeed(value);
        handle
    }

    /// A handle that polls as already failed.
    pub fn failed(kind: OpKind, message: impl Into<String>) -> Self {
        let (completer, handle) = Self::pair(kind);
        completer.fail(message);
        handle
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// Check the operation without blocking.
    ///
    /// A producer that disappears without reporting (dropped completer)
    /// polls as failed rather than staying pending forever.
    pub fn poll(&mut self) -> OpStatus<T> {
        match self.rx.try_recv() {
            Ok(Ok(value)) => OpStatus::Succeeded(value),
            Ok(Err(err)) => OpStatus::Failed(err),
            Err(TryRecvError::Empty) => OpStatus::Pending,
            Err(TryRecvError::Closed) => OpStatus::Failed(OperationError::abandoned(self.kind)),
        }
    }
}

impl<T> OpCompleter<T> {
    pub fn succeed(self, value: T) {
        // The consumer may have been dropped; no one left to notify.
        let _ = self.tx.send(Ok(value));
    }

    pub fn fail(self, message: impl Into<String>) {
        let err = OperationError::new(self.kind, message);
        let _ = self.tx.send(Err(err));
    }
}
