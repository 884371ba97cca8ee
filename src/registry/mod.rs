//! Registry client abstraction.
//!
//! The registry is the external authority on which packages are installed.
//! It exposes three non-blocking begin-operations; outcomes are observed
//! only by polling the returned handle, never via callbacks. The shipped
//! implementation is [`HttpRegistryClient`]; tests use the generated
//! [`MockRegistryClient`].

mod handle;
mod http;

use std::collections::HashSet;
use std::fmt;

pub use handle::{OpCompleter, OpHandle, OpStatus};
pub use http::HttpRegistryClient;

/// Which registry operation an error or handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Remove,
    List,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Add => write!(f, "add"),
            OpKind::Remove => write!(f, "remove"),
            OpKind::List => write!(f, "list"),
        }
    }
}

/// A failed registry operation.
///
/// Failures are non-fatal by contract: the tracker logs them and reverts,
/// and the user retries by re-issuing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub kind: OpKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: OpKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The producer side of the operation went away without reporting a
    /// result (e.g. its task panicked).
    pub(crate) fn abandoned(kind: OpKind) -> Self {
        Self::new(kind, "operation was abandoned before completing")
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} operation failed: {}", self.kind, self.message)
    }
}

impl std::error::Error for OperationError {}

/// Non-blocking operations against the package registry.
///
/// Every method returns immediately with a pollable handle. The client is
/// assumed to have no push mechanism; completion is only ever observed on a
/// scheduler tick.
#[cfg_attr(test, mockall::automock)]
pub trait RegistryClient: Send + Sync {
    /// Start installing a package from its source locator.
    fn begin_add(&self, source_locator: &str) -> OpHandle<()>;

    /// Start removing an installed package by canonical id.
    fn begin_remove(&self, canonical_id: &str) -> OpHandle<()>;

    /// Start fetching the set of installed canonical ids.
    fn begin_list(&self) -> OpHandle<HashSet<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_kind_display() {
        assert_eq!(OpKind::Add.to_string(), "add");
        assert_eq!(OpKind::Remove.to_string(), "remove");
        assert_eq!(OpKind::List.to_string(), "list");
    }

    #[test]
    fn test_operation_error_display() {
        let err = OperationError::new(OpKind::Add, "registry unreachable");
        assert_eq!(
            err.to_string(),
            "add operation failed: registry unreachable"
        );
    }

    #[test]
    fn test_operation_error_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(OperationError::new(OpKind::List, "boom"));
        assert!(err.to_string().contains("list"));
    }
}
