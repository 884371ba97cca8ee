//! Per-package installation state machine.

use std::collections::HashSet;

use log::{debug, error};

use crate::registry::{OpHandle, OpStatus, RegistryClient};

use super::{PackageRef, Status};

/// The at-most-one operation outstanding for a package.
///
/// Add and remove carry their own pollable handle plus the status to revert
/// to on failure. A reconcile holds no handle: the shared list operation
/// lives in the registry, this is only the interest marker.
#[derive(Debug)]
enum PendingOp {
    Add { handle: OpHandle<()>, prior: Status },
    Remove { handle: OpHandle<()>, prior: Status },
    Reconcile,
}

/// Tracks one package's installation state against the registry.
///
/// State moves `Unknown -> Loading -> {Present, Absent}` and thereafter
/// `Present <-> Loading <-> Absent`. There is no terminal state; the machine
/// lives for the process lifetime. All registry calls are fire-and-forget at
/// issue time and observed only by polling on [`PackageTracker::on_tick`].
#[derive(Debug)]
pub struct PackageTracker {
    package: PackageRef,
    status: Status,
    pending: Option<PendingOp>,
}

impl PackageTracker {
    pub fn new(package: PackageRef) -> Self {
        Self {
            package,
            status: Status::Unknown,
            pending: None,
        }
    }

    pub fn package(&self) -> &PackageRef {
        &self.package
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether any operation is outstanding for this package.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether this tracker is waiting on the shared list operation.
    pub fn awaiting_list(&self) -> bool {
        matches!(self.pending, Some(PendingOp::Reconcile))
    }

    /// Start installing this package.
    ///
    /// No-op while an operation is outstanding or the package is already
    /// present, so duplicate or contradictory clicks issue nothing.
    pub fn request_add(&mut self, client: &dyn RegistryClient) {
        if self.status == Status::Loading || self.status == Status::Present {
            debug!(
                "Ignoring add for {} while {}",
                self.package.display_name, self.status
            );
            return;
        }

        let handle = client.begin_add(&self.package.source_locator);
        self.pending = Some(PendingOp::Add {
            handle,
            prior: self.status,
        });
        self.status = Status::Loading;
    }

    /// Start removing this package. Symmetric guard to [`request_add`]:
    /// no-op while loading or already absent.
    ///
    /// [`request_add`]: PackageTracker::request_add
    pub fn request_remove(&mut self, client: &dyn RegistryClient) {
        if self.status == Status::Loading || self.status == Status::Absent {
            debug!(
                "Ignoring remove for {} while {}",
                self.package.display_name, self.status
            );
            return;
        }

        let handle = client.begin_remove(&self.package.canonical_id);
        self.pending = Some(PendingOp::Remove {
            handle,
            prior: self.status,
        });
        self.status = Status::Loading;
    }

    /// Register interest in the next shared list result.
    ///
    /// Returns whether interest was registered; the owning registry issues
    /// the actual list operation. No-op while already loading.
    pub fn request_reconcile(&mut self) -> bool {
        if self.status == Status::Loading {
            return false;
        }

        self.pending = Some(PendingOp::Reconcile);
        self.status = Status::Loading;
        true
    }

    /// Poll an outstanding add or remove once.
    ///
    /// Success lands in the operation's target state. Failure is surfaced to
    /// the log and the status reverts to its pre-request value so the user
    /// can retry; the machine is never left stuck in loading.
    pub fn on_tick(&mut self) {
        let Some(op) = self.pending.take() else {
            return;
        };

        self.pending = match op {
            PendingOp::Add { mut handle, prior } => match handle.poll() {
                OpStatus::Pending => Some(PendingOp::Add { handle, prior }),
                OpStatus::Succeeded(()) => {
                    self.status = Status::Present;
                    None
                }
                OpStatus::Failed(err) => {
                    error!("{}: {}", self.package.display_name, err);
                    self.status = prior;
                    None
                }
            },
            PendingOp::Remove { mut handle, prior } => match handle.poll() {
                OpStatus::Pending => Some(PendingOp::Remove { handle, prior }),
                OpStatus::Succeeded(()) => {
                    self.status = Status::Absent;
                    None
                }
                OpStatus::Failed(err) => {
                    error!("{}: {}", self.package.display_name, err);
                    self.status = prior;
                    None
                }
            },
            // Resolved by the registry via on_list_resolved/on_list_failed.
            PendingOp::Reconcile => Some(PendingOp::Reconcile),
        };
    }

    /// The shared list operation completed with the installed set.
    pub fn on_list_resolved(&mut self, installed: &HashSet<String>) {
        if !self.awaiting_list() {
            return;
        }

        self.status = if installed.contains(&self.package.canonical_id) {
            Status::Present
        } else {
            Status::Absent
        };
        self.pending = None;
    }

    /// The shared list operation failed; back to unobserved.
    pub fn on_list_failed(&mut self) {
        if !self.awaiting_list() {
            return;
        }

        self.status = Status::Unknown;
        self.pending = None;
    }
}
