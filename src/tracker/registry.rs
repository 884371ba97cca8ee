//! Registry of trackers and the shared list operation.

use std::collections::HashSet;

use anyhow::Result;
use log::error;

use crate::registry::{OpHandle, OpStatus, RegistryClient};

use super::{PackageRef, PackageTracker};

/// Owns the fixed set of package trackers and drives them from one
/// cooperative tick.
///
/// However many trackers ask to reconcile, at most one list operation is
/// outstanding registry-wide; its result fans out to every tracker that
/// registered interest. Trackers never touch the shared operation directly.
pub struct TrackerRegistry<C: RegistryClient> {
    client: C,
    trackers: Vec<PackageTracker>,
    shared_list: Option<OpHandle<HashSet<String>>>,
}

impl<C: RegistryClient> TrackerRegistry<C> {
    /// Build one tracker per package reference.
    pub fn new(client: C, packages: Vec<PackageRef>) -> Self {
        Self {
            client,
            trackers: packages.into_iter().map(PackageTracker::new).collect(),
            shared_list: None,
        }
    }

    pub fn trackers(&self) -> &[PackageTracker] {
        &self.trackers
    }

    /// Look up a tracker by display or canonical name.
    pub fn get(&self, name: &str) -> Option<&PackageTracker> {
        self.trackers.iter().find(|t| {
            let package = t.package();
            package.display_name == name || package.canonical_id == name
        })
    }

    /// Whether no operation, shared or per-package, is outstanding.
    pub fn is_idle(&self) -> bool {
        self.shared_list.is_none() && self.trackers.iter().all(|t| !t.is_busy())
    }

    /// Ask every tracker to reconcile against the registry's installed set.
    ///
    /// Issues at most one list operation regardless of how many trackers
    /// registered interest; an already-outstanding list is reused.
    pub fn request_reconcile_all(&mut self) {
        let mut registered = false;
        for tracker in &mut self.trackers {
            registered |= tracker.request_reconcile();
        }
        if registered {
            self.ensure_list_operation();
        }
    }

    /// Reconcile a single package by display or canonical name.
    pub fn request_reconcile(&mut self, name: &str) -> Result<()> {
        let tracker = self.find_mut(name)?;
        if tracker.request_reconcile() {
            self.ensure_list_operation();
        }
        Ok(())
    }

    /// Start installing a single package by display or canonical name.
    pub fn request_add(&mut self, name: &str) -> Result<()> {
        let client = &self.client;
        let tracker = Self::find_in(&mut self.trackers, name)?;
        tracker.request_add(client);
        Ok(())
    }

    /// Start removing a single package by display or canonical name.
    pub fn request_remove(&mut self, name: &str) -> Result<()> {
        let client = &self.client;
        let tracker = Self::find_in(&mut self.trackers, name)?;
        tracker.request_remove(client);
        Ok(())
    }

    /// Drive one scheduler tick.
    ///
    /// Polls the shared list operation at most once, fanning a terminal
    /// result out to all interested trackers and clearing it so a later
    /// reconcile can issue a fresh one; then ticks every tracker to drive
    /// their individual add/remove polls.
    pub fn on_tick(&mut self) {
        if let Some(mut handle) = self.shared_list.take() {
            match handle.poll() {
                OpStatus::Pending => self.shared_list = Some(handle),
                OpStatus::Succeeded(installed) => {
                    for tracker in &mut self.trackers {
                        tracker.on_list_resolved(&installed);
                    }
                }
                OpStatus::Failed(err) => {
                    error!("{}", err);
                    for tracker in &mut self.trackers {
                        tracker.on_list_failed();
                    }
                }
            }
        }

        for tracker in &mut self.trackers {
            tracker.on_tick();
        }
    }

    fn ensure_list_operation(&mut self) {
        if self.shared_list.is_none() {
            self.shared_list = Some(self.client.begin_list());
        }
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut PackageTracker> {
        Self::find_in(&mut self.trackers, name)
    }

    fn find_in<'a>(
        trackers: &'a mut [PackageTracker],
        name: &str,
    ) -> Result<&'a mut PackageTracker> {
        trackers
            .iter_mut()
            .find(|t| {
                let package = t.package();
                package.display_name == name || package.canonical_id == name
            })
            .ok_or_else(|| anyhow::anyhow!("No tracked package named '{}'", name))
    }
}
