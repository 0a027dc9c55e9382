//! Per-virtual-path advisory locks.
//!
//! A mutation write-locks every path it creates, moves, or deletes and
//! read-locks all of their ancestors. Locks are taken in lexical order of
//! the path, which is one global order, so two guards can never wait on
//! each other. The locks are in-process only.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::trace;

use vstore_core::paths::ancestors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

#[derive(Debug)]
#[allow(dead_code)]
enum Held {
    Read(OwnedRwLockReadGuard<()>),
    Write(OwnedRwLockWriteGuard<()>),
}

/// Lock table keyed by virtual path.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    table: Arc<DashMap<String, Arc<RwLock<()>>>>,
}

impl PathLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `targets` for writing and their ancestors for reading.
    ///
    /// Waits until every lock is held. The locks are released when the
    /// returned guard drops.
    pub async fn acquire(&self, targets: &[&str]) -> PathGuard {
        let mut plan: BTreeMap<String, Mode> = BTreeMap::new();
        for target in targets {
            for ancestor in ancestors(target) {
                plan.entry(ancestor).or_insert(Mode::Read);
            }
        }
        for target in targets {
            plan.insert((*target).to_string(), Mode::Write);
        }

        let mut held = Vec::with_capacity(plan.len());
        for (path, mode) in &plan {
            let lock = self
                .table
                .entry(path.clone())
                .or_insert_with(|| Arc::new(RwLock::new(())))
                .clone();
            held.push(match mode {
                Mode::Read => Held::Read(lock.read_owned().await),
                Mode::Write => Held::Write(lock.write_owned().await),
            });
        }

        trace!(paths = ?plan.keys().collect::<Vec<_>>(), "Acquired path locks");
        PathGuard {
            table: Arc::clone(&self.table),
            keys: plan.into_keys().collect(),
            held,
        }
    }

    /// Number of paths with a live lock entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no path is currently tracked.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Holds a set of path locks until dropped.
#[derive(Debug)]
pub struct PathGuard {
    table: Arc<DashMap<String, Arc<RwLock<()>>>>,
    keys: Vec<String>,
    held: Vec<Held>,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        // Release in reverse acquisition order, then drop entries nobody
        // else references.
        while self.held.pop().is_some() {}
        for key in &self.keys {
            self.table
                .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}
