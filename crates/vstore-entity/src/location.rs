//! The virtual/physical path pair of a catalog entry.

use serde::{Deserialize, Serialize};

/// Where an entry lives in both namespaces.
///
/// The two paths only ever change together, so updates carry them as one
/// value rather than as two independent optional columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Public address (`/docs/reports/`, `/docs/<id>.pdf`).
    pub virtual_path: String,
    /// Physical path under the storage root.
    pub storage_path: String,
}

impl Location {
    /// Pair a virtual path with its translated storage path.
    pub fn new(virtual_path: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            virtual_path: virtual_path.into(),
            storage_path: storage_path.into(),
        }
    }
}
