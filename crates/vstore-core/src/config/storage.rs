//! Storage root and upload policy configuration.

use serde::{Deserialize, Serialize};

/// Physical storage root, virtual namespace base, and upload policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory under which the whole virtual tree is mirrored.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Virtual path prefix for root-level folders and files.
    #[serde(default = "default_virtual_base")]
    pub virtual_base: String,
    /// Permitted file extensions (case-insensitive, leading dot optional).
    /// `None` allows every extension.
    #[serde(default)]
    pub allowed_extensions: Option<Vec<String>>,
    /// Maximum upload size in bytes (default 1 GiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            virtual_base: default_virtual_base(),
            allowed_extensions: None,
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_virtual_base() -> String {
    "/".to_string()
}

fn default_max_upload() -> u64 {
    1_073_741_824 // 1 GiB
}
