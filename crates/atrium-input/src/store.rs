//! Persisted binding store boundary.
//!
//! The binding table does not own persistence. It reads initial values from
//! and forwards mutations to a [`BindingStore`], a key-value view of the
//! form `key_<canonical_action> -> integer input code` plus a separate float
//! for pointer sensitivity. [`FileBindingStore`] is the RON-backed default;
//! [`MemoryBindingStore`] backs tests and embedding applications that manage
//! their own settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bindings::Action;

/// External settings store the binding table loads from and writes through to.
pub trait BindingStore {
    /// The persisted input code for an action, if any.
    fn binding_code(&self, action: Action) -> Option<u16>;
    /// Persist a new input code for an action.
    fn set_binding_code(&mut self, action: Action, code: u16);
    /// The persisted pointer sensitivity, if any.
    fn mouse_sensitivity(&self) -> Option<f32>;
    /// Persist the pointer sensitivity.
    fn set_mouse_sensitivity(&mut self, value: f32);
}

fn store_key(action: Action) -> String {
    format!("key_{}", action.canonical_name())
}

/// Serialized on-disk shape of the settings store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct StoreData {
    /// `key_<canonical_action> -> input code` entries.
    keys: HashMap<String, u16>,
    /// Pointer sensitivity, absent until first written.
    mouse_sensitivity: Option<f32>,
}

/// In-memory store for tests and host-managed settings.
#[derive(Debug, Clone, Default)]
pub struct MemoryBindingStore {
    data: StoreData,
}

impl MemoryBindingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed an input code, as a settings screen would have persisted it.
    pub fn seed(&mut self, action: Action, code: u16) {
        self.data.keys.insert(store_key(action), code);
    }
}

impl BindingStore for MemoryBindingStore {
    fn binding_code(&self, action: Action) -> Option<u16> {
        self.data.keys.get(&store_key(action)).copied()
    }

    fn set_binding_code(&mut self, action: Action, code: u16) {
        self.data.keys.insert(store_key(action), code);
    }

    fn mouse_sensitivity(&self) -> Option<f32> {
        self.data.mouse_sensitivity
    }

    fn set_mouse_sensitivity(&mut self, value: f32) {
        self.data.mouse_sensitivity = Some(value);
    }
}

/// RON-file-backed store. Every mutation writes through to disk.
#[derive(Debug)]
pub struct FileBindingStore {
    path: PathBuf,
    data: StoreData,
}

impl FileBindingStore {
    /// Open the store at `path`, falling back to an empty store (with a
    /// warning) if the file is missing or malformed.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        "Malformed binding store {}: {e}; starting empty",
                        path.display()
                    );
                    StoreData::default()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read binding store {}: {e}; starting empty",
                    path.display()
                );
                StoreData::default()
            }
        };
        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    /// Returns the platform config path for `bindings.ron`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("atrium").join("bindings.ron"))
    }

    fn flush(&self) {
        let write = || -> Result<(), Box<dyn std::error::Error>> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let ron_str =
                ron::ser::to_string_pretty(&self.data, ron::ser::PrettyConfig::default())?;
            std::fs::write(&self.path, ron_str)?;
            Ok(())
        };
        if let Err(e) = write() {
            warn!("Failed to write binding store {}: {e}", self.path.display());
        }
    }
}

impl BindingStore for FileBindingStore {
    fn binding_code(&self, action: Action) -> Option<u16> {
        self.data.keys.get(&store_key(action)).copied()
    }

    fn set_binding_code(&mut self, action: Action, code: u16) {
        self.data.keys.insert(store_key(action), code);
        self.flush();
    }

    fn mouse_sensitivity(&self) -> Option<f32> {
        self.data.mouse_sensitivity
    }

    fn set_mouse_sensitivity(&mut self, value: f32) {
        self.data.mouse_sensitivity = Some(value);
        self.flush();
    }
}
