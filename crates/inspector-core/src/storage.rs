use tracing::warn;

use crate::model::PanelPosition;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to read `{key}` from storage")]
    Read { key: String },
    #[error("failed to write `{key}` to storage")]
    Write { key: String },
    #[error("failed to clear storage")]
    Clear,
    #[error("failed to access cookies")]
    Cookies,
}

/// String key/value storage owned by the host page (`localStorage`,
/// `sessionStorage`).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Persisted panel placement, independent of any panel instance.
#[derive(Debug, Clone)]
pub struct PositionStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PositionStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Unreadable, malformed or non-finite entries yield `None`.
    pub fn load(&self) -> Option<PanelPosition> {
        let raw = match self.store.get_item(&self.key) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "panel position unavailable");
                return None;
            }
        };
        match serde_json::from_str::<PanelPosition>(&raw) {
            Ok(position) if position.is_finite() => Some(position),
            Ok(_) => None,
            Err(error) => {
                warn!(%error, "ignoring malformed panel position");
                None
            }
        }
    }

    pub fn save(&self, position: PanelPosition) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&position).map_err(|_| StorageError::Write {
            key: self.key.clone(),
        })?;
        self.store.set_item(&self.key, &encoded)
    }
}
