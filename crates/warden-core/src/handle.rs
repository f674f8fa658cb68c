use crate::config::Settings;
use std::sync::{Arc, RwLock};

/// Shared, replaceable view of the effective settings.
///
/// Readers get an `Arc` snapshot, so a reload never changes settings under a
/// tool that is already running.
#[derive(Debug, Default)]
pub struct SettingsHandle {
    current: RwLock<Arc<Settings>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Current settings snapshot.
    pub fn get(&self) -> Arc<Settings> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in new settings; later `get` calls observe them.
    pub fn replace(&self, settings: Settings) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(settings);
    }
}

impl From<Settings> for SettingsHandle {
    fn from(settings: Settings) -> Self {
        Self::new(settings)
    }
}
