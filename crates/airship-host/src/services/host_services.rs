// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend wiring for the harness.
//
// The harness has no real push SDK, so the module runs against `StubBridge`.
// The stub handle is kept alongside the module so `sdk.*` simulation commands
// can drive it directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use airship_bridge::{PreferenceStore, StubBridge};
use airship_core::config::ModuleConfig;
use airship_core::error::Result;
use airship_core::types::HostEvent;
use airship_module::{AirshipModule, MemoryPreferences, SqlitePreferences};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::data_dir;

#[derive(Clone)]
pub struct HostServices {
    module: Arc<AirshipModule>,
    sdk: Arc<StubBridge>,
    data_dir: Option<PathBuf>,
}

impl HostServices {
    /// Initialise with on-disk preferences. Call once at startup.
    ///
    /// Uses the platform's native preference store when there is one,
    /// otherwise a SQLite file under the data directory.
    pub fn init(config: ModuleConfig, events: UnboundedSender<HostEvent>) -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising host services");

        let prefs: Arc<dyn PreferenceStore> = match airship_bridge::platform_preferences() {
            Some(native) => native,
            None => Arc::new(SqlitePreferences::open(dir.join(&config.preferences_file))?),
        };
        let sdk = Arc::new(StubBridge::new());
        let module = AirshipModule::new(sdk.clone(), prefs, Arc::new(events), config);

        info!("host services initialised");
        Ok(Self {
            module: Arc::new(module),
            sdk,
            data_dir: Some(dir),
        })
    }

    /// Volatile services used when the preference database cannot be opened.
    pub fn fallback(config: ModuleConfig, events: UnboundedSender<HostEvent>) -> Self {
        let sdk = Arc::new(StubBridge::new());
        let module = AirshipModule::new(
            sdk.clone(),
            Arc::new(MemoryPreferences::new()),
            Arc::new(events),
            config,
        );
        Self {
            module: Arc::new(module),
            sdk,
            data_dir: None,
        }
    }

    pub fn module(&self) -> &AirshipModule {
        &self.module
    }

    pub fn sdk(&self) -> &StubBridge {
        &self.sdk
    }

    /// `None` when running on volatile fallback storage.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}

// -- Config file -------------------------------------------------------------

/// Load the module config from `path`, falling back to defaults when the file
/// is absent or unreadable.
pub fn load_config(path: Option<&Path>) -> ModuleConfig {
    let Some(path) = path else {
        return ModuleConfig::default();
    };
    match read_config(path) {
        Some(config) => {
            info!(path = %path.display(), "module config loaded");
            config
        }
        None => {
            warn!(path = %path.display(), "module config unreadable, using defaults");
            ModuleConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Option<ModuleConfig> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_gives_defaults() {
        assert_eq!(load_config(None), ModuleConfig::default());
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert_eq!(load_config(Some(&missing)), ModuleConfig::default());
    }

    #[test]
    fn config_file_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("airship.json");
        std::fs::write(
            &path,
            r#"{ "event_buffer_capacity": 8, "min_active_notifications_api_level": 26 }"#,
        )
        .expect("write");

        let config = load_config(Some(&path));
        assert_eq!(config.event_buffer_capacity, Some(8));
        assert_eq!(config.min_active_notifications_api_level, 26);
        assert_eq!(config.preferences_file, "airship_prefs.db");
    }

    #[test]
    fn malformed_config_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("airship.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert_eq!(load_config(Some(&path)), ModuleConfig::default());
    }

    #[test]
    fn fallback_has_no_data_dir() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let services = HostServices::fallback(ModuleConfig::default(), tx);
        assert!(services.data_dir().is_none());
        assert_eq!(services.module().get_badge_number(), 0);
    }
}
