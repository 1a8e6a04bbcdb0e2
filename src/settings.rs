use log::{error, info};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// User-facing display settings, persisted across restarts
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub invert_colors: bool,
}

/// Wrapper for display settings, that handles loading/saving
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: DisplaySettings,
}

impl SettingsStore {
    pub fn load(path: &Path) -> Self {
        // Shitty try block
        let helper = || {
            let contents = fs::read(path)?;
            Ok::<DisplaySettings, anyhow::Error>(serde_json::from_slice(
                &contents,
            )?)
        };
        let settings = match helper() {
            Ok(settings) => settings,
            Err(err) => {
                error!("Error loading settings from {path:?}: {err}");
                DisplaySettings::default()
            }
        };
        Self {
            path: path.to_owned(),
            settings,
        }
    }

    pub fn get(&self) -> DisplaySettings {
        self.settings
    }

    /// Store and persist new settings. A failed write is logged and
    /// otherwise ignored; the new value still applies for this session.
    pub fn set(&mut self, new_settings: DisplaySettings) {
        self.settings = new_settings;
        info!("Saving settings: {new_settings:?}");
        // Shitty try block
        let helper = || {
            let serialized = serde_json::to_string_pretty(&new_settings)?;
            fs::write(&self.path, serialized)?;
            Ok::<(), anyhow::Error>(())
        };
        if let Err(err) = helper() {
            error!("Error saving settings to {:?}: {err}", self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Fresh settings path under the system temp dir
    fn settings_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("spindrift-{name}.json"));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_round_trip() {
        let path = settings_path("settings-round-trip");
        let mut store = SettingsStore::load(&path);
        assert_eq!(store.get(), DisplaySettings::default());

        store.set(DisplaySettings {
            invert_colors: true,
        });
        let reloaded = SettingsStore::load(&path);
        assert!(reloaded.get().invert_colors);
    }

    #[test]
    fn test_garbage_file() {
        let path = settings_path("settings-garbage");
        fs::write(&path, "not json").unwrap();
        let store = SettingsStore::load(&path);
        assert_eq!(store.get(), DisplaySettings::default());
    }
}
