//! Repository pattern for progress and settings storage.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use study_core::{EffectiveSettings, GlobalSettings, ModuleSettings, ProgressSnapshot};

/// Repository for per-module progress.
pub trait ProgressRepository {
    fn load_progress(&self, module: &str) -> Result<Option<ProgressSnapshot>>;
    fn save_progress(&self, module: &str, snapshot: &ProgressSnapshot) -> Result<()>;
    fn clear_progress(&self, module: &str) -> Result<()>;
}

/// Repository for settings operations.
pub trait SettingsRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings>;
    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()>;
    fn get_module_settings(&self, module: &str) -> Result<Option<ModuleSettings>>;
    fn save_module_settings(&self, settings: &ModuleSettings) -> Result<()>;
    fn delete_module_settings(&self, module: &str) -> Result<()>;

    fn get_effective_settings(&self, module: Option<&str>) -> Result<EffectiveSettings> {
        let global = self.get_global_settings()?;
        let module = match module {
            Some(name) => self.get_module_settings(name)?,
            None => None,
        };
        Ok(EffectiveSettings::merge(&global, module.as_ref()))
    }
}

/// Default storage root under the platform's local data directory.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("study-core"))
        .ok_or(StoreError::NoDataDirectory)
}

/// Module names become file names, so only `[A-Za-z0-9_-]` is allowed.
fn validate_module_name(module: &str) -> Result<()> {
    let valid = !module.is_empty()
        && module
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidModuleName(module.to_string()))
    }
}

/// JSON files under a root directory.
///
/// ```text
/// <root>/progress/<module>.json
/// <root>/settings/global.json
/// <root>/settings/modules/<module>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    /// Open (and create if needed) a repository rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("progress"))?;
        fs::create_dir_all(root.join("settings").join("modules"))?;
        tracing::info!(root = %root.display(), "opened progress store");
        Ok(Self { root })
    }

    /// Open the repository in the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_data_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn progress_path(&self, module: &str) -> Result<PathBuf> {
        validate_module_name(module)?;
        Ok(self.root.join("progress").join(format!("{module}.json")))
    }

    fn global_settings_path(&self) -> PathBuf {
        self.root.join("settings").join("global.json")
    }

    fn module_settings_path(&self, module: &str) -> Result<PathBuf> {
        validate_module_name(module)?;
        Ok(self
            .root
            .join("settings")
            .join("modules")
            .join(format!("{module}.json")))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "unreadable stored data");
        e.into()
    })
}

/// Write through a temporary file so a crash never leaves a truncated file.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ProgressRepository for JsonFileRepository {
    fn load_progress(&self, module: &str) -> Result<Option<ProgressSnapshot>> {
        let snapshot = read_json(&self.progress_path(module)?)?;
        tracing::info!(module, found = snapshot.is_some(), "loaded progress");
        Ok(snapshot)
    }

    fn save_progress(&self, module: &str, snapshot: &ProgressSnapshot) -> Result<()> {
        write_json(&self.progress_path(module)?, snapshot)?;
        tracing::info!(module, reviews = snapshot.reviews.len(), "saved progress");
        Ok(())
    }

    fn clear_progress(&self, module: &str) -> Result<()> {
        remove_if_exists(&self.progress_path(module)?)?;
        tracing::info!(module, "cleared progress");
        Ok(())
    }
}

impl SettingsRepository for JsonFileRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings> {
        let settings: GlobalSettings = read_json(&self.global_settings_path())?.unwrap_or_default();
        settings
            .validate()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        Ok(settings)
    }

    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        write_json(&self.global_settings_path(), settings)
    }

    fn get_module_settings(&self, module: &str) -> Result<Option<ModuleSettings>> {
        read_json(&self.module_settings_path(module)?)
    }

    fn save_module_settings(&self, settings: &ModuleSettings) -> Result<()> {
        write_json(&self.module_settings_path(&settings.module)?, settings)
    }

    fn delete_module_settings(&self, module: &str) -> Result<()> {
        remove_if_exists(&self.module_settings_path(module)?)
    }
}

/// In-memory repository, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    progress: Mutex<HashMap<String, ProgressSnapshot>>,
    global: Mutex<Option<GlobalSettings>>,
    modules: Mutex<HashMap<String, ModuleSettings>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressRepository for MemoryRepository {
    fn load_progress(&self, module: &str) -> Result<Option<ProgressSnapshot>> {
        validate_module_name(module)?;
        let progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(progress.get(module).cloned())
    }

    fn save_progress(&self, module: &str, snapshot: &ProgressSnapshot) -> Result<()> {
        validate_module_name(module)?;
        let mut progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        progress.insert(module.to_string(), snapshot.clone());
        Ok(())
    }

    fn clear_progress(&self, module: &str) -> Result<()> {
        validate_module_name(module)?;
        let mut progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        progress.remove(module);
        Ok(())
    }
}

impl SettingsRepository for MemoryRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings> {
        let global = self.global.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(global.clone().unwrap_or_default())
    }

    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        *self.global.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }

    fn get_module_settings(&self, module: &str) -> Result<Option<ModuleSettings>> {
        let modules = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(modules.get(module).cloned())
    }

    fn save_module_settings(&self, settings: &ModuleSettings) -> Result<()> {
        validate_module_name(&settings.module)?;
        let mut modules = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
        modules.insert(settings.module.clone(), settings.clone());
        Ok(())
    }

    fn delete_module_settings(&self, module: &str) -> Result<()> {
        let mut modules = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
        modules.remove(module);
        Ok(())
    }
}
