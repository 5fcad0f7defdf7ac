//! Configuration store backing the in-process core double
//!
//! Same section semantics as the core's own store: non-destructive defaults,
//! help text per key, and persistence (TOML in the configuration directory).

use m64c_core::config::core_keys;
use m64c_core::{ConfigValue, SectionHandle, CORE_SECTION, UI_SECTION};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// On-disk form of a [`ConfigValue`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl From<&ConfigValue> for StoredValue {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(v) => Self::Bool(*v),
            ConfigValue::Int(v) => Self::Int(*v),
            ConfigValue::Float(v) => Self::Float(*v),
            ConfigValue::String(v) => Self::String(v.clone()),
        }
    }
}

impl From<StoredValue> for ConfigValue {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Bool(v) => Self::Bool(v),
            StoredValue::Int(v) => Self::Int(v),
            StoredValue::Float(v) => Self::Float(v),
            StoredValue::String(v) => Self::String(v),
        }
    }
}

type StoredSections = BTreeMap<String, BTreeMap<String, StoredValue>>;

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown configuration section handle {0}")]
    UnknownSection(usize),
}

/// Named sections with TOML persistence
#[derive(Debug, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    names: Vec<String>,
    sections: BTreeMap<String, BTreeMap<String, ConfigValue>>,
    help: HashMap<(String, String), String>,
}

impl ConfigStore {
    pub const FILE_NAME: &'static str = "m64-console.toml";

    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from `dir`, starting empty if no file exists yet
    pub fn load(dir: &Path) -> Result<Self, ConfigStoreError> {
        let path = dir.join(Self::FILE_NAME);
        let stored: StoredSections = if path.exists() {
            toml::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };

        let sections = stored
            .into_iter()
            .map(|(name, keys)| {
                let keys = keys.into_iter().map(|(k, v)| (k, v.into())).collect();
                (name, keys)
            })
            .collect();

        Ok(Self {
            path: Some(path),
            sections,
            ..Self::default()
        })
    }

    /// Open (creating if needed) the section called `name`
    pub fn open_section(&mut self, name: &str) -> SectionHandle {
        self.sections.entry(name.to_string()).or_default();
        let idx = match self.names.iter().position(|n| n == name) {
            Some(idx) => idx,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        };
        SectionHandle::new(name, idx)
    }

    fn section_mut(
        &mut self,
        handle: &SectionHandle,
    ) -> Result<&mut BTreeMap<String, ConfigValue>, ConfigStoreError> {
        let name = self
            .names
            .get(handle.raw())
            .ok_or(ConfigStoreError::UnknownSection(handle.raw()))?;
        self.sections
            .get_mut(name)
            .ok_or(ConfigStoreError::UnknownSection(handle.raw()))
    }

    /// Set `key` only if the section does not hold a value for it yet
    pub fn set_default(
        &mut self,
        handle: &SectionHandle,
        key: &str,
        value: ConfigValue,
        help: &str,
    ) -> Result<(), ConfigStoreError> {
        self.section_mut(handle)?
            .entry(key.to_string())
            .or_insert(value);
        self.help
            .insert((handle.name().to_string(), key.to_string()), help.to_string());
        Ok(())
    }

    pub fn set(
        &mut self,
        handle: &SectionHandle,
        key: &str,
        value: ConfigValue,
    ) -> Result<(), ConfigStoreError> {
        self.section_mut(handle)?.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    pub fn help(&self, section: &str, key: &str) -> Option<&str> {
        self.help
            .get(&(section.to_string(), key.to_string()))
            .map(String::as_str)
    }

    /// Write every section back to the file the store was loaded from
    pub fn save(&self) -> Result<(), ConfigStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let stored: StoredSections = self
            .sections
            .iter()
            .map(|(name, keys)| {
                let keys = keys.iter().map(|(k, v)| (k.clone(), v.into())).collect();
                (name.clone(), keys)
            })
            .collect();
        std::fs::write(path, toml::to_string_pretty(&stored)?)?;
        Ok(())
    }
}

#[test]
fn test_store_set_default_is_non_destructive() {
    let mut store = ConfigStore::in_memory();
    let ui = store.open_section(UI_SECTION);

    store.set(&ui, "VideoPlugin", "custom.so".into()).unwrap();
    store
        .set_default(&ui, "VideoPlugin", "default.so".into(), "Filename of video plugin")
        .unwrap();
    store
        .set_default(&ui, "AudioPlugin", "audio.so".into(), "Filename of audio plugin")
        .unwrap();

    assert_eq!(
        store.get(UI_SECTION, "VideoPlugin"),
        Some(&ConfigValue::String("custom.so".to_string()))
    );
    assert_eq!(
        store.get(UI_SECTION, "AudioPlugin").and_then(ConfigValue::as_str),
        Some("audio.so")
    );
    assert_eq!(store.help(UI_SECTION, "AudioPlugin"), Some("Filename of audio plugin"));
}

#[test]
fn test_store_reopen_section_returns_same_handle() {
    let mut store = ConfigStore::in_memory();
    let a = store.open_section(CORE_SECTION);
    let b = store.open_section(UI_SECTION);
    assert_ne!(a, b);
    assert_eq!(store.open_section(CORE_SECTION), a);
}

#[test]
fn test_store_unknown_handle() {
    let mut store = ConfigStore::in_memory();
    let bogus = SectionHandle::new("Nope", 7);
    assert!(matches!(
        store.set(&bogus, "Key", true.into()),
        Err(ConfigStoreError::UnknownSection(7))
    ));
}

#[test]
fn test_store_save_and_reload() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");

    let mut store = ConfigStore::load(temp_dir.path()).unwrap();
    let core = store.open_section(CORE_SECTION);
    let ui = store.open_section(UI_SECTION);
    store.set(&core, core_keys::FULLSCREEN, true.into()).unwrap();
    store.set(&core, core_keys::R4300_EMULATOR, 2.into()).unwrap();
    store.set(&ui, "VideoPlugin", "customgfx.so".into()).unwrap();
    store.save().unwrap();

    let reloaded = ConfigStore::load(temp_dir.path()).unwrap();
    assert_eq!(
        reloaded.get(CORE_SECTION, core_keys::FULLSCREEN),
        Some(&ConfigValue::Bool(true))
    );
    assert_eq!(
        reloaded.get(CORE_SECTION, core_keys::R4300_EMULATOR),
        Some(&ConfigValue::Int(2))
    );
    assert_eq!(
        reloaded.get(UI_SECTION, "VideoPlugin").and_then(ConfigValue::as_str),
        Some("customgfx.so")
    );
}
