//! Plugin selection and directory search

use m64c_core::config::ui_keys;
use m64c_core::{PluginError, PluginRole, DUMMY_PLUGIN};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Plugin directory used when neither the command line nor the configuration sets one
pub const DEFAULT_PLUGIN_DIR: &str = "./";

/// Plugin choices given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOverrides {
    pub plugin_dir: Option<String>,
    pub video: Option<String>,
    pub audio: Option<String>,
    pub input: Option<String>,
    pub rsp: Option<String>,
}

impl PluginOverrides {
    pub fn get(&self, role: PluginRole) -> Option<&str> {
        match role {
            PluginRole::Video => self.video.as_deref(),
            PluginRole::Audio => self.audio.as_deref(),
            PluginRole::Input => self.input.as_deref(),
            PluginRole::Rsp => self.rsp.as_deref(),
        }
    }

    pub fn set(&mut self, role: PluginRole, spec: impl Into<String>) {
        let slot = match role {
            PluginRole::Video => &mut self.video,
            PluginRole::Audio => &mut self.audio,
            PluginRole::Input => &mut self.input,
            PluginRole::Rsp => &mut self.rsp,
        };
        *slot = Some(spec.into());
    }
}

/// What a plugin spec refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginTarget {
    /// The core's built-in no-op implementation
    Dummy,
    /// A full path to a library
    Path(PathBuf),
    /// A filename to look for in the plugin directory
    Name(String),
}

impl PluginTarget {
    pub fn parse(spec: &str) -> Self {
        if spec.eq_ignore_ascii_case(DUMMY_PLUGIN) {
            Self::Dummy
        } else if spec.contains('/') || spec.contains(std::path::MAIN_SEPARATOR) {
            Self::Path(PathBuf::from(spec))
        } else {
            Self::Name(spec.to_string())
        }
    }
}

/// Resolved plugin directory and one target per role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSettings {
    pub plugin_dir: PathBuf,
    pub targets: Vec<(PluginRole, PluginTarget)>,
}

impl PluginSettings {
    /// Pick each role's plugin: command line, then configuration, then the
    /// built-in default filename
    ///
    /// `configured` looks up a key of the front-end configuration section;
    /// empty values count as unset.
    pub fn resolve<F>(overrides: &PluginOverrides, configured: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| configured(key).filter(|v| !v.is_empty());

        let plugin_dir = overrides
            .plugin_dir
            .clone()
            .or_else(|| lookup(ui_keys::PLUGIN_DIR))
            .unwrap_or_else(|| DEFAULT_PLUGIN_DIR.to_string());

        let targets = PluginRole::ALL
            .iter()
            .map(|&role| {
                let spec = overrides
                    .get(role)
                    .map(str::to_string)
                    .or_else(|| lookup(role.config_key()))
                    .unwrap_or_else(|| role.default_filename());
                debug!("{} plugin spec: {}", role, spec);
                (role, PluginTarget::parse(&spec))
            })
            .collect();

        Self {
            plugin_dir: PathBuf::from(plugin_dir),
            targets,
        }
    }
}

/// List the dynamic libraries in `dir`, sorted by path
pub fn scan_plugin_dir(dir: &Path) -> Result<Vec<PathBuf>, PluginError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PluginError::Directory {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut libraries: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_dynamic_library(path))
        .collect();
    libraries.sort();

    debug!("Found {} plugin candidates in {}", libraries.len(), dir.display());
    Ok(libraries)
}

fn is_dynamic_library(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(std::env::consts::DLL_SUFFIX))
}

/// Find the library called `name` among `candidates`
pub fn find_by_name<'a>(candidates: &'a [PathBuf], name: &str) -> Option<&'a PathBuf> {
    candidates
        .iter()
        .find(|path| path.file_name().is_some_and(|n| n == name))
}
