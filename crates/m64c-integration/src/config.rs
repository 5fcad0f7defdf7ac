//! Front-end view of the core's configuration store

use crate::cli::CoreOverride;
use m64c_core::config::{core_keys, ui_keys};
use m64c_core::{
    ConfigKind, ConfigValue, CoreError, EmulatorCore, FrontendError, PluginRole, SectionHandle,
    CORE_SECTION, UI_SECTION,
};
use m64c_loader::{PluginOverrides, PluginSettings, DEFAULT_PLUGIN_DIR};
use std::path::PathBuf;
use tracing::{debug, warn};

fn open_section(core: &mut dyn EmulatorCore, section: &str) -> Result<SectionHandle, FrontendError> {
    core.open_section(section)
        .map_err(|source| FrontendError::ConfigOpen {
            section: section.to_string(),
            source,
        })
}

/// The two configuration sections the front-end works with
#[derive(Debug, Clone)]
pub struct ConfigGateway {
    core_section: SectionHandle,
    ui_section: SectionHandle,
}

impl ConfigGateway {
    /// Open the `Core` and `UI-Console` sections and seed the front-end defaults
    pub fn open(core: &mut dyn EmulatorCore) -> Result<Self, FrontendError> {
        let core_section = open_section(core, CORE_SECTION)?;
        let ui_section = open_section(core, UI_SECTION)?;

        let gateway = Self {
            core_section,
            ui_section,
        };
        gateway.seed_defaults(core);
        Ok(gateway)
    }

    fn seed_defaults(&self, core: &mut dyn EmulatorCore) {
        let mut defaults = vec![(
            ui_keys::PLUGIN_DIR,
            ConfigValue::from(DEFAULT_PLUGIN_DIR),
            "Directory in which to search for plugins",
        )];
        for role in PluginRole::ALL {
            defaults.push((
                role.config_key(),
                ConfigValue::from(role.default_filename()),
                role.config_help(),
            ));
        }

        for (key, value, help) in defaults {
            if let Err(e) = core.set_default(&self.ui_section, key, &value, help) {
                warn!("Couldn't set default for {}/{}: {}", UI_SECTION, key, e);
            }
        }
    }

    /// Write command-line overrides into the `Core` section, in order
    pub fn apply_overrides(&self, core: &mut dyn EmulatorCore, overrides: &[CoreOverride]) {
        for o in overrides {
            let (key, value) = o.parameter();
            debug!("Setting {}/{} = {:?}", CORE_SECTION, key, value);
            if let Err(e) = core.set_parameter(&self.core_section, key, &value) {
                warn!("Couldn't set {}/{}: {}", CORE_SECTION, key, e);
            }
        }
    }

    /// Store the plugin choices from the command line and save the configuration
    ///
    /// A value the core refuses is logged and skipped; the remaining values are
    /// still stored and the configuration is always saved.
    pub fn save_options(
        &self,
        core: &mut dyn EmulatorCore,
        plugins: &PluginOverrides,
    ) -> Result<(), CoreError> {
        let mut values = Vec::new();
        if let Some(dir) = &plugins.plugin_dir {
            values.push((ui_keys::PLUGIN_DIR, ConfigValue::from(dir.as_str())));
        }
        for role in PluginRole::ALL {
            if let Some(spec) = plugins.get(role) {
                values.push((role.config_key(), ConfigValue::from(spec)));
            }
        }

        for (key, value) in values {
            if let Err(e) = core.set_parameter(&self.ui_section, key, &value) {
                warn!("Couldn't store {}/{}: {}", UI_SECTION, key, e);
            }
        }
        core.save_config()
    }

    /// Directory screenshots are written to: the configured `ScreenshotPath`,
    /// or the current directory when it is unset
    pub fn screenshot_dir(&self, core: &dyn EmulatorCore) -> PathBuf {
        match core.get_parameter(&self.core_section, core_keys::SCREENSHOT_PATH, ConfigKind::String) {
            Ok(ConfigValue::String(dir)) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from("."),
        }
    }

    /// Resolve the plugin directory and per-role targets
    pub fn plugin_settings(
        &self,
        core: &dyn EmulatorCore,
        overrides: &PluginOverrides,
    ) -> PluginSettings {
        PluginSettings::resolve(overrides, |key| {
            match core.get_parameter(&self.ui_section, key, ConfigKind::String) {
                Ok(ConfigValue::String(value)) => Some(value),
                Ok(other) => {
                    warn!("{}/{} is not a string: {:?}", UI_SECTION, key, other);
                    None
                }
                Err(e) => {
                    debug!("No {}/{} configured: {}", UI_SECTION, key, e);
                    None
                }
            }
        })
    }
}
