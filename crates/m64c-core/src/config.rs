//! Configuration sections and typed parameter values
//!
//! The configuration store lives inside the emulator core and is only
//! reachable through [`EmulatorCore`](crate::EmulatorCore).

/// Section owned by the emulator core
pub const CORE_SECTION: &str = "Core";

/// Section owned by this front-end
pub const UI_SECTION: &str = "UI-Console";

/// Keys of the `Core` section the command line can override
pub mod core_keys {
    pub const ON_SCREEN_DISPLAY: &str = "OnScreenDisplay";
    pub const FULLSCREEN: &str = "Fullscreen";
    pub const SCREENSHOT_PATH: &str = "ScreenshotPath";
    pub const R4300_EMULATOR: &str = "R4300Emulator";
}

/// Keys of the `UI-Console` section besides the per-role plugin keys
pub mod ui_keys {
    pub const PLUGIN_DIR: &str = "PluginDir";
}

/// A typed configuration parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl ConfigValue {
    pub fn kind(&self) -> ConfigKind {
        match self {
            Self::Int(_) => ConfigKind::Int,
            Self::Float(_) => ConfigKind::Float,
            Self::Bool(_) => ConfigKind::Bool,
            Self::String(_) => ConfigKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Parameter type, as encoded by `m64p_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Int = 1,
    Float = 2,
    Bool = 3,
    String = 4,
}

/// Handle to an opened configuration section
///
/// `raw` is whatever the owning store uses to find the section again: the
/// core's `m64p_handle` address, or an index for in-process stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHandle {
    name: String,
    raw: usize,
}

impl SectionHandle {
    pub fn new(name: impl Into<String>, raw: usize) -> Self {
        Self {
            name: name.into(),
            raw,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> usize {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(ConfigValue::from(true).kind(), ConfigKind::Bool);
        assert_eq!(ConfigValue::from(1).kind(), ConfigKind::Int);
        assert_eq!(ConfigValue::Float(0.5).kind(), ConfigKind::Float);
        assert_eq!(ConfigValue::from("x").kind(), ConfigKind::String);
        assert_eq!(ConfigKind::String as i32, 4);
    }
}
