//! Plugin roles and the seams the plugin manager loads through

use crate::error::LoadError;
use std::ffi::c_void;
use std::fmt;
use std::path::Path;

/// Identifier the user passes instead of a plugin name to select the no-op implementation
pub const DUMMY_PLUGIN: &str = "dummy";

/// One of the four plugin slots the core needs filled before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginRole {
    Video,
    Audio,
    Input,
    Rsp,
}

impl PluginRole {
    /// All roles, in the order they are attached to and detached from the core
    pub const ALL: [PluginRole; 4] = [Self::Video, Self::Audio, Self::Input, Self::Rsp];

    /// `m64p_plugin_type` value for this role
    pub fn type_code(self) -> i32 {
        match self {
            Self::Rsp => 1,
            Self::Video => 2,
            Self::Audio => 3,
            Self::Input => 4,
        }
    }

    /// Inverse of [`PluginRole::type_code`]
    pub fn from_type_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Rsp),
            2 => Some(Self::Video),
            3 => Some(Self::Audio),
            4 => Some(Self::Input),
            _ => None,
        }
    }

    /// Front-end configuration key holding this role's plugin filename
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Video => "VideoPlugin",
            Self::Audio => "AudioPlugin",
            Self::Input => "InputPlugin",
            Self::Rsp => "RspPlugin",
        }
    }

    /// Built-in plugin filename used when neither the command line nor the
    /// configuration names one
    pub fn default_filename(self) -> String {
        let stem = match self {
            Self::Video => "m64p_video_rice",
            Self::Audio => "m64p_audio_jttl",
            Self::Input => "m64p_input_blight",
            Self::Rsp => "m64p_rsp_hle",
        };
        format!("{}{}", stem, std::env::consts::DLL_SUFFIX)
    }

    /// Help text stored alongside the configuration default
    pub fn config_help(self) -> &'static str {
        match self {
            Self::Video => "Filename of video plugin",
            Self::Audio => "Filename of audio plugin",
            Self::Input => "Filename of input plugin",
            Self::Rsp => "Filename of RSP plugin",
        }
    }
}

impl fmt::Display for PluginRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "Video"),
            Self::Audio => write!(f, "Audio"),
            Self::Input => write!(f, "Input"),
            Self::Rsp => write!(f, "RSP"),
        }
    }
}

/// Raw handle of a loaded dynamic library, as handed across the core's C interface
///
/// A null handle tells the core to use its built-in dummy for a plugin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibHandle(*mut c_void);

impl LibHandle {
    pub const NULL: LibHandle = LibHandle(std::ptr::null_mut());

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for LibHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// A plugin library that has been loaded and started
///
/// Dropping the library shuts the plugin down and releases it.
pub trait PluginLibrary {
    /// Handle passed to the core when attaching
    fn handle(&self) -> LibHandle;

    /// Name the plugin reports for itself
    fn name(&self) -> &str;

    /// File the plugin was loaded from
    fn path(&self) -> &Path;
}

/// Loads plugin libraries from disk
pub trait PluginLoader {
    /// Load the library at `path`, verify it implements `role` and start it
    /// against the loaded core library `core`
    fn load(
        &self,
        role: PluginRole,
        path: &Path,
        core: LibHandle,
    ) -> Result<Box<dyn PluginLibrary>, LoadError>;
}
