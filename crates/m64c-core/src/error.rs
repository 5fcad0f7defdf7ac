//! Error types for the m64-console front-end

use crate::plugin::PluginRole;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes reported by the emulator core through its C interface
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("function is disallowed before the core is initialized")]
    NotInit,

    #[error("initialize function called twice")]
    AlreadyInit,

    #[error("API versions between components are incompatible")]
    Incompatible,

    #[error("invalid parameters for function call")]
    InputAssert,

    #[error("invalid input data")]
    InputInvalid,

    #[error("the input parameter(s) specified a particular item which was not found")]
    InputNotFound,

    #[error("memory allocation failed")]
    NoMemory,

    #[error("error opening, creating, reading, or writing to a file")]
    Files,

    #[error("internal error")]
    Internal,

    #[error("current program state does not allow operation")]
    InvalidState,

    #[error("a plugin function returned a fatal error")]
    PluginFail,

    #[error("a system function call failed")]
    SystemFail,

    #[error("function call is not supported")]
    Unsupported,

    #[error("given config parameter type does not match actual type")]
    WrongType,

    #[error("unknown core error code {0}")]
    Unknown(i32),
}

impl CoreError {
    /// Map a raw `m64p_error` value to a result. Zero is success.
    pub fn check(code: i32) -> Result<()> {
        let err = match code {
            0 => return Ok(()),
            1 => Self::NotInit,
            2 => Self::AlreadyInit,
            3 => Self::Incompatible,
            4 => Self::InputAssert,
            5 => Self::InputInvalid,
            6 => Self::InputNotFound,
            7 => Self::NoMemory,
            8 => Self::Files,
            9 => Self::Internal,
            10 => Self::InvalidState,
            11 => Self::PluginFail,
            12 => Self::SystemFail,
            13 => Self::Unsupported,
            14 => Self::WrongType,
            other => Self::Unknown(other),
        };
        Err(err)
    }
}

/// Dynamic library loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("couldn't load library '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("couldn't find a library named '{0}' in the default search locations")]
    NotFound(String),

    #[error("library '{library}' is missing required symbol '{symbol}'")]
    MissingSymbol { library: String, symbol: String },

    #[error("library '{library}' is not a valid {expected} library")]
    WrongType { library: String, expected: String },

    #[error("startup of '{library}' failed: {source}")]
    Startup {
        library: String,
        #[source]
        source: CoreError,
    },

    #[error("dynamic library loading is not supported on this platform")]
    Unsupported,
}

/// Plugin search and load errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("{role} plugin '{target}' not found in '{}'", dir.display())]
    NotFound {
        role: PluginRole,
        target: String,
        dir: PathBuf,
    },

    #[error("failed to load {role} plugin: {source}")]
    Load {
        role: PluginRole,
        #[source]
        source: LoadError,
    },

    #[error("couldn't read plugin directory '{}': {source}", dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error from core while attaching {role} plugin: {source}")]
    Attach {
        role: PluginRole,
        #[source]
        source: CoreError,
    },
}

/// ROM image loading errors
#[derive(Error, Debug)]
pub enum RomError {
    #[error("couldn't open ROM file '{}' for reading: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't allocate {size}-byte buffer for ROM image file '{}'", path.display())]
    Allocation { path: PathBuf, size: u64 },

    #[error("couldn't read {size} bytes from ROM image file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        size: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM image file '{}' is empty", path.display())]
    Empty { path: PathBuf },
}

/// Fatal front-end errors; each maps to a distinct process exit status
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("couldn't load core library: {0}")]
    CoreLoad(#[from] LoadError),

    #[error("error starting core library: {0}")]
    CoreStartup(#[source] CoreError),

    #[error("failed to open '{section}' configuration section: {source}")]
    ConfigOpen {
        section: String,
        #[source]
        source: CoreError,
    },

    #[error("no ROM filepath given")]
    MissingRom,

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl FrontendError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CoreLoad(_) | Self::MissingRom => 2,
            Self::CoreStartup(_) => 3,
            Self::ConfigOpen { .. } => 4,
            Self::Plugin(PluginError::Attach { .. }) => 6,
            Self::Plugin(_) => 5,
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
