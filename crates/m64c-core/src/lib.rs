//! Core types for the m64-console front-end
//!
//! This crate provides the error types, configuration model, plugin roles
//! and the capability trait the rest of the front-end uses to drive a
//! dynamically loaded emulator core.

pub mod config;
pub mod emulator;
pub mod error;
pub mod plugin;

pub use config::{ConfigKind, ConfigValue, SectionHandle, CORE_SECTION, UI_SECTION};
pub use emulator::{
    CoreCommand, CoreLoader, EmulatorCore, Frame, FrameAction, FrameCallback,
    FRONTEND_API_VERSION,
};
pub use error::{CoreError, FrontendError, LoadError, PluginError, Result, RomError};
pub use plugin::{LibHandle, PluginLibrary, PluginLoader, PluginRole, DUMMY_PLUGIN};
