//! The capability interface the front-end drives the emulator core through

use crate::config::{ConfigKind, ConfigValue, SectionHandle};
use crate::error::{LoadError, Result};
use crate::plugin::{LibHandle, PluginRole};
use std::path::Path;

/// Front-end API version announced to the core at startup
pub const FRONTEND_API_VERSION: i32 = 0x0001_0000;

/// Commands the front-end issues through the core's command dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand<'a> {
    /// Hand the core a complete ROM image
    RomOpen(&'a [u8]),
    /// Run the opened ROM; blocks until the session ends
    Execute,
    /// Release the opened ROM
    RomClose,
    /// Ask a running session to end at its next opportunity
    Stop,
}

impl CoreCommand<'_> {
    /// `m64p_command` value for this command
    pub fn code(&self) -> i32 {
        match self {
            Self::RomOpen(_) => 1,
            Self::RomClose => 2,
            Self::Execute => 5,
            Self::Stop => 6,
        }
    }
}

/// One frame produced by the video plugin
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub pixels: &'a [u8],
    pub bits_per_pixel: u32,
    pub width: u32,
    pub height: u32,
}

/// What the core should do after a frame observer returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Continue,
    /// Issue a stop command; the core honours it at its own next check point
    Stop,
}

/// Per-frame observer installed with [`EmulatorCore::set_frame_callback`]
///
/// May run on the core's emulation thread, so it must not block.
pub type FrameCallback = Box<dyn FnMut(&Frame<'_>) -> FrameAction + Send>;

/// A loaded emulator core
///
/// The native implementation binds these to the function table exported by
/// the core library; tests substitute an in-process double.
pub trait EmulatorCore {
    /// Start the core runtime and load its configuration from `config_dir`
    fn startup(&mut self, api_version: i32, config_dir: Option<&Path>) -> Result<()>;

    /// Stop the core runtime. The library stays loaded until the core is dropped.
    fn shutdown(&mut self) -> Result<()>;

    /// Handle of the core library itself, given to plugins at startup
    fn library_handle(&self) -> LibHandle;

    fn open_section(&mut self, name: &str) -> Result<SectionHandle>;

    fn set_default(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ConfigValue,
        help: &str,
    ) -> Result<()>;

    fn set_parameter(&mut self, section: &SectionHandle, key: &str, value: &ConfigValue)
        -> Result<()>;

    fn get_parameter(
        &self,
        section: &SectionHandle,
        key: &str,
        kind: ConfigKind,
    ) -> Result<ConfigValue>;

    /// Persist the whole configuration store
    fn save_config(&mut self) -> Result<()>;

    /// Attach a plugin; a null handle selects the core's dummy for `role`
    fn attach_plugin(&mut self, role: PluginRole, handle: LibHandle) -> Result<()>;

    fn detach_plugin(&mut self, role: PluginRole) -> Result<()>;

    fn do_command(&mut self, command: CoreCommand<'_>) -> Result<()>;

    /// Install the per-frame observer, replacing any previous one
    fn set_frame_callback(&mut self, callback: FrameCallback) -> Result<()>;
}

/// Locates and loads a core library
pub trait CoreLoader {
    /// Load the core from `path`, or from the platform default locations
    fn attach_core(&self, path: Option<&Path>) -> std::result::Result<Box<dyn EmulatorCore>, LoadError>;
}
