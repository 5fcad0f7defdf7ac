//! Native bindings to the emulator core and its plugins
//!
//! Everything that crosses the C boundary lives here: dynamic loading, the
//! core's exported function table, plugin startup/shutdown and the callbacks
//! the core calls back into.

pub mod callbacks;
pub mod dynlib;
pub mod native;
pub mod plugin;
pub mod types;

pub use native::{NativeCore, NativeCoreLoader, DEFAULT_CORE_FILENAME};
pub use dynlib::DynamicLibrary;
pub use plugin::{NativePlugin, NativePluginLoader};
