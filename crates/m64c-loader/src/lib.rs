//! Plugin search and loading for m64-console

pub mod manager;
pub mod search;

// Re-export main types
pub use manager::{PluginManager, PluginSlot};
pub use search::{PluginOverrides, PluginSettings, PluginTarget, DEFAULT_PLUGIN_DIR};
