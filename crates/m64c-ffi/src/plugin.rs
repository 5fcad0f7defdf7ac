//! Native plugin libraries

use crate::callbacks::debug_callback;
use crate::dynlib::DynamicLibrary;
use crate::types::{PluginShutdownFn, PluginStartupFn};
use m64c_core::{CoreError, LibHandle, LoadError, PluginLibrary, PluginLoader, PluginRole};
use std::ffi::{c_void, CStr};
use std::path::Path;
use tracing::{info, warn};

/// Context string the plugin's debug messages are tagged with
fn debug_context(role: PluginRole) -> &'static CStr {
    match role {
        PluginRole::Video => c"Video",
        PluginRole::Audio => c"Audio",
        PluginRole::Input => c"Input",
        PluginRole::Rsp => c"RSP",
    }
}

/// A started plugin library; shut down and released on drop
pub struct NativePlugin {
    role: PluginRole,
    name: String,
    shutdown: PluginShutdownFn,
    library: DynamicLibrary,
}

impl NativePlugin {
    /// Load the plugin at `path`, check that it implements `role` and start it
    pub fn load(role: PluginRole, path: &Path, core: LibHandle) -> Result<Self, LoadError> {
        let library = DynamicLibrary::open(path)?;
        let version = library.version_info()?;

        if PluginRole::from_type_code(version.plugin_type) != Some(role) {
            return Err(LoadError::WrongType {
                library: path.display().to_string(),
                expected: format!("{} plugin", role),
            });
        }

        let startup: PluginStartupFn = unsafe { library.symbol("PluginStartup")? };
        let shutdown: PluginShutdownFn = unsafe { library.symbol("PluginShutdown")? };

        let rval = unsafe {
            startup(
                core.as_ptr(),
                debug_context(role).as_ptr() as *mut c_void,
                Some(debug_callback),
            )
        };
        CoreError::check(rval).map_err(|source| LoadError::Startup {
            library: path.display().to_string(),
            source,
        })?;

        let name = version.name.unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });
        info!("Using {} plugin: '{}' v{}", role, name, version.version);

        Ok(Self {
            role,
            name,
            shutdown,
            library,
        })
    }
}

impl PluginLibrary for NativePlugin {
    fn handle(&self) -> LibHandle {
        self.library.handle()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        self.library.path()
    }
}

impl Drop for NativePlugin {
    fn drop(&mut self) {
        if let Err(e) = CoreError::check(unsafe { (self.shutdown)() }) {
            warn!("{} plugin '{}' shutdown failed: {}", self.role, self.name, e);
        }
    }
}

/// [`PluginLoader`] for native plugin libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePluginLoader;

impl PluginLoader for NativePluginLoader {
    fn load(
        &self,
        role: PluginRole,
        path: &Path,
        core: LibHandle,
    ) -> Result<Box<dyn PluginLibrary>, LoadError> {
        Ok(Box::new(NativePlugin::load(role, path, core)?))
    }
}
