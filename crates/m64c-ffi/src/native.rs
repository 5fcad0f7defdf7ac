//! Native emulator core binding
//!
//! Loads the core library, binds its exported function table and exposes it
//! through [`EmulatorCore`].

use crate::callbacks::{clear_frame_hook, debug_callback, install_frame_hook};
use crate::dynlib::DynamicLibrary;
use crate::types::*;
use m64c_core::{
    ConfigKind, ConfigValue, CoreCommand, CoreError, CoreLoader, EmulatorCore, FrameCallback,
    LibHandle, LoadError, PluginRole, Result, SectionHandle,
};
use std::ffi::{c_char, c_float, c_int, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Filename of the core library when no explicit path is given
#[cfg(target_os = "macos")]
pub const DEFAULT_CORE_FILENAME: &str = "libmupen64plus.dylib";
#[cfg(windows)]
pub const DEFAULT_CORE_FILENAME: &str = "mupen64plus.dll";
#[cfg(not(any(target_os = "macos", windows)))]
pub const DEFAULT_CORE_FILENAME: &str = "libmupen64plus.so.2";

/// Largest string parameter read back from the configuration
const MAX_STRING_PARAM: usize = 4096;

/// Function table exported by the core library
struct CoreApi {
    startup: CoreStartupFn,
    shutdown: CoreShutdownFn,
    attach_plugin: CoreAttachPluginFn,
    detach_plugin: CoreDetachPluginFn,
    do_command: CoreDoCommandFn,
    config_open_section: ConfigOpenSectionFn,
    config_set_parameter: ConfigSetParameterFn,
    config_get_parameter: ConfigGetParameterFn,
    config_set_default_int: ConfigSetDefaultIntFn,
    config_set_default_float: ConfigSetDefaultFloatFn,
    config_set_default_bool: ConfigSetDefaultBoolFn,
    config_set_default_string: ConfigSetDefaultStringFn,
    config_save_file: ConfigSaveFileFn,
}

impl CoreApi {
    fn bind(library: &DynamicLibrary) -> std::result::Result<Self, LoadError> {
        unsafe {
            Ok(Self {
                startup: library.symbol("CoreStartup")?,
                shutdown: library.symbol("CoreShutdown")?,
                attach_plugin: library.symbol("CoreAttachPlugin")?,
                detach_plugin: library.symbol("CoreDetachPlugin")?,
                do_command: library.symbol("CoreDoCommand")?,
                config_open_section: library.symbol("ConfigOpenSection")?,
                config_set_parameter: library.symbol("ConfigSetParameter")?,
                config_get_parameter: library.symbol("ConfigGetParameter")?,
                config_set_default_int: library.symbol("ConfigSetDefaultInt")?,
                config_set_default_float: library.symbol("ConfigSetDefaultFloat")?,
                config_set_default_bool: library.symbol("ConfigSetDefaultBool")?,
                config_set_default_string: library.symbol("ConfigSetDefaultString")?,
                config_save_file: library.symbol("ConfigSaveFile")?,
            })
        }
    }
}

/// The loaded core library
///
/// Dropping it shuts the core down if it is still running, then releases
/// the library.
pub struct NativeCore {
    api: CoreApi,
    started: bool,
    library: DynamicLibrary,
}

impl NativeCore {
    /// Load the core from `path`, or search the default locations
    pub fn attach(path: Option<&Path>) -> std::result::Result<Self, LoadError> {
        let library = match path {
            Some(path) => DynamicLibrary::open(path)?,
            None => Self::open_default()?,
        };

        let version = library.version_info()?;
        if version.plugin_type != PLUGIN_TYPE_CORE {
            return Err(LoadError::WrongType {
                library: library.path().display().to_string(),
                expected: "core".to_string(),
            });
        }

        let api = CoreApi::bind(&library)?;
        info!(
            "Found core library '{}' version {}.{}.{} (API 0x{:x})",
            version.name.as_deref().unwrap_or("unknown"),
            (version.version >> 16) & 0xffff,
            (version.version >> 8) & 0xff,
            version.version & 0xff,
            version.api_version
        );

        Ok(Self {
            api,
            started: false,
            library,
        })
    }

    fn open_default() -> std::result::Result<DynamicLibrary, LoadError> {
        let candidates = [
            PathBuf::from(".").join(DEFAULT_CORE_FILENAME),
            PathBuf::from(DEFAULT_CORE_FILENAME),
        ];
        for candidate in &candidates {
            match DynamicLibrary::open(candidate) {
                Ok(library) => return Ok(library),
                Err(e) => debug!("Core not found at {}: {}", candidate.display(), e),
            }
        }
        Err(LoadError::NotFound(DEFAULT_CORE_FILENAME.to_string()))
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| CoreError::InputInvalid)
}

/// Path bytes exactly as the OS gave them, so non-UTF-8 directories survive
#[cfg(unix)]
fn path_c_string(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes()).map_err(|_| CoreError::InputInvalid)
}

#[cfg(not(unix))]
fn path_c_string(path: &Path) -> Result<CString> {
    let path = path.to_str().ok_or(CoreError::InputInvalid)?;
    c_string(path)
}

fn section_ptr(section: &SectionHandle) -> M64Handle {
    section.raw() as M64Handle
}

impl EmulatorCore for NativeCore {
    fn startup(&mut self, api_version: i32, config_dir: Option<&Path>) -> Result<()> {
        let config_dir = config_dir
            .map(path_c_string)
            .transpose()?;
        let config_ptr = config_dir.as_ref().map_or(std::ptr::null(), |dir| dir.as_ptr());

        let rval = unsafe {
            (self.api.startup)(
                api_version,
                config_ptr,
                c"Core".as_ptr() as *mut c_void,
                Some(debug_callback),
                std::ptr::null_mut(),
                None,
            )
        };
        CoreError::check(rval)?;
        self.started = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        clear_frame_hook();
        CoreError::check(unsafe { (self.api.shutdown)() })
    }

    fn library_handle(&self) -> LibHandle {
        self.library.handle()
    }

    fn open_section(&mut self, name: &str) -> Result<SectionHandle> {
        let c_name = c_string(name)?;
        let mut handle: M64Handle = std::ptr::null_mut();
        CoreError::check(unsafe { (self.api.config_open_section)(c_name.as_ptr(), &mut handle) })?;
        Ok(SectionHandle::new(name, handle as usize))
    }

    fn set_default(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ConfigValue,
        help: &str,
    ) -> Result<()> {
        let c_key = c_string(key)?;
        let c_help = c_string(help)?;
        let handle = section_ptr(section);
        let rval = unsafe {
            match value {
                ConfigValue::Int(v) => {
                    (self.api.config_set_default_int)(handle, c_key.as_ptr(), *v, c_help.as_ptr())
                }
                ConfigValue::Float(v) => (self.api.config_set_default_float)(
                    handle,
                    c_key.as_ptr(),
                    *v as c_float,
                    c_help.as_ptr(),
                ),
                ConfigValue::Bool(v) => (self.api.config_set_default_bool)(
                    handle,
                    c_key.as_ptr(),
                    *v as c_int,
                    c_help.as_ptr(),
                ),
                ConfigValue::String(v) => {
                    let c_value = c_string(v)?;
                    (self.api.config_set_default_string)(
                        handle,
                        c_key.as_ptr(),
                        c_value.as_ptr(),
                        c_help.as_ptr(),
                    )
                }
            }
        };
        CoreError::check(rval)
    }

    fn set_parameter(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ConfigValue,
    ) -> Result<()> {
        let c_key = c_string(key)?;
        let handle = section_ptr(section);
        let kind = value.kind() as c_int;
        let set = self.api.config_set_parameter;
        let rval = unsafe {
            match value {
                ConfigValue::Int(v) => {
                    let v: c_int = *v;
                    set(handle, c_key.as_ptr(), kind, &v as *const c_int as *const c_void)
                }
                ConfigValue::Float(v) => {
                    let v: c_float = *v;
                    set(handle, c_key.as_ptr(), kind, &v as *const c_float as *const c_void)
                }
                ConfigValue::Bool(v) => {
                    let v = *v as c_int;
                    set(handle, c_key.as_ptr(), kind, &v as *const c_int as *const c_void)
                }
                ConfigValue::String(v) => {
                    let c_value = c_string(v)?;
                    set(handle, c_key.as_ptr(), kind, c_value.as_ptr() as *const c_void)
                }
            }
        };
        CoreError::check(rval)
    }

    fn get_parameter(
        &self,
        section: &SectionHandle,
        key: &str,
        kind: ConfigKind,
    ) -> Result<ConfigValue> {
        let c_key = c_string(key)?;
        let handle = section_ptr(section);
        let get = self.api.config_get_parameter;
        unsafe {
            match kind {
                ConfigKind::Int | ConfigKind::Bool => {
                    let mut v: c_int = 0;
                    CoreError::check(get(
                        handle,
                        c_key.as_ptr(),
                        kind as c_int,
                        &mut v as *mut c_int as *mut c_void,
                        std::mem::size_of::<c_int>() as c_int,
                    ))?;
                    Ok(if kind == ConfigKind::Bool {
                        ConfigValue::Bool(v != 0)
                    } else {
                        ConfigValue::Int(v)
                    })
                }
                ConfigKind::Float => {
                    let mut v: c_float = 0.0;
                    CoreError::check(get(
                        handle,
                        c_key.as_ptr(),
                        kind as c_int,
                        &mut v as *mut c_float as *mut c_void,
                        std::mem::size_of::<c_float>() as c_int,
                    ))?;
                    Ok(ConfigValue::Float(v))
                }
                ConfigKind::String => {
                    let mut buf = vec![0 as c_char; MAX_STRING_PARAM];
                    CoreError::check(get(
                        handle,
                        c_key.as_ptr(),
                        kind as c_int,
                        buf.as_mut_ptr() as *mut c_void,
                        MAX_STRING_PARAM as c_int,
                    ))?;
                    // Guarantee termination even if the core filled the buffer
                    buf[MAX_STRING_PARAM - 1] = 0;
                    let value = CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned();
                    Ok(ConfigValue::String(value))
                }
            }
        }
    }

    fn save_config(&mut self) -> Result<()> {
        CoreError::check(unsafe { (self.api.config_save_file)() })
    }

    fn attach_plugin(&mut self, role: PluginRole, handle: LibHandle) -> Result<()> {
        CoreError::check(unsafe { (self.api.attach_plugin)(role.type_code(), handle.as_ptr()) })
    }

    fn detach_plugin(&mut self, role: PluginRole) -> Result<()> {
        CoreError::check(unsafe { (self.api.detach_plugin)(role.type_code()) })
    }

    fn do_command(&mut self, command: CoreCommand<'_>) -> Result<()> {
        let (param_int, param_ptr) = match command {
            CoreCommand::RomOpen(rom) => (
                c_int::try_from(rom.len()).map_err(|_| CoreError::InputInvalid)?,
                rom.as_ptr() as *mut c_void,
            ),
            _ => (0, std::ptr::null_mut()),
        };
        CoreError::check(unsafe { (self.api.do_command)(command.code(), param_int, param_ptr) })
    }

    fn set_frame_callback(&mut self, callback: FrameCallback) -> Result<()> {
        install_frame_hook(callback, self.api.do_command)
    }
}

impl Drop for NativeCore {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Core shutdown failed: {}", e);
        }
        clear_frame_hook();
    }
}

/// [`CoreLoader`] for native core libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCoreLoader;

impl CoreLoader for NativeCoreLoader {
    fn attach_core(
        &self,
        path: Option<&Path>,
    ) -> std::result::Result<Box<dyn EmulatorCore>, LoadError> {
        Ok(Box::new(NativeCore::attach(path)?))
    }
}
