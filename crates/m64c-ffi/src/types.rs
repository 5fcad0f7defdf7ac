//! C types of the core and plugin library interface

use std::ffi::{c_char, c_float, c_int, c_uchar, c_void};

/// `m64p_error`
pub type M64Error = c_int;

/// `m64p_handle` / `m64p_dynlib_handle`
pub type M64Handle = *mut c_void;

/// `m64p_plugin_type` reported by core libraries
pub const PLUGIN_TYPE_CORE: c_int = 5;

/// `M64CMD_*` value the frame callback is registered with
pub const CMD_SET_FRAME_CALLBACK: c_int = 15;

pub type DebugCallbackFn = unsafe extern "C" fn(context: *mut c_void, message: *const c_char);
pub type StateCallbackFn = unsafe extern "C" fn(context: *mut c_void, param: c_int, value: c_int);
pub type FrameCallbackFn =
    unsafe extern "C" fn(pixels: *mut c_uchar, bits_per_pixel: c_int, width: c_int, height: c_int);

// Core entry points
pub type CoreStartupFn = unsafe extern "C" fn(
    api_version: c_int,
    config_path: *const c_char,
    context: *mut c_void,
    debug_callback: Option<DebugCallbackFn>,
    context2: *mut c_void,
    state_callback: Option<StateCallbackFn>,
) -> M64Error;
pub type CoreShutdownFn = unsafe extern "C" fn() -> M64Error;
pub type CoreAttachPluginFn = unsafe extern "C" fn(plugin_type: c_int, handle: M64Handle) -> M64Error;
pub type CoreDetachPluginFn = unsafe extern "C" fn(plugin_type: c_int) -> M64Error;
pub type CoreDoCommandFn =
    unsafe extern "C" fn(command: c_int, param_int: c_int, param_ptr: *mut c_void) -> M64Error;

// Configuration entry points
pub type ConfigOpenSectionFn =
    unsafe extern "C" fn(section_name: *const c_char, handle: *mut M64Handle) -> M64Error;
pub type ConfigSetParameterFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    param_type: c_int,
    param_value: *const c_void,
) -> M64Error;
pub type ConfigGetParameterFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    param_type: c_int,
    param_value: *mut c_void,
    max_size: c_int,
) -> M64Error;
pub type ConfigSetDefaultIntFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    value: c_int,
    help: *const c_char,
) -> M64Error;
pub type ConfigSetDefaultFloatFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    value: c_float,
    help: *const c_char,
) -> M64Error;
pub type ConfigSetDefaultBoolFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    value: c_int,
    help: *const c_char,
) -> M64Error;
pub type ConfigSetDefaultStringFn = unsafe extern "C" fn(
    handle: M64Handle,
    param_name: *const c_char,
    value: *const c_char,
    help: *const c_char,
) -> M64Error;
pub type ConfigSaveFileFn = unsafe extern "C" fn() -> M64Error;

// Entry points shared by the core and every plugin
pub type PluginGetVersionFn = unsafe extern "C" fn(
    plugin_type: *mut c_int,
    plugin_version: *mut c_int,
    api_version: *mut c_int,
    plugin_name: *mut *const c_char,
    capabilities: *mut c_int,
) -> M64Error;
pub type PluginStartupFn = unsafe extern "C" fn(
    core_handle: M64Handle,
    context: *mut c_void,
    debug_callback: Option<DebugCallbackFn>,
) -> M64Error;
pub type PluginShutdownFn = unsafe extern "C" fn() -> M64Error;

/// Version information a library reports through `PluginGetVersion`
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub plugin_type: c_int,
    pub version: c_int,
    pub api_version: c_int,
    pub name: Option<String>,
}
