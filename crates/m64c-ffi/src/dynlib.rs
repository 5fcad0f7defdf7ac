//! Dynamic library loading
//!
//! Thin owner of a `dlopen` handle. Symbols are resolved as typed function
//! pointers and the handle is closed when the library is dropped.

use crate::types::{PluginGetVersionFn, VersionInfo};
use m64c_core::{CoreError, LibHandle, LoadError};
use std::ffi::{c_void, CStr, CString};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A loaded shared library
pub struct DynamicLibrary {
    handle: *mut c_void,
    path: PathBuf,
}

impl DynamicLibrary {
    /// Load the library at `path`
    ///
    /// A bare filename is looked up through the system loader's search path.
    #[cfg(unix)]
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| LoadError::Open {
            path: path.display().to_string(),
            reason: "path contains a NUL byte".to_string(),
        })?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(LoadError::Open {
                path: path.display().to_string(),
                reason: last_error(),
            });
        }

        debug!("Loaded library {}", path.display());
        Ok(Self {
            handle,
            path: path.to_path_buf(),
        })
    }

    #[cfg(not(unix))]
    pub fn open(_path: &Path) -> Result<Self, LoadError> {
        Err(LoadError::Unsupported)
    }

    /// Resolve `name` as a value of type `T`
    ///
    /// # Safety
    /// `T` must be a function pointer type matching the exported symbol's
    /// actual signature.
    pub unsafe fn symbol<T: Copy>(&self, name: &str) -> Result<T, LoadError> {
        assert_eq!(std::mem::size_of::<T>(), std::mem::size_of::<*mut c_void>());

        let missing = || LoadError::MissingSymbol {
            library: self.path.display().to_string(),
            symbol: name.to_string(),
        };
        let c_name = CString::new(name).map_err(|_| missing())?;
        let ptr = raw_symbol(self.handle, &c_name);
        if ptr.is_null() {
            return Err(missing());
        }

        trace!("Resolved {} in {}", name, self.path.display());
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&ptr))
    }

    /// Ask the library to identify itself through `PluginGetVersion`
    pub fn version_info(&self) -> Result<VersionInfo, LoadError> {
        let get_version: PluginGetVersionFn = unsafe { self.symbol("PluginGetVersion")? };

        let mut plugin_type = 0;
        let mut version = 0;
        let mut api_version = 0;
        let mut name_ptr = std::ptr::null();
        let rval = unsafe {
            get_version(
                &mut plugin_type,
                &mut version,
                &mut api_version,
                &mut name_ptr,
                std::ptr::null_mut(),
            )
        };
        CoreError::check(rval).map_err(|source| LoadError::Startup {
            library: self.path.display().to_string(),
            source,
        })?;

        let name = if name_ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(name_ptr) }.to_string_lossy().into_owned())
        };

        Ok(VersionInfo {
            plugin_type,
            version,
            api_version,
            name,
        })
    }

    pub fn handle(&self) -> LibHandle {
        LibHandle::from_ptr(self.handle)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        #[cfg(unix)]
        unsafe {
            libc::dlclose(self.handle);
        }
        debug!("Released library {}", self.path.display());
    }
}

#[cfg(unix)]
unsafe fn raw_symbol(handle: *mut c_void, name: &CStr) -> *mut c_void {
    libc::dlsym(handle, name.as_ptr())
}

#[cfg(not(unix))]
unsafe fn raw_symbol(_handle: *mut c_void, _name: &CStr) -> *mut c_void {
    std::ptr::null_mut()
}

#[cfg(unix)]
fn last_error() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown error".to_string()
    } else {
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}
