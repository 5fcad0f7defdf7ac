//! In-process core and plugin doubles for driving the front-end end to end

#![allow(dead_code)]

mod store;

pub use store::{ConfigStore, ConfigStoreError};

use m64c_core::{
    ConfigKind, ConfigValue, CoreCommand, CoreError, CoreLoader, EmulatorCore, Frame,
    FrameAction, FrameCallback, LibHandle, LoadError, PluginLibrary, PluginLoader, PluginRole,
    Result, SectionHandle,
};
use m64c_integration::CaptureSink;
use std::cell::RefCell;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const FRAME_WIDTH: u32 = 2;
pub const FRAME_HEIGHT: u32 = 2;

/// Observable state shared between a test and the doubles it hands out
#[derive(Default)]
pub struct FakeState {
    pub events: Vec<String>,
    pub config: ConfigStore,
    pub frame_callback: Option<FrameCallback>,
    pub attached: Vec<(PluginRole, LibHandle)>,
    pub rom_size: Option<usize>,
    /// Frames the core produces per `Execute`, unless stopped earlier
    pub frames_to_run: u32,
    pub frames_executed: u32,

    pub fail_load: bool,
    pub fail_startup: bool,
    pub fail_section: Option<String>,
    pub fail_attach: Option<PluginRole>,
    /// `set_parameter` refuses this key
    pub fail_set_key: Option<String>,
    pub reject_rom: bool,
}

pub type Shared = Rc<RefCell<FakeState>>;

pub fn shared() -> Shared {
    Rc::new(RefCell::new(FakeState::default()))
}

pub fn events(state: &Shared) -> Vec<String> {
    state.borrow().events.clone()
}

fn log(state: &Shared, event: impl Into<String>) {
    state.borrow_mut().events.push(event.into());
}

pub struct FakeCore {
    state: Shared,
}

impl FakeCore {
    fn execute(&mut self) {
        let (callback, frames) = {
            let mut state = self.state.borrow_mut();
            (state.frame_callback.take(), state.frames_to_run)
        };

        let pixels = vec![0x80u8; (FRAME_WIDTH * FRAME_HEIGHT * 3) as usize];
        let mut callback = callback;
        for _ in 0..frames {
            let action = match callback.as_mut() {
                Some(cb) => cb(&Frame {
                    pixels: &pixels,
                    bits_per_pixel: 24,
                    width: FRAME_WIDTH,
                    height: FRAME_HEIGHT,
                }),
                None => FrameAction::Continue,
            };
            self.state.borrow_mut().frames_executed += 1;
            if action == FrameAction::Stop {
                log(&self.state, "stop");
                break;
            }
        }

        self.state.borrow_mut().frame_callback = callback;
    }
}

impl EmulatorCore for FakeCore {
    fn startup(&mut self, _api_version: i32, config_dir: Option<&Path>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_startup {
            return Err(CoreError::Incompatible);
        }
        if let Some(dir) = config_dir {
            state.config = ConfigStore::load(dir).map_err(|_| CoreError::Files)?;
        }
        state.events.push("startup".to_string());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.frame_callback = None;
        state.events.push("shutdown".to_string());
        Ok(())
    }

    fn library_handle(&self) -> LibHandle {
        LibHandle::from_ptr(0x1000 as *mut c_void)
    }

    fn open_section(&mut self, name: &str) -> Result<SectionHandle> {
        let mut state = self.state.borrow_mut();
        if state.fail_section.as_deref() == Some(name) {
            return Err(CoreError::InputNotFound);
        }
        Ok(state.config.open_section(name))
    }

    fn set_default(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ConfigValue,
        help: &str,
    ) -> Result<()> {
        self.state
            .borrow_mut()
            .config
            .set_default(section, key, value.clone(), help)
            .map_err(|_| CoreError::InputInvalid)
    }

    fn set_parameter(&mut self, section: &SectionHandle, key: &str, value: &ConfigValue) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_set_key.as_deref() == Some(key) {
            return Err(CoreError::InputInvalid);
        }
        state
            .config
            .set(section, key, value.clone())
            .map_err(|_| CoreError::InputInvalid)
    }

    fn get_parameter(&self, section: &SectionHandle, key: &str, kind: ConfigKind) -> Result<ConfigValue> {
        let state = self.state.borrow();
        match state.config.get(section.name(), key) {
            Some(value) if value.kind() == kind => Ok(value.clone()),
            Some(_) => Err(CoreError::WrongType),
            None => Err(CoreError::InputNotFound),
        }
    }

    fn save_config(&mut self) -> Result<()> {
        log(&self.state, "save config");
        self.state.borrow().config.save().map_err(|_| CoreError::Files)
    }

    fn attach_plugin(&mut self, role: PluginRole, handle: LibHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.events.push(format!("attach {}", role));
        if state.fail_attach == Some(role) {
            return Err(CoreError::PluginFail);
        }
        state.attached.push((role, handle));
        Ok(())
    }

    fn detach_plugin(&mut self, role: PluginRole) -> Result<()> {
        log(&self.state, format!("detach {}", role));
        Ok(())
    }

    fn do_command(&mut self, command: CoreCommand<'_>) -> Result<()> {
        match command {
            CoreCommand::RomOpen(data) => {
                let mut state = self.state.borrow_mut();
                state.events.push("rom open".to_string());
                if state.reject_rom {
                    return Err(CoreError::InputInvalid);
                }
                state.rom_size = Some(data.len());
            }
            CoreCommand::Execute => {
                log(&self.state, "execute");
                self.execute();
            }
            CoreCommand::RomClose => log(&self.state, "rom close"),
            CoreCommand::Stop => log(&self.state, "stop"),
        }
        Ok(())
    }

    fn set_frame_callback(&mut self, callback: FrameCallback) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.events.push("set frame callback".to_string());
        state.frame_callback = Some(callback);
        Ok(())
    }
}

impl Drop for FakeCore {
    fn drop(&mut self) {
        log(&self.state, "release core");
    }
}

pub struct FakeCoreLoader {
    pub state: Shared,
}

impl CoreLoader for FakeCoreLoader {
    fn attach_core(&self, path: Option<&Path>) -> std::result::Result<Box<dyn EmulatorCore>, LoadError> {
        if self.state.borrow().fail_load {
            let name = path.map_or("libmupen64plus.so.2".to_string(), |p| p.display().to_string());
            return Err(LoadError::NotFound(name));
        }
        log(&self.state, "load core");
        Ok(Box::new(FakeCore {
            state: Rc::clone(&self.state),
        }))
    }
}

pub struct FakePlugin {
    role: PluginRole,
    path: PathBuf,
    state: Shared,
}

impl PluginLibrary for FakePlugin {
    fn handle(&self) -> LibHandle {
        LibHandle::from_ptr(self.role.type_code() as usize as *mut c_void)
    }

    fn name(&self) -> &str {
        "Fake Plugin"
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FakePlugin {
    fn drop(&mut self) {
        log(&self.state, format!("unload {}", self.role));
    }
}

pub struct FakePluginLoader {
    pub state: Shared,
}

impl PluginLoader for FakePluginLoader {
    fn load(
        &self,
        role: PluginRole,
        path: &Path,
        _core: LibHandle,
    ) -> std::result::Result<Box<dyn PluginLibrary>, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Open {
                path: path.display().to_string(),
                reason: "no such file".to_string(),
            });
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        log(&self.state, format!("load {} {}", role, file_name));
        Ok(Box::new(FakePlugin {
            role,
            path: path.to_path_buf(),
            state: Rc::clone(&self.state),
        }))
    }
}

/// Capture sink that remembers which frames it was given
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub captured: Arc<Mutex<Vec<i32>>>,
}

impl CaptureSink for RecordingSink {
    fn capture(&mut self, frame_index: i32, _frame: &Frame<'_>) -> anyhow::Result<()> {
        self.captured.lock().unwrap().push(frame_index);
        Ok(())
    }
}

/// Plugin directory holding an empty file for every default plugin name
pub fn plugin_dir_with_defaults() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for role in PluginRole::ALL {
        std::fs::write(temp_dir.path().join(role.default_filename()), b"")
            .expect("Failed to create plugin file");
    }
    temp_dir
}

/// A small ROM file in its own temporary directory
pub fn rom_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.z64");
    std::fs::write(&path, [0x80u8, 0x37, 0x12, 0x40].repeat(256)).expect("Failed to write ROM");
    (temp_dir, path)
}

pub fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("m64-console")
        .chain(args.iter().copied())
        .map(String::from)
        .collect()
}
