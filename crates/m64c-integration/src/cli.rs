//! Command-line parsing
//!
//! The command line is scanned twice. The first pass runs before the core is
//! loaded and only picks out what is needed to load it. The second pass runs
//! once the configuration is open and handles everything else.

use crate::screenshot::ScreenshotSchedule;
use m64c_core::config::core_keys;
use m64c_core::{ConfigValue, FrontendError, PluginRole};
use m64c_loader::PluginOverrides;
use std::path::PathBuf;
use tracing::warn;

/// Options needed before the core library is loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialArgs {
    pub core_lib: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
}

/// Result of the first pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialParse {
    /// `--help` or `-h` was given; print usage and stop
    Help,
    Continue(InitialArgs),
}

/// A `Core` configuration parameter set from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreOverride {
    OnScreenDisplay(bool),
    Fullscreen(bool),
    ScreenshotPath(String),
    EmulationMode(i32),
}

impl CoreOverride {
    /// Configuration key and value this override writes
    pub fn parameter(&self) -> (&'static str, ConfigValue) {
        match self {
            Self::OnScreenDisplay(on) => (core_keys::ON_SCREEN_DISPLAY, ConfigValue::Bool(*on)),
            Self::Fullscreen(on) => (core_keys::FULLSCREEN, ConfigValue::Bool(*on)),
            Self::ScreenshotPath(dir) => (core_keys::SCREENSHOT_PATH, ConfigValue::from(dir.as_str())),
            Self::EmulationMode(mode) => (core_keys::R4300_EMULATOR, ConfigValue::Int(*mode)),
        }
    }
}

/// Everything the second pass extracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Parameter overrides in the order they were given
    pub core_overrides: Vec<CoreOverride>,
    pub plugins: PluginOverrides,
    pub test_shots: Option<ScreenshotSchedule>,
    pub save_options: bool,
    pub rom_path: PathBuf,
}

fn is_help(arg: &str) -> bool {
    arg == "--help" || arg == "-h"
}

/// First pass: core library path, configuration directory and help
pub fn parse_initial(args: &[String]) -> InitialParse {
    if args.iter().skip(1).any(|arg| is_help(arg)) {
        return InitialParse::Help;
    }

    let mut initial = InitialArgs::default();
    let mut i = 1;
    while i < args.len() {
        let has_value = i + 1 < args.len();
        match args[i].as_str() {
            "--corelib" if has_value => {
                initial.core_lib = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--configdir" if has_value => {
                initial.config_dir = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    InitialParse::Continue(initial)
}

/// Second pass: every remaining option plus the trailing ROM path
///
/// A flag that takes a value but is the last argument does not consume a
/// value; it falls through and is taken as the ROM path.
pub fn parse_final(args: &[String]) -> Result<CommandLine, FrontendError> {
    let mut core_overrides = Vec::new();
    let mut plugins = PluginOverrides::default();
    let mut test_shots = None;
    let mut save_options = false;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let value = args.get(i + 1).map(String::as_str);

        match (arg, value) {
            ("--noosd", _) => core_overrides.push(CoreOverride::OnScreenDisplay(false)),
            ("--osd", _) => core_overrides.push(CoreOverride::OnScreenDisplay(true)),
            ("--fullscreen", _) => core_overrides.push(CoreOverride::Fullscreen(true)),
            ("--windowed", _) => core_overrides.push(CoreOverride::Fullscreen(false)),
            // Handled by the first pass
            ("--corelib", Some(_)) | ("--configdir", Some(_)) => i += 1,
            ("--plugindir", Some(dir)) => {
                plugins.plugin_dir = Some(dir.to_string());
                i += 1;
            }
            ("--sshotdir", Some(dir)) => {
                core_overrides.push(CoreOverride::ScreenshotPath(dir.to_string()));
                i += 1;
            }
            ("--gfx", Some(spec)) => {
                plugins.set(PluginRole::Video, spec);
                i += 1;
            }
            ("--audio", Some(spec)) => {
                plugins.set(PluginRole::Audio, spec);
                i += 1;
            }
            ("--input", Some(spec)) => {
                plugins.set(PluginRole::Input, spec);
                i += 1;
            }
            ("--rsp", Some(spec)) => {
                plugins.set(PluginRole::Rsp, spec);
                i += 1;
            }
            ("--emumode", Some(mode)) => {
                core_overrides.push(CoreOverride::EmulationMode(atoi(mode)));
                i += 1;
            }
            ("--testshots", Some(list)) => {
                test_shots = Some(ScreenshotSchedule::parse(list));
                i += 1;
            }
            ("--saveoptions", _) => save_options = true,
            (rom, None) => {
                return Ok(CommandLine {
                    core_overrides,
                    plugins,
                    test_shots,
                    save_options,
                    rom_path: PathBuf::from(rom),
                });
            }
            (other, Some(_)) => warn!("Unrecognized command-line parameter '{}'", other),
        }
        i += 1;
    }

    Err(FrontendError::MissingRom)
}

/// Parse the leading integer of `s` the way C's `atoi` does; 0 if there is none
pub fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Usage text printed for `--help`
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {} [parameters] [romfile]

Parameters:
    --noosd               : disable onscreen display
    --osd                 : enable onscreen display
    --fullscreen          : use fullscreen display mode
    --windowed            : use windowed display mode
    --corelib (filepath)  : use core library (filepath) (can be only filename or full path)
    --configdir (dir)     : force configation directory to (dir)
    --plugindir (dir)     : search for plugins in (dir)
    --sshotdir (dir)      : set screenshot directory to (dir)
    --gfx (plugin-spec)   : use gfx plugin given by (plugin-spec)
    --audio (plugin-spec) : use audio plugin given by (plugin-spec)
    --input (plugin-spec) : use input plugin given by (plugin-spec)
    --rsp (plugin-spec)   : use rsp plugin given by (plugin-spec)
    --emumode (mode)      : set emu mode to: 0=Interpreter 1=DynaRec 2=Pure Interpreter
    --testshots (list)    : take screenshots at frames given in comma-separated (list), then quit
    --saveoptions         : save the given command-line options in configuration file for future
    --help                : see this help message

(plugin-spec):
    (pluginname)          : filename (without path) of plugin to find in plugin directory
    (pluginpath)          : full path and filename of plugin
    'dummy'               : use dummy plugin

",
        program
    )
}
