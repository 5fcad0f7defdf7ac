//! Front-end bootstrap
//!
//! [`Frontend::run`] performs the whole startup sequence: parse, load and start
//! the core, open the configuration, load and attach plugins, run the ROM and
//! tear everything down again. Every resource is owned by a value whose `Drop`
//! releases it, so an early return unwinds in reverse acquisition order.

use crate::cli::{parse_final, parse_initial, usage, CommandLine, InitialArgs, InitialParse};
use crate::config::ConfigGateway;
use crate::runner::{install_screenshots, run_rom, RunOutcome};
use crate::screenshot::{CaptureSink, PngCaptureSink};
use m64c_core::{CoreLoader, EmulatorCore, FrontendError, PluginLoader, FRONTEND_API_VERSION};
use m64c_loader::PluginManager;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error, info, warn};

const PROGRAM_NAME: &str = "m64-console";

/// A started core; dropping it shuts the core down, then releases the library
pub struct RunningCore {
    core: Box<dyn EmulatorCore>,
}

impl RunningCore {
    /// Load the core library and start it
    pub fn start(loader: &dyn CoreLoader, initial: &InitialArgs) -> Result<Self, FrontendError> {
        let mut core = loader.attach_core(initial.core_lib.as_deref())?;
        core.startup(FRONTEND_API_VERSION, initial.config_dir.as_deref())
            .map_err(FrontendError::CoreStartup)?;
        debug!("Core started");
        Ok(Self { core })
    }
}

impl Deref for RunningCore {
    type Target = dyn EmulatorCore;

    fn deref(&self) -> &Self::Target {
        &*self.core
    }
}

impl DerefMut for RunningCore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.core
    }
}

impl Drop for RunningCore {
    fn drop(&mut self) {
        if let Err(e) = self.core.shutdown() {
            warn!("Error shutting down core: {}", e);
        }
    }
}

/// Everything acquired during startup
///
/// Fields drop top to bottom: plugins are released before the core shuts down.
pub struct Session {
    plugins: PluginManager,
    cmdline: CommandLine,
    gateway: ConfigGateway,
    core: RunningCore,
}

impl Session {
    /// Run the startup sequence up to and including plugin attachment
    pub fn bootstrap(
        mut core: RunningCore,
        plugin_loader: &dyn PluginLoader,
        args: &[String],
    ) -> Result<Self, FrontendError> {
        let gateway = ConfigGateway::open(&mut *core)?;
        let cmdline = parse_final(args)?;

        gateway.apply_overrides(&mut *core, &cmdline.core_overrides);
        if cmdline.save_options {
            match gateway.save_options(&mut *core, &cmdline.plugins) {
                Ok(()) => info!("Saved command-line options to configuration"),
                Err(e) => warn!("Couldn't save command-line options: {}", e),
            }
        }

        let settings = gateway.plugin_settings(&*core, &cmdline.plugins);
        let mut plugins =
            PluginManager::search_load(plugin_loader, core.library_handle(), &settings)?;

        if let Err(e) = plugins.attach_all(&mut *core) {
            plugins.unload();
            return Err(e.into());
        }
        for slot in plugins.slots() {
            info!("{} plugin: {}", slot.role(), slot.name());
        }

        Ok(Self {
            plugins,
            cmdline,
            gateway,
            core,
        })
    }

    /// Run the ROM, then detach and unload the plugins
    ///
    /// The core is shut down when the session is dropped.
    pub fn run(mut self, sink: Option<Box<dyn CaptureSink + Send>>) -> RunOutcome {
        if let Some(schedule) = self.cmdline.test_shots.take() {
            let sink: Box<dyn CaptureSink + Send> = match sink {
                Some(sink) => sink,
                None => Box::new(PngCaptureSink::new(self.gateway.screenshot_dir(&*self.core))),
            };
            install_screenshots(&mut *self.core, schedule, sink);
        }

        let outcome = run_rom(&mut *self.core, &self.cmdline.rom_path);

        self.plugins.detach_all(&mut *self.core);
        self.plugins.unload();
        outcome
    }
}

/// The console front-end, parameterised over how the core and plugins are loaded
pub struct Frontend {
    core_loader: Box<dyn CoreLoader>,
    plugin_loader: Box<dyn PluginLoader>,
    capture_sink: Option<Box<dyn CaptureSink + Send>>,
}

impl Frontend {
    pub fn new(
        core_loader: impl CoreLoader + 'static,
        plugin_loader: impl PluginLoader + 'static,
    ) -> Self {
        Self {
            core_loader: Box::new(core_loader),
            plugin_loader: Box::new(plugin_loader),
            capture_sink: None,
        }
    }

    /// Send `--testshots` captures to `sink` instead of PNG files
    pub fn with_capture_sink(mut self, sink: impl CaptureSink + Send + 'static) -> Self {
        self.capture_sink = Some(Box::new(sink));
        self
    }

    /// Run the front-end with the process arguments and return the exit status
    pub fn run(self, args: &[String]) -> i32 {
        let initial = match parse_initial(args) {
            InitialParse::Help => {
                let program = args.first().map_or(PROGRAM_NAME, String::as_str);
                print!("{}", usage(program));
                return 1;
            }
            InitialParse::Continue(initial) => initial,
        };

        match self.start(&initial, args) {
            Ok(outcome) => {
                debug!("Run finished: {:?}", outcome);
                0
            }
            Err(e) => {
                error!("{}", e);
                e.exit_code()
            }
        }
    }

    fn start(self, initial: &InitialArgs, args: &[String]) -> Result<RunOutcome, FrontendError> {
        let core = RunningCore::start(self.core_loader.as_ref(), initial)?;
        let session = Session::bootstrap(core, self.plugin_loader.as_ref(), args)?;
        Ok(session.run(self.capture_sink))
    }
}
