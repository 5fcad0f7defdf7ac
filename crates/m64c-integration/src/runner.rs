//! Run loop driver
//!
//! Hands the ROM image to the core and runs it to completion. Everything here
//! is best-effort: failures are logged and the caller proceeds to teardown.

use crate::rom::RomImage;
use crate::screenshot::{CaptureSink, ScreenshotObserver, ScreenshotSchedule};
use m64c_core::{CoreCommand, EmulatorCore};
use std::path::Path;
use tracing::{error, info, warn};

/// How far a run got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The ROM file couldn't be read; nothing was sent to the core
    RomUnreadable,
    /// The core rejected the ROM image
    RomRejected,
    /// The ROM was opened, executed and closed
    Completed,
}

/// Install the screenshot observer on the core
pub fn install_screenshots(
    core: &mut dyn EmulatorCore,
    schedule: ScreenshotSchedule,
    sink: Box<dyn CaptureSink + Send>,
) {
    info!("Test screenshots scheduled at frames {:?}", schedule.frames());
    let observer = ScreenshotObserver::new(schedule, sink);
    if let Err(e) = core.set_frame_callback(observer.into_callback()) {
        warn!("Couldn't set frame callback, so --testshots won't work: {}", e);
    }
}

/// Load the ROM at `path` and run it
pub fn run_rom(core: &mut dyn EmulatorCore, path: &Path) -> RunOutcome {
    let rom = match RomImage::load(path) {
        Ok(rom) => rom,
        Err(e) => {
            error!("{}", e);
            return RunOutcome::RomUnreadable;
        }
    };

    if let Err(e) = core.do_command(CoreCommand::RomOpen(rom.data())) {
        error!("Core failed to open ROM image file '{}': {}", path.display(), e);
        return RunOutcome::RomRejected;
    }

    info!("Running ROM '{}'", path.display());
    if let Err(e) = core.do_command(CoreCommand::Execute) {
        warn!("Emulation ended with an error: {}", e);
    }
    if let Err(e) = core.do_command(CoreCommand::RomClose) {
        warn!("Error closing ROM: {}", e);
    }

    RunOutcome::Completed
}
