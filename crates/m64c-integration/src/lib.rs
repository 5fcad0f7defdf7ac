//! Console front-end for a dynamically loaded emulator core
//!
//! This crate ties argument parsing, configuration, plugin loading and the
//! run loop together behind [`Frontend`].

pub mod cli;
pub mod config;
pub mod rom;
pub mod runner;
pub mod screenshot;
pub mod session;

pub use cli::{CommandLine, CoreOverride, InitialArgs, InitialParse};
pub use config::ConfigGateway;
pub use rom::RomImage;
pub use runner::RunOutcome;
pub use screenshot::{CaptureSink, PngCaptureSink, ScreenshotObserver, ScreenshotSchedule};
pub use session::{Frontend, RunningCore, Session};
