//! m64-console
//!
//! Command-line front-end that loads an N64 emulator core and its plugins
//! from shared libraries and runs a ROM.

use m64c_ffi::{NativeCoreLoader, NativePluginLoader};
use m64c_integration::Frontend;

fn main() {
    // Initialize logging; diagnostics go to stderr, the banner and usage to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("m64-console: console front-end for Mupen64Plus-compatible cores");
    println!("m64-console Version {}\n", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let code = Frontend::new(NativeCoreLoader, NativePluginLoader).run(&args);

    tracing::debug!("Exiting with status {}", code);
    std::process::exit(code);
}
