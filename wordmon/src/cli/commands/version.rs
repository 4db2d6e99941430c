//! Version information display.

use crate::cli::args::{OutputFormat, VersionArgs};

/// Print version information, including the core library version.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
        }
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": name,
                "version": version,
                "core": wordmon_core::VERSION,
            });
            println!("{info}");
        }
    }
}
