use tracing_subscriber::EnvFilter;

use crate::args::GlobalArgs;

/// Install a stderr subscriber. `RUST_LOG` overrides the level picked
/// from `--quiet` / `--verbose`.
pub fn init_tracing(global: &GlobalArgs) {
    let level = if global.quiet {
        "off"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
