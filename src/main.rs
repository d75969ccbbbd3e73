//! drishti-stream - Virtual camera streaming daemon
//!
//! Streams rendered camera frames plus pose metadata from a simulated
//! scene to per-session TCP sinks, one port per camera rig.

use drishti_stream::app::StreamerApp;
use drishti_stream::config::AppConfig;
use drishti_stream::error::Result;
use std::env;
use std::path::Path;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `drishti-stream <path>` (positional)
/// - `drishti-stream --config <path>` (flag-based)
/// - `drishti-stream -c <path>` (short flag)
///
/// Defaults to `/etc/drishti-stream.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/drishti-stream.toml".to_string()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("drishti-stream v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::warn!("Config {} not found, using defaults", config_path);
        AppConfig::default()
    };

    let mut app = StreamerApp::new(config);
    app.run()
}
