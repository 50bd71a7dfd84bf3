//! globalhook entry point.
//!
//! Builds one keyboard and one mouse tracker, attaches logging subscribers,
//! starts listening and runs until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config (file or --config), init tracing
//!  └─ --write-config: save the effective config and exit
//!  └─ KeyboardTracker / MouseTracker   -- platform hook adapters
//!       └─ demo subscribers            -- log every transition by name
//!  └─ wait for Ctrl-C, then stop() both trackers
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use globalhook::application::keyboard_tracker::{KeyCallback, KeyboardTracker};
use globalhook::application::mouse_tracker::{MouseCallback, MouseTracker};
use globalhook::infrastructure::hook::{platform_hook, HookKind};
use globalhook::infrastructure::storage::config::{self, AppConfig, ConfigError};
use globalhook_core::{button_name, key_name, ButtonCode, KeyCode};

/// Command-line arguments for the globalhook listener.
#[derive(Debug, Parser)]
#[command(
    name = "globalhook",
    about = "Logs system-wide keyboard and mouse press/hold/release transitions",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "GLOBALHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (`error`, `warn`, `info`, `debug`, `trace`).
    ///
    /// `RUST_LOG`, when set, still takes precedence.
    #[arg(long, env = "GLOBALHOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn load(cli: &Cli) -> Result<AppConfig, ConfigError> {
    match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

fn write(cli: &Cli, cfg: &AppConfig) -> Result<PathBuf, ConfigError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_file_path()?,
    };
    config::save_config_to(&path, cfg)?;
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging is not up yet, so a config error is reported after init.
    let (cfg, config_error) = match load(&cli) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Logging setup ─────────────────────────────────────────────────────────
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| cfg.listener.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if let Some(e) = config_error {
        warn!("{e}; using default configuration");
    }

    if cli.write_config {
        let path = write(&cli, &cfg)?;
        info!("configuration written to {}", path.display());
        return Ok(());
    }
    info!("globalhook starting");

    // ── Trackers ──────────────────────────────────────────────────────────────
    let hold_interval = cfg.listener.hold_interval();
    let keyboard = KeyboardTracker::with_hold_interval(platform_hook(HookKind::Keyboard), hold_interval);
    let mouse = MouseTracker::with_hold_interval(platform_hook(HookKind::Mouse), hold_interval);

    keyboard.add_callback(
        KeyCallback::new()
            .on_pressed(|code| info!("key pressed: {}", key_name(code)))
            .on_held(|code| info!("key held: {}", key_name(code)))
            .on_released(|code| info!("key released: {}", key_name(code))),
    );
    keyboard.add_callback(KeyCallback::new().on_pressed(|code| {
        if code == KeyCode::A {
            info!("Pressed Key A");
        }
    }));

    let mut mouse_logger = MouseCallback::new()
        .on_pressed(|b, x, y| info!("mouse pressed: {} at ({x}, {y})", button_name(b)))
        .on_held(|b, x, y| info!("mouse held: {} at ({x}, {y})", button_name(b)))
        .on_released(|b, x, y| info!("mouse released: {} at ({x}, {y})", button_name(b)))
        .on_wheel(|delta| info!("mouse wheel: {delta}"));
    if cfg.mouse.log_movement {
        mouse_logger = mouse_logger.on_moved(|x, y| info!("mouse moved: ({x}, {y})"));
    }
    mouse.add_callback(mouse_logger);
    mouse.add_callback(MouseCallback::new().on_pressed(|b, _, _| {
        if b == ButtonCode::LEFT {
            info!("Pressed Left Button");
        }
    }));

    if cfg.keyboard.enabled {
        keyboard.start();
    } else {
        info!("keyboard tracker disabled by config");
    }
    if cfg.mouse.enabled {
        mouse.start();
    } else {
        info!("mouse tracker disabled by config");
    }

    info!("globalhook ready.  Press Ctrl-C to exit.");

    // ── Shutdown ──────────────────────────────────────────────────────────────
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!("failed to listen for Ctrl-C ({e}); shutting down"),
    }

    // stop() joins timer and hook threads, so keep it off the async workers.
    tokio::task::spawn_blocking(move || {
        if keyboard.is_listening() {
            keyboard.stop();
        }
        if mouse.is_listening() {
            mouse.stop();
        }
    })
    .await?;

    info!("globalhook stopped");
    Ok(())
}
