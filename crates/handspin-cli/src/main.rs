//! `handspin` – drive a spinning object with hand gestures.
//!
//! This binary wires the stack together:
//!
//! 1. Loads `~/.handspin/config.toml` (defaults when absent).
//! 2. Opens a landmark source: the built-in demo tour, or JSON-lines frames
//!    replayed from a file or piped in on stdin by an external detector.
//! 3. Runs the capture loop on its own thread and the render loop on the main
//!    thread, with a console HUD as the render target.
//! 4. Stops on **Ctrl-C** or an exit key (`q`, `quit`, ESC + Enter).
//!
//! `handspin init-config` writes the default configuration file.

mod config;
mod console;
mod exit_keys;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use handspin_hal::LandmarkSource;
use handspin_hal::replay::JsonlLandmarkSource;
use handspin_hal::sim::ScriptedLandmarkSource;
use handspin_motion::{InertialController, SystemClock};
use handspin_perception::sample_channel;
use handspin_runtime::{CaptureLoop, RenderLoop};
use handspin_types::HandspinError;

use crate::config::{Config, SourceKind};
use crate::console::ConsoleRenderTarget;

/// How long to wait for the capture thread after the render loop ends.
const CAPTURE_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    // Held for the whole process; dropping it flushes exported spans.
    let _telemetry = handspin_runtime::init_tracing("handspin");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {}
        Some("init-config") => return init_config(),
        Some("-h" | "--help" | "help") => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Some(other) => {
            eprintln!("{} '{}'", "Unknown argument:".red(), other.yellow());
            print_usage();
            return ExitCode::from(2);
        }
    }

    print_banner();
    let cfg = load_config();

    // ── Shared stop flag ──────────────────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    let stop_ctrlc = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping …".yellow().bold());
        stop_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; use an exit key to stop");
    }

    // ── Landmark source ───────────────────────────────────────────────────
    let source = match open_source(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "Cannot open landmark source".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if cfg.reads_stdin() {
        println!("  Reading landmark frames from stdin; press {} to stop.", "Ctrl-C".bold());
    } else {
        match exit_keys::spawn_listener(stop.clone()) {
            Ok(_) => println!(
                "  Type {} (or {}) and Enter to stop.",
                "q".bold().cyan(),
                "ESC".bold().cyan()
            ),
            Err(e) => warn!(error = %e, "Failed to start exit-key listener; use Ctrl-C to stop"),
        }
    }
    println!();

    // ── Capture and render ────────────────────────────────────────────────
    let (writer, reader) = sample_channel();
    let capture = match CaptureLoop::new(source, writer, stop.clone()).spawn() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start capture thread".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut render = RenderLoop::new(
        InertialController::new(cfg.motion.clone()),
        reader,
        SystemClock::new(),
        ConsoleRenderTarget::stdout(cfg.hud_every_ticks),
        cfg.stale_after(),
    );
    let render_stats = render.run(&stop, cfg.render_interval());

    stop.store(true, Ordering::SeqCst);
    let capture_stats = capture.join_timeout(CAPTURE_JOIN_TIMEOUT);

    println!();
    println!(
        "  {} {} frames rendered, {} stale episode(s).",
        "✓".green().bold(),
        render_stats.ticks,
        render_stats.stale_episodes
    );
    if let Some(stats) = capture_stats {
        println!(
            "  {} {} hand samples from {} frames ({} without a hand, {} skipped).",
            "✓".green().bold(),
            stats.samples_written,
            stats.frames,
            stats.no_hand,
            stats.read_failures + stats.malformed
        );
    }
    println!("{}", "  Bye.".green());
    ExitCode::SUCCESS
}

/// Load the config vault, falling back to defaults on absence or error.
fn load_config() -> Config {
    let path = config::config_path();
    match config::load() {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        Ok(None) => {
            println!(
                "  No config at {}; using defaults.",
                path.display().to_string().dimmed()
            );
            defaults_with_env()
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            defaults_with_env()
        }
    }
}

fn defaults_with_env() -> Config {
    let mut cfg = Config::default();
    config::apply_env_overrides(&mut cfg);
    cfg
}

fn open_source(cfg: &Config) -> Result<Box<dyn LandmarkSource>, HandspinError> {
    info!(source = %cfg.source, "opening landmark source");
    let source: Box<dyn LandmarkSource> = match cfg.source {
        SourceKind::Demo => {
            println!("  Source: {} (scripted hand tour)", "demo".bold());
            Box::new(ScriptedLandmarkSource::demo().with_frame_interval(cfg.capture_interval()))
        }
        SourceKind::Replay if cfg.reads_stdin() => {
            println!("  Source: {} from {}", "replay".bold(), "stdin".bold());
            // The external detector sets the pace.
            Box::new(JsonlLandmarkSource::stdin())
        }
        SourceKind::Replay => {
            println!("  Source: {} from {}", "replay".bold(), cfg.replay_path.bold());
            Box::new(
                JsonlLandmarkSource::open(Path::new(&cfg.replay_path))?
                    .with_frame_interval(cfg.capture_interval()),
            )
        }
    };
    Ok(source)
}

fn init_config() -> ExitCode {
    let path = config::config_path();
    if path.exists() {
        println!(
            "  {} already exists; leaving it untouched.",
            path.display().to_string().bold()
        );
        return ExitCode::SUCCESS;
    }
    match config::save(&Config::default()) {
        Ok(()) => {
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __                 __          _     "#.bold().cyan());
    println!("{}", r#"  / /  ___ ____  ___/ /__ ___  (_)__  "#.bold().cyan());
    println!("{}", r#" / _ \/ _ `/ _ \/ _  (_-</ _ \/ / _ \ "#.bold().cyan());
    println!("{}", r#"/_//_/\_,_/_//_/\_,_/___/ .__/_/_//_/ "#.bold().cyan());
    println!("{}", r#"                       /_/            "#.bold().cyan());
    println!();
    println!(
        "  {}  {}",
        "Fist".red().bold(),
        "cycles colour, spins slowly".dimmed()
    );
    println!(
        "  {}  {}",
        "Open".green().bold(),
        "steers the object; flick to spin".dimmed()
    );
    println!();
}

fn print_usage() {
    println!("Usage: handspin [init-config]");
    println!();
    println!("  (no argument)   run a session using ~/.handspin/config.toml");
    println!("  init-config     write the default config file and exit");
    println!();
    println!("Environment: HANDSPIN_CONFIG, HANDSPIN_SOURCE, HANDSPIN_REPLAY_PATH,");
    println!("             HANDSPIN_CAPTURE_HZ, HANDSPIN_RENDER_HZ, RUST_LOG,");
    println!("             HANDSPIN_LOG_FORMAT, OTEL_EXPORTER_OTLP_ENDPOINT");
}
