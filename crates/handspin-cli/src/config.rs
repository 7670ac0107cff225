//! Configuration vault – reads/writes `~/.handspin/config.toml`.

use handspin_motion::MotionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where hand landmarks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Built-in scripted tour, no camera needed.
    #[default]
    Demo,
    /// JSON-lines frames from a file or stdin.
    Replay,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Demo => write!(f, "demo"),
            SourceKind::Replay => write!(f, "replay"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SourceKind::Demo),
            "replay" => Ok(SourceKind::Replay),
            other => Err(format!("unknown source '{other}' (expected demo or replay)")),
        }
    }
}

/// Persisted user configuration stored in `~/.handspin/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Capture cadence for the demo source and file replay (frames/s).
    #[serde(default = "default_capture_hz")]
    pub capture_hz: u32,

    /// Render cadence (ticks/s).
    #[serde(default = "default_render_hz")]
    pub render_hz: u32,

    /// Silence after which perception is reported stale.
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,

    /// Print the HUD line every this many render ticks.
    #[serde(default = "default_hud_every_ticks")]
    pub hud_every_ticks: u32,

    #[serde(default)]
    pub source: SourceKind,

    /// Replay input; `-` reads standard input.
    #[serde(default = "default_replay_path")]
    pub replay_path: String,

    #[serde(default)]
    pub motion: MotionConfig,
}

fn default_capture_hz() -> u32 {
    30
}
fn default_render_hz() -> u32 {
    60
}
fn default_stale_after_ms() -> u64 {
    1000
}
fn default_hud_every_ticks() -> u32 {
    15
}
fn default_replay_path() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_hz: default_capture_hz(),
            render_hz: default_render_hz(),
            stale_after_ms: default_stale_after_ms(),
            hud_every_ticks: default_hud_every_ticks(),
            source: SourceKind::default(),
            replay_path: default_replay_path(),
            motion: MotionConfig::default(),
        }
    }
}

impl Config {
    pub fn capture_interval(&self) -> Duration {
        interval_for_hz(self.capture_hz)
    }

    pub fn render_interval(&self) -> Duration {
        interval_for_hz(self.render_hz)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    /// `true` when frames are piped in on stdin.
    pub fn reads_stdin(&self) -> bool {
        self.source == SourceKind::Replay && self.replay_path == "-"
    }
}

/// Frame period for a rate; zero is treated as 1 Hz.
fn interval_for_hz(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}

/// Return the config path: `$HANDSPIN_CONFIG` if set, else
/// `~/.handspin/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("HANDSPIN_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".handspin").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path, then apply env overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config = toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `HANDSPIN_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `HANDSPIN_SOURCE` | `source` |
/// | `HANDSPIN_REPLAY_PATH` | `replay_path` |
/// | `HANDSPIN_CAPTURE_HZ` | `capture_hz` |
/// | `HANDSPIN_RENDER_HZ` | `render_hz` |
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HANDSPIN_SOURCE")
        && let Ok(kind) = v.parse::<SourceKind>()
    {
        cfg.source = kind;
    }
    if let Ok(v) = std::env::var("HANDSPIN_REPLAY_PATH") {
        cfg.replay_path = v;
    }
    if let Ok(v) = std::env::var("HANDSPIN_CAPTURE_HZ")
        && let Ok(hz) = v.parse::<u32>()
    {
        cfg.capture_hz = hz;
    }
    if let Ok(v) = std::env::var("HANDSPIN_RENDER_HZ")
        && let Ok(hz) = v.parse::<u32>()
    {
        cfg.render_hz = hz;
    }
}

/// Save the config to disk, creating the parent directory if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use handspin_motion::MomentumPolicy;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.stale_after_ms, 1000);
        assert_eq!(loaded.hud_every_ticks, 15);
        assert_eq!(loaded.motion, MotionConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "stale_after_ms = 250\n\n[motion]\nfriction = 0.9\nmomentum_policy = \"coast\"\n",
        )
        .unwrap();

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.stale_after_ms, 250);
        assert_eq!(cfg.hud_every_ticks, 15);
        assert_eq!(cfg.motion.friction, 0.9);
        assert_eq!(cfg.motion.momentum_policy, MomentumPolicy::Coast);
        assert_eq!(cfg.motion.flick_threshold, 10.0);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "render_hz = \"fast\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn config_path_points_to_handspin_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".handspin"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn intervals_follow_rates() {
        let cfg = Config {
            capture_hz: 50,
            render_hz: 0,
            ..Config::default()
        };
        assert_eq!(cfg.capture_interval(), Duration::from_millis(20));
        assert_eq!(cfg.render_interval(), Duration::from_secs(1));
    }

    #[test]
    fn reads_stdin_only_for_dash_replay() {
        let mut cfg = Config::default();
        assert!(!cfg.reads_stdin());
        cfg.source = SourceKind::Replay;
        assert!(cfg.reads_stdin());
        cfg.replay_path = "session.jsonl".to_string();
        assert!(!cfg.reads_stdin());
    }

    #[test]
    fn source_kind_parses_case_insensitively() {
        assert_eq!("Replay".parse::<SourceKind>(), Ok(SourceKind::Replay));
        assert_eq!(" demo ".parse::<SourceKind>(), Ok(SourceKind::Demo));
        assert!("webcam".parse::<SourceKind>().is_err());
    }

    #[test]
    fn apply_env_overrides_changes_source() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HANDSPIN_SOURCE", "replay") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.source, SourceKind::Replay);
        unsafe { std::env::remove_var("HANDSPIN_SOURCE") };
    }

    #[test]
    fn apply_env_overrides_changes_replay_path() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HANDSPIN_REPLAY_PATH", "/tmp/session.jsonl") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.replay_path, "/tmp/session.jsonl");
        unsafe { std::env::remove_var("HANDSPIN_REPLAY_PATH") };
    }

    #[test]
    fn apply_env_overrides_changes_capture_hz() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HANDSPIN_CAPTURE_HZ", "15") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.capture_hz, 15);
        unsafe { std::env::remove_var("HANDSPIN_CAPTURE_HZ") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_render_hz() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HANDSPIN_RENDER_HZ", "not-a-rate") };
        let mut cfg = Config::default();
        let original = cfg.render_hz;
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.render_hz, original);
        unsafe { std::env::remove_var("HANDSPIN_RENDER_HZ") };
    }
}
