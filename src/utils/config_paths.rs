//! Configuration file locations and user settings
//!
//! - persistent settings live in `~/.autoapprove-mcp/`
//! - runtime data (the daemon log) lives in `<temp>/.autoapprove-mcp/`

use crate::config::{
    INJECTOR_PROGRAM, INJECT_TIMEOUT_DEFAULT, LAUNCH_ATTEMPTS_DEFAULT, LAUNCH_INTERVAL_DEFAULT,
    LOG_FILE_NAME, SETTINGS_DIRECTORY, SETTINGS_FILE_NAME,
};
use crate::core::models::TargetApp;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User settings read from `settings.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Tracing filter such as `debug` or `info,autoapprove_mcp=trace`
    pub log_level: Option<String>,
    /// Overrides the Claude Desktop config location (supports `~/`)
    pub desktop_config: Option<String>,
    pub injector: InjectorSettings,
    pub launch: LaunchSettings,
    pub app: TargetApp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorSettings {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for InjectorSettings {
    fn default() -> Self {
        Self {
            program: INJECTOR_PROGRAM.to_string(),
            args: Vec::new(),
            timeout_secs: INJECT_TIMEOUT_DEFAULT.as_secs(),
        }
    }
}

impl InjectorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    pub attempts: u32,
    pub interval_ms: u64,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            attempts: LAUNCH_ATTEMPTS_DEFAULT,
            interval_ms: LAUNCH_INTERVAL_DEFAULT.as_millis() as u64,
        }
    }
}

impl LaunchSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Settings {
    /// Strict load; a missing file is [`ConfigError::FileNotFound`].
    pub fn load(settings_file: &Path) -> Result<Self, ConfigError> {
        if !settings_file.exists() {
            return Err(ConfigError::FileNotFound {
                path: settings_file.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(settings_file).map_err(|err| ConfigError::Io {
            message: format!("{}: {}", settings_file.display(), err),
        })?;
        serde_json::from_str(&content).map_err(|err| ConfigError::InvalidFormat {
            path: settings_file.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Desktop config override with `~` expanded
    pub fn desktop_config_path(&self) -> Option<PathBuf> {
        self.desktop_config.as_deref().map(expand_home)
    }
}

fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(dir)
}

/// All files the server reads or writes
pub struct ConfigPaths {
    /// Persistent settings directory (`~/.autoapprove-mcp/`)
    pub config_dir: PathBuf,
    /// Runtime data directory (`<temp>/.autoapprove-mcp/`)
    pub runtime_dir: PathBuf,
    pub settings_file: PathBuf,
    pub log_file: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home_dir = dirs::home_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_roots(&home_dir, &std::env::temp_dir()))
    }

    pub fn with_roots(home_dir: &Path, temp_dir: &Path) -> Self {
        let config_dir = home_dir.join(SETTINGS_DIRECTORY);
        let runtime_dir = temp_dir.join(SETTINGS_DIRECTORY);

        Self {
            settings_file: config_dir.join(SETTINGS_FILE_NAME),
            log_file: runtime_dir.join(LOG_FILE_NAME),
            config_dir,
            runtime_dir,
        }
    }

    /// Settings from `settings_file`; an absent file means defaults, a broken
    /// one is an error for the caller to report.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        match Settings::load(&self.settings_file) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Settings::default()),
            loaded => loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn paths() -> (TempDir, ConfigPaths) {
        let dir = TempDir::new().expect("temp dir");
        let paths = ConfigPaths::with_roots(&dir.path().join("home"), &dir.path().join("tmp"));
        (dir, paths)
    }

    #[test]
    fn test_layout() {
        let (dir, paths) = paths();
        assert_eq!(
            paths.settings_file,
            dir.path().join("home/.autoapprove-mcp/settings.json")
        );
        assert_eq!(
            paths.log_file,
            dir.path().join("tmp/.autoapprove-mcp/autoapprove-mcp.log")
        );
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let (_dir, paths) = paths();
        let settings = paths.load_settings().expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.launch.attempts, 30);
        assert_eq!(settings.injector.program, "claude-autoapprove");
    }

    #[test]
    fn test_partial_settings_merge_with_defaults() {
        let (_dir, paths) = paths();
        std::fs::create_dir_all(&paths.config_dir).expect("mkdir");
        std::fs::write(
            &paths.settings_file,
            r#"{ "log_level": "debug", "launch": { "attempts": 5 }, "app": { "display_name": "Claude Beta" } }"#,
        )
        .expect("write");

        let settings = paths.load_settings().expect("settings");
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(settings.launch.attempts, 5);
        assert_eq!(settings.launch.interval(), Duration::from_secs(1));
        assert_eq!(settings.app.display_name, "Claude Beta");
        assert_eq!(settings.app.exe_name, "Claude.exe");
    }

    #[test]
    fn test_broken_settings_are_reported() {
        let (_dir, paths) = paths();
        std::fs::create_dir_all(&paths.config_dir).expect("mkdir");
        std::fs::write(&paths.settings_file, "{ broken").expect("write");

        assert!(matches!(
            paths.load_settings(),
            Err(ConfigError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_strict_load_reports_missing_file() {
        let (_dir, paths) = paths();
        assert!(matches!(
            Settings::load(&paths.settings_file),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_home_expansion() {
        let settings = Settings {
            desktop_config: Some("/etc/claude.json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.desktop_config_path(),
            Some(PathBuf::from("/etc/claude.json"))
        );

        if let Some(home) = dirs::home_dir() {
            let settings = Settings {
                desktop_config: Some("~/claude.json".to_string()),
                ..Default::default()
            };
            assert_eq!(settings.desktop_config_path(), Some(home.join("claude.json")));
        }
    }
}
