use std::time::Duration;

/// Remote debugging port Claude Desktop is started with when none is given.
pub const DEFAULT_PORT: u16 = 19222;

pub const APP_DISPLAY_NAME: &str = "Claude";
pub const APP_BUNDLE_NAME: &str = "Claude.app";
pub const APP_EXE_NAME: &str = "Claude.exe";
pub const APP_BARE_NAMES: [&str; 2] = ["claude", "claude.exe"];

// Fragments of the real application binary path, used to skip helper/renderer processes
pub const MACOS_MAIN_BINARY: &str = "Contents/MacOS/Claude";
pub const WINDOWS_MAIN_BINARY: &str = "AnthropicClaude";
pub const POSIX_MAIN_BINARY: &str = "claude-desktop";

pub const MACOS_LAUNCHER: &str = "open";
pub const WINDOWS_INSTALL_DIR: &str = "AnthropicClaude";
pub const POSIX_LAUNCHER: &str = "claude-desktop";

pub const DEBUG_PORT_FLAG: &str = "--remote-debugging-port";

pub const DESKTOP_CONFIG_DIR: &str = "Claude";
pub const DESKTOP_CONFIG_FILE: &str = "claude_desktop_config.json";

pub const INJECTOR_PROGRAM: &str = "claude-autoapprove";

// Common constants used across modules
pub const SETTINGS_DIRECTORY: &str = ".autoapprove-mcp";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const LOG_FILE_NAME: &str = "autoapprove-mcp.log";

pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);
pub const TERMINATE_WAIT: Duration = Duration::from_secs(5);
pub const TERMINATE_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const LAUNCH_ATTEMPTS_DEFAULT: u32 = 30;
pub const LAUNCH_INTERVAL_DEFAULT: Duration = Duration::from_secs(1);
pub const INJECT_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30);

/// Upper bound on parent-chain walks, guards against pid reuse cycles
pub const MAX_ANCESTRY_DEPTH: usize = 64;
