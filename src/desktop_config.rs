//! Claude Desktop configuration
//!
//! Read once at startup and shared with the MCP server. Each server entry under
//! `mcpServers` may carry an `autoapprove` array of tool names; the trusted tool
//! list is those arrays concatenated in file order.

use crate::config::{DESKTOP_CONFIG_DIR, DESKTOP_CONFIG_FILE};
use crate::error::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SERVERS_KEY: &str = "mcpServers";
const AUTOAPPROVE_KEY: &str = "autoapprove";

#[derive(Debug, Clone)]
pub struct DesktopConfig {
    raw: Value,
}

impl DesktopConfig {
    /// Standard location, e.g. `~/Library/Application Support/Claude/claude_desktop_config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(DESKTOP_CONFIG_DIR).join(DESKTOP_CONFIG_FILE))
    }

    /// Loads the config, treating a missing file as empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Claude Desktop config not found at {}, no tools are auto-approved",
                path.display()
            );
            return Ok(Self::from_value(Value::Object(Default::default())));
        }

        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            message: format!("{}: {}", path.display(), err),
        })?;
        let raw: Value =
            serde_json::from_str(&content).map_err(|err| ConfigError::InvalidFormat {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        if !raw.is_object() {
            return Err(ConfigError::InvalidType {
                field: "Claude Desktop config".to_string(),
                expected: "a JSON object",
            });
        }

        debug!("loaded Claude Desktop config from {}", path.display());
        Ok(Self::from_value(raw))
    }

    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Tool names listed under every server's `autoapprove` array, in file
    /// order. Duplicates are kept; non-string entries are skipped.
    pub fn trusted_tools(&self) -> Vec<String> {
        let Some(servers) = self.raw.get(SERVERS_KEY).and_then(Value::as_object) else {
            return Vec::new();
        };

        servers
            .iter()
            .filter_map(|(name, server)| {
                let tools = server.get(AUTOAPPROVE_KEY)?;
                match tools.as_array() {
                    Some(tools) => Some(tools),
                    None => {
                        warn!("{}.{} is not an array, ignoring", name, AUTOAPPROVE_KEY);
                        None
                    }
                }
            })
            .flatten()
            .filter_map(|tool| tool.as_str().map(str::to_string))
            .collect()
    }
}
