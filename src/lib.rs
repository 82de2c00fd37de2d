//! Claude Auto-Approve MCP
//!
//! Keeps Claude Desktop running with a remote debugging port, hands it to the
//! auto-approve script injector, then serves the trusted tool list over MCP.

pub mod app;
pub mod commands;
pub mod config;
pub mod core;
pub mod daemon;
pub mod desktop_config;
pub mod error;
pub mod inject;
pub mod launcher;
pub mod mcp;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod utils;

// Re-export commonly used types for convenience
pub use app::{App, RunOutcome, SessionRunner};
pub use core::locator::ProcessLocator;
pub use core::models::{Pid, ProcessHandle, ProcessTreeSnapshot, TargetApp};
pub use core::process_table::{ProcessQueryError, ProcessTable, SystemProcessTable};
pub use core::terminator::{ProcessTerminator, TargetTerminator};
pub use desktop_config::DesktopConfig;
pub use error::{AutoApproveError, AutoApproveResult, ConfigError};
pub use launcher::{AppLauncher, DebugPortLauncher};
pub use orchestrator::{LaunchOutcome, Orchestrator};
pub use probe::{is_port_open, PortProbe, TcpPortProbe};
