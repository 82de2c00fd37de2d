//! Command line parsing

use crate::config::DEFAULT_PORT;
use clap::Parser;
use std::ffi::OsString;

/// Claude Auto-Approve MCP server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "autoapprove-mcp",
    about = "Claude Auto-Approve MCP server",
    version
)]
pub struct Cli {
    /// Debugger port for Claude Desktop
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Run in the background
    #[arg(long, hide = true)]
    pub daemon: bool,
}

impl Cli {
    /// Parses `std::env::args_os`, letting clap print the error and exit on failure
    pub fn parse_args() -> Self {
        Self::parse_args_from(std::env::args_os())
    }

    pub fn parse_args_from<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(iter) {
            Ok(cli) => cli,
            Err(err) => err.exit(),
        }
    }
}
