//! Hand-off to the external auto-approve script injector

use crate::config::INJECT_TIMEOUT_DEFAULT;
use crate::error::{errors, AutoApproveResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Pushes the auto-approve script into the running app through its debug port.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn inject(&self, port: u16) -> AutoApproveResult<()>;
}

/// Runs a helper program as `<program> <args...> --port <port>` and waits for it.
#[derive(Debug, Clone)]
pub struct CommandInjector {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandInjector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: INJECT_TIMEOUT_DEFAULT,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ScriptInjector for CommandInjector {
    async fn inject(&self, port: u16) -> AutoApproveResult<()> {
        let program = which::which(&self.program).map_err(|err| {
            errors::injection_error_with_source(
                format!("injector '{}' not found in PATH", self.program),
                err,
            )
        })?;
        debug!("running injector {} on port {}", program.display(), port);

        // stdout belongs to the MCP transport, so capture everything
        let child = tokio::process::Command::new(&program)
            .args(&self.args)
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                errors::injection_error_with_source(
                    format!("failed to start {}", program.display()),
                    err,
                )
            })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|err| {
                errors::injection_error_with_source("injector did not complete", err)
            })?,
            Err(_) => {
                return Err(errors::timeout_error(
                    format!("injector {} did not finish", self.program),
                    self.timeout.as_millis() as u64,
                ))
            }
        };

        if output.status.success() {
            info!("Auto-approve script injected on port {}", port);
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(errors::injection_error(format!(
                "injector exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn shell(script: &str) -> CommandInjector {
        // `sh -c <script> --port N` binds "--port" to $0 and N to $1
        CommandInjector::new("sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn successful_injector_exit() {
        shell("test \"$1\" = 9444")
            .inject(9444)
            .await
            .expect("injector receives the port and succeeds");
    }

    #[tokio::test]
    async fn failing_injector_reports_stderr() {
        let err = shell("echo boom >&2; exit 3")
            .inject(9444)
            .await
            .expect_err("non-zero exit");
        assert_eq!(err.category(), ErrorCategory::Injection);
        assert!(err.to_string().contains("boom"), "{err}");
    }

    #[tokio::test]
    async fn hung_injector_times_out() {
        let err = shell("sleep 5")
            .with_timeout(Duration::from_millis(100))
            .inject(9444)
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn missing_injector_is_an_injection_error() {
        let err = CommandInjector::new("definitely-not-an-autoapprove-injector")
            .inject(9444)
            .await
            .expect_err("missing program");
        assert_eq!(err.category(), ErrorCategory::Injection);
    }
}
