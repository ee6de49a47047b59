//! The CLI transport seam.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DeviceError, DeviceResult};

/// Runs one show command on a switch and captures its output.
///
/// `Ok(None)` means the session worked but the command printed
/// nothing; `Err` means the session itself failed.
#[async_trait]
pub trait CliSession: Send + Sync {
    async fn run(&self, command: &str) -> DeviceResult<Option<String>>;
}

/// Where an [`SshCliSession`] connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    /// Configured switch name, used in error messages.
    pub switch: String,
    pub host: String,
    pub port: u16,
    pub user: String,
}

/// [`CliSession`] over the system ssh client, one connection per
/// command.
///
/// Authentication relies on the operator's key setup; BatchMode keeps
/// a missing key from hanging on a password prompt.
pub struct SshCliSession {
    target: SshTarget,
}

impl SshCliSession {
    pub fn new(target: SshTarget) -> Self {
        SshCliSession { target }
    }
}

#[async_trait]
impl CliSession for SshCliSession {
    async fn run(&self, command: &str) -> DeviceResult<Option<String>> {
        debug!(switch = %self.target.switch, command, "running switch command");

        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=no")
            .arg("-p")
            .arg(self.target.port.to_string())
            .arg(format!("{}@{}", self.target.user, self.target.host))
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| DeviceError::session(&self.target.switch, err.to_string()))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DeviceError::session(
                &self.target.switch,
                format!("ssh exited with code {code}: {stderr}"),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.trim().is_empty() {
            debug!(switch = %self.target.switch, command, "command produced no output");
            return Ok(None);
        }
        Ok(Some(stdout))
    }
}
