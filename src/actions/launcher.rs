//! Opening URLs and launching programs on the host

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::HandlerError;

/// Host operating system family, used to pick launch commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Side-effecting host operations used by action handlers
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Open a URL in the default browser
    async fn open_url(&self, url: &str) -> Result<(), HandlerError>;

    /// Run a program to completion
    async fn run(&self, program: &str, args: &[String]) -> Result<(), HandlerError>;

    /// Start a program and return without waiting for it to exit
    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<(), HandlerError>;
}

/// Launcher backed by the platform's own opener commands
pub struct SystemLauncher {
    platform: Platform,
}

impl SystemLauncher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn open_url(&self, url: &str) -> Result<(), HandlerError> {
        let (program, args): (&str, Vec<String>) = match self.platform {
            Platform::Windows => (
                "cmd",
                vec!["/C".into(), "start".into(), String::new(), url.into()],
            ),
            Platform::MacOs => ("open", vec![url.into()]),
            Platform::Linux => ("xdg-open", vec![url.into()]),
        };
        self.run(program, &args).await
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<(), HandlerError> {
        debug!(program, ?args, "running host command");

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| HandlerError::Launch {
                target: program.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HandlerError::Launch {
                target: program.to_string(),
                reason: format!("exited with {status}"),
            })
        }
    }

    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<(), HandlerError> {
        debug!(program, ?args, "starting host program");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HandlerError::Launch {
                target: program.to_string(),
                reason: e.to_string(),
            })?;

        // Reap the child whenever it exits
        let program = program.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(%program, %status, "host program exited"),
                Err(e) => warn!(%program, error = %e, "failed to wait for host program"),
            }
        });

        Ok(())
    }
}
