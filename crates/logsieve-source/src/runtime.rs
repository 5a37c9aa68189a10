//! Container runtime used to start and stop the log source.

use std::process::Stdio;

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};
use crate::spec::SourceSpec;

/// A started log source and the endpoint it can be reached on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceHandle {
    /// Runtime-assigned container ID
    pub id: String,

    /// Host to connect to
    pub host: String,

    /// Port to connect to
    pub port: u16,
}

impl SourceHandle {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port`, for display and error messages
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Starts and stops log-producing containers
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Start a detached container for `spec` and return where to reach it.
    fn start<'a>(&'a self, spec: &'a SourceSpec) -> BoxFuture<'a, Result<SourceHandle>>;

    /// Stop a container. Stopping one that is already gone succeeds.
    fn stop<'a>(&'a self, handle: &'a SourceHandle) -> BoxFuture<'a, Result<()>>;
}

/// Runtime driven through a Docker-compatible command line (`docker`, `podman`)
#[derive(Clone, Debug)]
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments for `run`, image last
    fn run_args(spec: &SourceSpec) -> Vec<String> {
        let mut args = vec!["run".to_string(), "-d".to_string()];
        if spec.remove_on_stop {
            args.push("--rm".to_string());
        }
        args.push("-p".to_string());
        args.push(spec.port_mapping());
        args.push(spec.image.clone());
        args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::null());
        cmd
    }

    async fn run_container(&self, spec: &SourceSpec) -> Result<SourceHandle> {
        let mut cmd = self.command();
        cmd.args(Self::run_args(spec));

        debug!(cmd = ?cmd, "executing container run");

        let output = cmd.output().await.map_err(|e| {
            SourceError::StartFailed(format!("could not execute {}: {e}", self.binary))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SourceError::StartFailed(stderr));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(SourceError::StartFailed(
                "runtime returned no container ID".to_string(),
            ));
        }

        let port = match spec.host_port {
            Some(port) => port,
            None => match self.published_port(&id, spec).await {
                Ok(port) => port,
                Err(e) => {
                    // Not reachable, so don't leave it running
                    let handle = SourceHandle::new(id, spec.endpoint_host.clone(), 0);
                    if let Err(stop_err) = self.stop_container(&handle).await {
                        warn!(container = %handle.id, error = %stop_err, "failed to stop unreachable log source");
                    }
                    return Err(e);
                }
            },
        };

        Ok(SourceHandle::new(id, spec.endpoint_host.clone(), port))
    }

    /// Ask the runtime which host port the container port was published on
    async fn published_port(&self, id: &str, spec: &SourceSpec) -> Result<u16> {
        let output = self
            .command()
            .args(["port", id, spec.container_port_spec().as_str()])
            .output()
            .await
            .map_err(|e| {
                SourceError::StartFailed(format!("could not execute {}: {e}", self.binary))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SourceError::StartFailed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_published_port(&stdout).ok_or_else(|| {
            SourceError::StartFailed(format!(
                "no published host port for {} in {:?}",
                spec.container_port_spec(),
                stdout.trim()
            ))
        })
    }

    async fn stop_container(&self, handle: &SourceHandle) -> Result<()> {
        let output = self
            .command()
            .args(["stop", handle.id.as_str()])
            .output()
            .await
            .map_err(|e| SourceError::StopFailed {
                id: handle.id.clone(),
                reason: format!("could not execute {}: {e}", self.binary),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        // Already removed (e.g. by --rm) counts as stopped
        if stderr.contains("No such container") {
            return Ok(());
        }

        Err(SourceError::StopFailed {
            id: handle.id.clone(),
            reason: stderr,
        })
    }
}

/// Host port from `port` output such as `0.0.0.0:49153` or `[::]:49153`,
/// one binding per line
fn parse_published_port(output: &str) -> Option<u16> {
    output
        .lines()
        .filter_map(|line| line.trim().rsplit_once(':'))
        .find_map(|(_, port)| port.parse().ok())
}

impl ContainerRuntime for DockerCli {
    fn start<'a>(&'a self, spec: &'a SourceSpec) -> BoxFuture<'a, Result<SourceHandle>> {
        Box::pin(self.run_container(spec))
    }

    fn stop<'a>(&'a self, handle: &'a SourceHandle) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.stop_container(handle))
    }
}
