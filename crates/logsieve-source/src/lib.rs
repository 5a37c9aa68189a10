//! Log source for logsieve
//!
//! This crate starts a short-lived log-producing container, drains its
//! output over TCP, and always tears the container down again.

mod error;
mod runtime;
mod source;
mod spec;

pub use error::{Result, SourceError};
pub use runtime::{ContainerRuntime, DockerCli, SourceHandle};
pub use source::{ContainerLogSource, LOG_REQUEST, LogSource, split_lines};
pub use spec::{DEFAULT_CONTAINER_PORT, DEFAULT_IMAGE, SourceSpec};

// Re-export types used in our public API
pub use logsieve_types::RawLogLine;
