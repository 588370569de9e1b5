//! Error taxonomy shared by every EchoBoot operation.
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for echoboot.
#[derive(Debug, Error)]
pub enum Error {
    /// A listing could not be fetched, or the server answered with a non-2xx status.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A catalog or target file is not a valid JSON array of objects.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A catalog, schema or config file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An external tool exited with a non-zero status or could not be started.
    #[error("command failed: {command}\n{stderr}")]
    CommandFailure { command: String, stderr: String },

    /// Malformed configuration file.
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// The schema document itself is not a usable JSON schema.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// A required volume is not mounted.
    #[error("could not find a mount point for the {0} partition")]
    MountNotFound(String),

    /// Removable-device discovery could not run.
    #[error("device discovery failed: {0}")]
    Discovery(String),

    /// An operator prompt could not be shown or answered.
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("generic i/o error")]
    Io(#[from] std::io::Error),

    #[error("unsupported on this platform: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
