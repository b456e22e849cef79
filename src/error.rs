use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stage of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Generating,
    Writing,
    Reading,
    Closing,
    Reporting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Generating => "generate",
            Phase::Writing => "write",
            Phase::Reading => "read",
            Phase::Closing => "close",
            Phase::Reporting => "report",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{phase} failed for {}", path.display())]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to update progress")]
    Progress(#[source] io::Error),

    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProbeError {
    pub(crate) fn io(phase: Phase, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> ProbeError {
        let path = path.into();
        move |source| ProbeError::Io { phase, path, source }
    }
}
