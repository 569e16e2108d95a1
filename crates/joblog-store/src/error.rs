use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = JobLogError> = std::result::Result<T, E>;

/// Which half of an entry a malformed attribute pair belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Completed,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Started => f.write_str("started"),
            EventKind::Completed => f.write_str("completed"),
        }
    }
}

/// Every variant is fatal for the operation that produced it. Absence of data is never an error.
#[derive(Debug, Error)]
pub enum JobLogError {
    #[error("cannot create parent directories of {path}: a component is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to create parent directories of {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read job log {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write job log {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse job log {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("failed to serialize job log {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: quick_xml::SeError,
    },

    #[error("job log {path}: entry {job:?} has non-numeric {attribute} {value:?}")]
    MalformedTimestamp {
        path: PathBuf,
        job: String,
        attribute: &'static str,
        value: String,
    },

    #[error("job log {path}: entry #{index} has no jobName")]
    MissingJobName { path: PathBuf, index: usize },

    #[error("job log {path}: entry {job:?} has a {event} version but no {event} time")]
    IncompletePair {
        path: PathBuf,
        job: String,
        event: EventKind,
    },

    #[error("job name must not be empty")]
    EmptyJobName,
}
