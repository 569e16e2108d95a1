use serde::{Deserialize, Serialize};

use crate::time::EpochMs;

/// A single recorded event: when it happened and which software version was running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    pub at: EpochMs,
    pub version: String,
}

impl JobEvent {
    pub fn new(at: EpochMs, version: impl Into<String>) -> Self {
        Self { at, version: version.into() }
    }
}

/// Latest start and latest completion of one job. Older events are overwritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_started: Option<JobEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<JobEvent>,
}

impl LogEntry {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            last_started: None,
            last_completed: None,
        }
    }

    pub fn last_started_time(&self) -> Option<EpochMs> {
        self.last_started.as_ref().map(|e| e.at)
    }

    pub fn last_started_version(&self) -> Option<&str> {
        self.last_started.as_ref().map(|e| e.version.as_str())
    }

    pub fn last_completed_time(&self) -> Option<EpochMs> {
        self.last_completed.as_ref().map(|e| e.at)
    }

    pub fn last_completed_version(&self) -> Option<&str> {
        self.last_completed.as_ref().map(|e| e.version.as_str())
    }

    /// True when the job has a recorded completion that is not older than its last start.
    pub fn completed_since_last_start(&self) -> bool {
        match (&self.last_started, &self.last_completed) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(s), Some(c)) => c.at >= s.at,
        }
    }
}
