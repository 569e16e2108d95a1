use joblog_core::{EpochMs, LogEntry};

use crate::error::Result;

/// Latest start/completion per job. Mutations are persisted before they return;
/// reads never touch the disk.
pub trait JobProgressLog: Send + Sync {
    /// Record that `job_name` is starting under `software_version`.
    fn log_job_starting(&mut self, job_name: &str, software_version: &str) -> Result<()>;

    /// Record that `job_name` completed under `software_version`. A prior start is not required.
    fn log_job_completed(&mut self, job_name: &str, software_version: &str) -> Result<()>;

    fn entry(&self, job_name: &str) -> Option<&LogEntry>;

    /// All entries in the order their job names were first seen.
    fn entries(&self) -> Box<dyn Iterator<Item = &LogEntry> + '_>;

    fn last_started_time(&self, job_name: &str) -> Option<EpochMs> {
        self.entry(job_name).and_then(LogEntry::last_started_time)
    }

    fn last_started_version(&self, job_name: &str) -> Option<&str> {
        self.entry(job_name).and_then(LogEntry::last_started_version)
    }

    fn last_completed_time(&self, job_name: &str) -> Option<EpochMs> {
        self.entry(job_name).and_then(LogEntry::last_completed_time)
    }

    fn last_completed_version(&self, job_name: &str) -> Option<&str> {
        self.entry(job_name).and_then(LogEntry::last_completed_version)
    }
}
