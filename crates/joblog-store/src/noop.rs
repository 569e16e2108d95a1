use joblog_core::LogEntry;

use crate::error::Result;
use crate::traits::JobProgressLog;

/// Used when job history is disabled: accepts every event, remembers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopJobProgressLog;

impl NoopJobProgressLog {
    pub fn new() -> Self {
        Self
    }
}

impl JobProgressLog for NoopJobProgressLog {
    fn log_job_starting(&mut self, _job_name: &str, _software_version: &str) -> Result<()> {
        Ok(())
    }

    fn log_job_completed(&mut self, _job_name: &str, _software_version: &str) -> Result<()> {
        Ok(())
    }

    fn entry(&self, _job_name: &str) -> Option<&LogEntry> {
        None
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &LogEntry> + '_> {
        Box::new(std::iter::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_nothing() {
        let mut log = NoopJobProgressLog::new();
        log.log_job_starting("unpack", "1.0").unwrap();
        log.log_job_completed("unpack", "1.0").unwrap();
        assert_eq!(log.last_started_time("unpack"), None);
        assert_eq!(log.last_started_version("unpack"), None);
        assert_eq!(log.last_completed_time("unpack"), None);
        assert_eq!(log.last_completed_version("unpack"), None);
        assert_eq!(log.entries().count(), 0);
    }
}
