//! On-disk representation of the job log.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <JobProgressLogImpl>
//!   <LogEntry jobName="unpack" lastStartedTime="1449828541000" lastStartedVersion="v1"/>
//! </JobProgressLogImpl>
//! ```
//!
//! Times are epoch milliseconds. Attributes for events that never happened are omitted.

use std::path::Path;

use joblog_core::{EpochMs, JobEvent, LogEntry};
use serde::{Deserialize, Serialize};

use crate::error::{EventKind, JobLogError, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const ATTR_LAST_STARTED_TIME: &str = "lastStartedTime";
const ATTR_LAST_COMPLETED_TIME: &str = "lastCompletedTime";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "JobProgressLogImpl")]
struct Document {
    #[serde(rename = "LogEntry", default)]
    entries: Vec<Record>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(rename = "@jobName", default, skip_serializing_if = "Option::is_none")]
    job_name: Option<String>,
    #[serde(rename = "@lastStartedTime", default, skip_serializing_if = "Option::is_none")]
    last_started_time: Option<String>,
    #[serde(rename = "@lastStartedVersion", default, skip_serializing_if = "Option::is_none")]
    last_started_version: Option<String>,
    #[serde(rename = "@lastCompletedTime", default, skip_serializing_if = "Option::is_none")]
    last_completed_time: Option<String>,
    #[serde(rename = "@lastCompletedVersion", default, skip_serializing_if = "Option::is_none")]
    last_completed_version: Option<String>,
}

impl From<&LogEntry> for Record {
    fn from(entry: &LogEntry) -> Self {
        Self {
            job_name: Some(entry.job_name.clone()),
            last_started_time: entry.last_started.as_ref().map(|e| e.at.to_string()),
            last_started_version: entry.last_started.as_ref().map(|e| e.version.clone()),
            last_completed_time: entry.last_completed.as_ref().map(|e| e.at.to_string()),
            last_completed_version: entry.last_completed.as_ref().map(|e| e.version.clone()),
        }
    }
}

impl Record {
    fn into_entry(self, path: &Path, index: usize) -> Result<LogEntry> {
        let job_name = match self.job_name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(JobLogError::MissingJobName {
                    path: path.to_path_buf(),
                    index,
                })
            }
        };

        let started_at = parse_time(path, &job_name, ATTR_LAST_STARTED_TIME, self.last_started_time)?;
        let completed_at = parse_time(path, &job_name, ATTR_LAST_COMPLETED_TIME, self.last_completed_time)?;
        let last_started = pair(path, &job_name, EventKind::Started, started_at, self.last_started_version)?;
        let last_completed = pair(path, &job_name, EventKind::Completed, completed_at, self.last_completed_version)?;

        Ok(LogEntry {
            job_name,
            last_started,
            last_completed,
        })
    }
}

/// An empty attribute counts as absent; anything else must be a bare integer.
fn parse_time(path: &Path, job: &str, attribute: &'static str, raw: Option<String>) -> Result<Option<EpochMs>> {
    let Some(raw) = raw else { return Ok(None) };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<EpochMs>()
        .map(Some)
        .map_err(|_| JobLogError::MalformedTimestamp {
            path: path.to_path_buf(),
            job: job.to_string(),
            attribute,
            value: raw.clone(),
        })
}

/// An empty version attribute reads back as missing, so a time without a version
/// means the version was the empty string. A version without a time is corrupt.
fn pair(path: &Path, job: &str, event: EventKind, at: Option<EpochMs>, version: Option<String>) -> Result<Option<JobEvent>> {
    match (at, version) {
        (Some(at), version) => Ok(Some(JobEvent {
            at,
            version: version.unwrap_or_default(),
        })),
        (None, None) => Ok(None),
        (None, Some(_)) => Err(JobLogError::IncompletePair {
            path: path.to_path_buf(),
            job: job.to_string(),
            event,
        }),
    }
}

/// Parse a job log document into entries, in document order. Duplicates are left to the caller.
/// A document with nothing but whitespace is an empty log.
pub fn decode(path: &Path, text: &str) -> Result<Vec<LogEntry>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Document = quick_xml::de::from_str(text).map_err(|source| JobLogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    doc.entries
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_entry(path, i))
        .collect()
}

/// Render the full document for `entries`, in iteration order.
pub fn encode<'a>(path: &Path, entries: impl IntoIterator<Item = &'a LogEntry>) -> Result<String> {
    let doc = Document {
        entries: entries.into_iter().map(Record::from).collect(),
    };

    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    let mut ser = quick_xml::se::Serializer::new(&mut out);
    ser.indent(' ', 2);
    doc.serialize(ser).map_err(|source| JobLogError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    out.push('\n');
    Ok(out)
}
