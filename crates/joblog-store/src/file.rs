use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use joblog_core::{Clock, JobEvent, LogEntry, SystemClock};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{JobLogError, Result};
use crate::format;
use crate::traits::JobProgressLog;

/// Job log kept in memory and mirrored to a single XML file.
/// The whole file is rewritten after every mutation.
pub struct FileJobProgressLog {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    entries: Vec<LogEntry>,
    index: HashMap<String, usize>,
}

impl FileJobProgressLog {
    /// Open the log at `path` using the wall clock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open the log at `path`. A missing file is an empty log; nothing is written until the first event.
    pub fn open_with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut log = Self {
            path: path.into(),
            clock,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        log.load()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn load(&mut self) -> Result<()> {
        self.entries.clear();
        self.index.clear();

        if !self.path.exists() {
            info!(path = %self.path.display(), "no job log yet; starting empty");
            return Ok(());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|source| JobLogError::Read {
            path: self.path.clone(),
            source,
        })?;

        for entry in format::decode(&self.path, &text)? {
            match self.index.get(&entry.job_name) {
                Some(&i) => {
                    warn!(path = %self.path.display(), job = %entry.job_name, "duplicate job entry; keeping the later one");
                    self.entries[i] = entry;
                }
                None => {
                    self.index.insert(entry.job_name.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
        debug!(path = %self.path.display(), entries = self.entries.len(), "loaded job log");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let dir = ensure_parent_dir(&self.path)?;
        let text = format::encode(&self.path, &self.entries)?;

        let write_err = |source: std::io::Error| JobLogError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        // the rename replaces the file, so carry its mode over
        if let Ok(meta) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(meta.permissions()).map_err(write_err)?;
        }
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved job log");
        Ok(())
    }

    fn entry_mut(&mut self, job_name: &str) -> Result<&mut LogEntry> {
        if job_name.is_empty() {
            return Err(JobLogError::EmptyJobName);
        }
        let i = match self.index.get(job_name) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.entries.push(LogEntry::new(job_name));
                self.index.insert(job_name.to_string(), i);
                i
            }
        };
        Ok(&mut self.entries[i])
    }
}

impl JobProgressLog for FileJobProgressLog {
    fn log_job_starting(&mut self, job_name: &str, software_version: &str) -> Result<()> {
        let at = self.clock.now_ms();
        self.entry_mut(job_name)?.last_started = Some(JobEvent::new(at, software_version));
        debug!(job = job_name, version = software_version, at, "job starting");
        self.save()
    }

    fn log_job_completed(&mut self, job_name: &str, software_version: &str) -> Result<()> {
        let at = self.clock.now_ms();
        self.entry_mut(job_name)?.last_completed = Some(JobEvent::new(at, software_version));
        debug!(job = job_name, version = software_version, at, "job completed");
        self.save()
    }

    fn entry(&self, job_name: &str) -> Option<&LogEntry> {
        self.index.get(job_name).map(|&i| &self.entries[i])
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &LogEntry> + '_> {
        Box::new(self.entries.iter())
    }
}

/// Make sure the directory holding `path` exists and return it.
fn ensure_parent_dir(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => return Ok(PathBuf::from(".")),
    };
    if dir.is_dir() {
        return Ok(dir);
    }
    if dir.exists() {
        return Err(JobLogError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::create_dir_all(&dir).map_err(|source| JobLogError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(dir)
}
