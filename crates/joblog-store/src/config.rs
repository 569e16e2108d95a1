use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use joblog_core::Clock;
use serde::{Deserialize, Serialize};

use crate::file::FileJobProgressLog;
use crate::noop::NoopJobProgressLog;
use crate::traits::JobProgressLog;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobLogConfig {
    pub log: LogConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// When false, events are accepted and dropped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Backing file; `~` is expanded.
    pub path: String,
}

fn default_enabled() -> bool {
    true
}

impl JobLogConfig {
    pub fn default_for(root: &Path) -> Self {
        Self {
            log: LogConfig {
                enabled: true,
                path: root.join(".joblog").join("job-progress.xml").display().to_string(),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: JobLogConfig = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log.path).to_string())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".joblog").join("joblog.toml")
    }
}

/// File-backed log when enabled, otherwise a log that records nothing.
pub fn open_job_log(cfg: &JobLogConfig, clock: Arc<dyn Clock>) -> crate::error::Result<Box<dyn JobProgressLog>> {
    if !cfg.log.enabled {
        tracing::info!("job history disabled");
        return Ok(Box::new(NoopJobProgressLog::new()));
    }
    let log = FileJobProgressLog::open_with_clock(cfg.log_path(), clock)?;
    Ok(Box::new(log))
}
