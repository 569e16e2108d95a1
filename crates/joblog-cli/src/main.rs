use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use joblog_core::{JobEvent, SystemClock};
use joblog_store::{open_job_log, JobLogConfig, JobProgressLog};

#[derive(Parser)]
#[command(name = "joblog", version)]
struct Cli {
    /// Config file (defaults to .joblog/joblog.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config under .joblog/
    Init,

    /// Record that a job is starting
    Start {
        job: String,
        #[arg(long = "software-version", short = 's')]
        software_version: String,
    },

    /// Record that a job completed
    Complete {
        job: String,
        #[arg(long = "software-version", short = 's')]
        software_version: String,
    },

    /// Show the last start and completion of a job
    Status { job: String },

    /// List every recorded job
    List {
        #[arg(long)]
        json: bool,
    },

    /// Run a command as a job: log the start, run it, log the completion if it succeeds
    Run {
        job: String,
        #[arg(long = "software-version", short = 's')]
        software_version: String,
        /// Skip the command if a completion under this software version is already recorded
        #[arg(long)]
        skip_if_completed: bool,
        #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
        cmd: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;
    let config = cli.config.as_deref();

    match cli.cmd {
        Command::Init => {
            let path = config.map(Path::to_path_buf).unwrap_or_else(|| JobLogConfig::config_path(&root));
            if path.exists() {
                println!("Config already present at {}", path.display());
            } else {
                JobLogConfig::default_for(&root).save_to(&path)?;
                println!("Initialized joblog config at {}", path.display());
            }
        }
        Command::Start { job, software_version } => {
            let mut log = open_log(config, &root)?;
            log.log_job_starting(&job, &software_version)?;
            println!("Started {} ({})", job, software_version);
        }
        Command::Complete { job, software_version } => {
            let mut log = open_log(config, &root)?;
            log.log_job_completed(&job, &software_version)?;
            println!("Completed {} ({})", job, software_version);
        }
        Command::Status { job } => {
            let log = open_log(config, &root)?;
            match log.entry(&job) {
                None => println!("{}: never run", job),
                Some(entry) => {
                    println!("{}", entry.job_name);
                    println!("  last started:   {}", describe(entry.last_started.as_ref()));
                    println!("  last completed: {}", describe(entry.last_completed.as_ref()));
                    if entry.last_started.is_some() && !entry.completed_since_last_start() {
                        println!("  interrupted: started without a later completion");
                    }
                }
            }
        }
        Command::List { json } => {
            let log = open_log(config, &root)?;
            let entries: Vec<_> = log.entries().collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("Jobs: {}", entries.len());
                for e in entries {
                    println!(
                        "- {} started={} completed={}",
                        e.job_name,
                        describe(e.last_started.as_ref()),
                        describe(e.last_completed.as_ref())
                    );
                }
            }
        }
        Command::Run { job, software_version, skip_if_completed, cmd } => {
            let mut log = open_log(config, &root)?;
            run_job(log.as_mut(), &job, &software_version, skip_if_completed, &cmd)?;
        }
    }

    Ok(())
}

fn open_log(config: Option<&Path>, root: &Path) -> anyhow::Result<Box<dyn JobProgressLog>> {
    let cfg = load_config(config, root)?;
    let log = open_job_log(&cfg, Arc::new(SystemClock))
        .with_context(|| format!("open job log {}", cfg.log_path().display()))?;
    Ok(log)
}

fn load_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<JobLogConfig> {
    if let Some(path) = explicit {
        return JobLogConfig::load_from(path);
    }
    let path = JobLogConfig::config_path(root);
    if path.exists() {
        JobLogConfig::load_from(&path)
    } else {
        Ok(JobLogConfig::default_for(root))
    }
}

fn run_job(
    log: &mut dyn JobProgressLog,
    job: &str,
    software_version: &str,
    skip_if_completed: bool,
    cmd: &[String],
) -> anyhow::Result<()> {
    if skip_if_completed && log.last_completed_version(job) == Some(software_version) {
        println!("Skipping {}: already completed under {}", job, software_version);
        return Ok(());
    }

    let Some((program, args)) = cmd.split_first() else {
        bail!("no command given for job {}", job);
    };

    log.log_job_starting(job, software_version)?;
    tracing::info!(job, program = %program, "running job");
    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("run {} {:?}", program, args))?;
    if !status.success() {
        bail!("job {} failed: {}", job, status);
    }
    log.log_job_completed(job, software_version)?;
    println!("Completed {} ({})", job, software_version);
    Ok(())
}

fn describe(event: Option<&JobEvent>) -> String {
    match event {
        Some(e) => format!("{} ms ({})", e.at, e.version),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joblog_core::ManualClock;
    use joblog_store::FileJobProgressLog;
    use tempfile::tempdir;

    #[test]
    fn parses_run_with_trailing_command() {
        let cli = Cli::try_parse_from([
            "joblog", "run", "unpack", "-s", "5.1", "--skip-if-completed", "--", "tar", "-xf", "a.tar",
        ])
        .unwrap();
        match cli.cmd {
            Command::Run { job, software_version, skip_if_completed, cmd } => {
                assert_eq!(job, "unpack");
                assert_eq!(software_version, "5.1");
                assert!(skip_if_completed);
                assert_eq!(cmd, ["tar", "-xf", "a.tar"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn start_requires_software_version() {
        assert!(Cli::try_parse_from(["joblog", "start", "unpack"]).is_err());
    }

    #[test]
    fn describe_formats_events() {
        assert_eq!(describe(None), "never");
        assert_eq!(describe(Some(&JobEvent::new(7, "v1"))), "7 ms (v1)");
    }

    #[test]
    fn load_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let cfg = load_config(None, dir.path()).unwrap();
        assert!(cfg.log.enabled);
        assert_eq!(cfg.log_path(), dir.path().join(".joblog").join("job-progress.xml"));
    }

    #[cfg(unix)]
    #[test]
    fn run_job_records_start_and_completion() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(100));
        let mut log = FileJobProgressLog::open_with_clock(dir.path().join("log.xml"), clock).unwrap();
        run_job(&mut log, "noop", "1.0", false, &["true".to_string()]).unwrap();
        assert_eq!(log.last_started_time("noop"), Some(100));
        assert_eq!(log.last_completed_version("noop"), Some("1.0"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_run_leaves_only_the_start() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(100));
        let mut log = FileJobProgressLog::open_with_clock(dir.path().join("log.xml"), clock).unwrap();
        assert!(run_job(&mut log, "broken", "1.0", false, &["false".to_string()]).is_err());
        assert_eq!(log.last_started_version("broken"), Some("1.0"));
        assert_eq!(log.last_completed_time("broken"), None);
    }

    #[test]
    fn skip_if_completed_under_same_version() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(100));
        let mut log = FileJobProgressLog::open_with_clock(dir.path().join("log.xml"), clock).unwrap();
        log.log_job_completed("unpack", "2.0").unwrap();
        // would fail to spawn if it were not skipped
        run_job(&mut log, "unpack", "2.0", true, &["/nonexistent/program".to_string()]).unwrap();
        assert_eq!(log.last_started_time("unpack"), None);
    }
}
