use std::path::PathBuf;

use clap::builder::TypedValueParser;
use clap::Parser;
use log::LevelFilter;

use crate::kernel::SchedulingPolicy;

pub const MAX_SCRIPTS: usize = 3;
pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_MAX_PROCESSES: usize = 100;

/// Runs scripts as simulated processes under a chosen scheduling policy.
#[derive(Clone, Debug, Parser)]
#[command(name = "script-scheduler", version)]
pub struct SimulatorConfig {
    /// Script files to run as processes (one to three).
    #[arg(required = true, num_args = 1..=MAX_SCRIPTS)]
    pub scripts: Vec<PathBuf>,

    /// FCFS, SJF, RR, RR30 or AGING.
    #[arg(short, long, default_value_t = SchedulingPolicy::Fcfs)]
    pub policy: SchedulingPolicy,

    /// Batch script that runs ahead of everything else.
    #[arg(short, long)]
    pub background: Option<PathBuf>,

    /// Dispatch from a pool of worker threads.
    #[arg(long)]
    pub mt: bool,

    /// Worker threads in multi-worker mode.
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub workers: usize,

    /// Most processes alive at once.
    #[arg(long, default_value_t = DEFAULT_MAX_PROCESSES)]
    pub max_processes: usize,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SimulatorConfig {
    pub fn new(scripts: Vec<PathBuf>, policy: SchedulingPolicy) -> SimulatorConfig {
        SimulatorConfig {
            scripts,
            policy,
            background: None,
            mt: false,
            workers: DEFAULT_WORKERS,
            max_processes: DEFAULT_MAX_PROCESSES,
            verbose: 0,
        }
    }

    /// Worker count when running multi-worker, `None` for single-threaded dispatch.
    pub fn worker_count(&self) -> Option<usize> {
        self.mt.then_some(self.workers)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SimulatorConfig::try_parse_from(["script-scheduler", "a.txt"]).unwrap();
        assert_eq!(config.scripts, vec![PathBuf::from("a.txt")]);
        assert_eq!(config.policy, SchedulingPolicy::Fcfs);
        assert_eq!(config.worker_count(), None);
        assert_eq!(config.max_processes, DEFAULT_MAX_PROCESSES);
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_config_full() {
        let config = SimulatorConfig::try_parse_from([
            "script-scheduler",
            "a.txt",
            "b.txt",
            "--policy",
            "aging",
            "--background",
            "batch.txt",
            "--mt",
            "--workers",
            "4",
            "-vv",
        ])
        .unwrap();
        assert_eq!(config.scripts.len(), 2);
        assert_eq!(config.policy, SchedulingPolicy::Aging);
        assert_eq!(config.background, Some(PathBuf::from("batch.txt")));
        assert_eq!(config.worker_count(), Some(4));
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_config_rejects_bad_input() {
        assert!(SimulatorConfig::try_parse_from(["script-scheduler"]).is_err());
        assert!(SimulatorConfig::try_parse_from(["script-scheduler", "a", "b", "c", "d"]).is_err());
        assert!(SimulatorConfig::try_parse_from(["script-scheduler", "a", "--policy", "LOTTERY"]).is_err());
        assert!(SimulatorConfig::try_parse_from(["script-scheduler", "a", "--workers", "0"]).is_err());
    }
}
