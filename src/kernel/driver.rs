use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use log::info;

use super::*;

use crate::config::{SimulatorConfig, MAX_SCRIPTS};
use crate::error::DriverError;
use crate::io::{loader, Disk, Interpreter};

/// Per-process figures, with time measured in instructions executed system-wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessStats {
    pub pid: Pid,
    pub length: usize,
    pub dispatches: usize,
    pub turnaround: u64,
}

/// Outcome of one simulator run.
#[derive(Debug)]
pub struct Report {
    pub policy: SchedulingPolicy,
    pub trace: Vec<DispatchRecord>,
    /// In completion order.
    pub stats: Vec<ProcessStats>,
}

impl Report {
    fn new(policy: SchedulingPolicy, trace: Vec<DispatchRecord>, lengths: &HashMap<Pid, usize>) -> Report {
        let mut clock = 0u64;
        let mut dispatches: HashMap<Pid, usize> = HashMap::new();
        let mut stats = Vec::new();

        for record in &trace {
            clock += record.executed as u64;
            *dispatches.entry(record.pid).or_insert(0) += 1;

            if record.outcome == DispatchOutcome::Completed {
                stats.push(ProcessStats {
                    pid: record.pid,
                    length: lengths.get(&record.pid).copied().unwrap_or_default(),
                    dispatches: dispatches[&record.pid],
                    turnaround: clock,
                });
            }
        }

        Report { policy, trace, stats }
    }

    pub fn fault_count(&self) -> usize {
        self.trace.iter().map(|record| record.faults.len()).sum()
    }

    pub fn avg_turnaround(&self) -> f64 {
        if self.stats.is_empty() {
            return 0.0;
        }
        let total: u64 = self.stats.iter().map(|stats| stats.turnaround).sum();
        total as f64 / self.stats.len() as f64
    }

    pub fn avg_waiting(&self) -> f64 {
        if self.stats.is_empty() {
            return 0.0;
        }
        let total: u64 = self
            .stats
            .iter()
            .map(|stats| stats.turnaround.saturating_sub(stats.length as u64))
            .sum();
        total as f64 / self.stats.len() as f64
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats for executed processes ({} scheduling):", self.policy)?;
        writeln!(f, "... PID | Length | Dispatches | Turnaround (instr)")?;
        writeln!(f, "...-----|--------|------------|-------------------")?;
        for stats in &self.stats {
            writeln!(
                f,
                "... {:03} | {:06} | {:010} | {:05}",
                stats.pid, stats.length, stats.dispatches, stats.turnaround
            )?;
        }
        writeln!(f, "... Avg turnaround: {:.2}", self.avg_turnaround())?;
        writeln!(f, "... Avg waiting:    {:.2}", self.avg_waiting())?;
        write!(f, "... Failed instructions: {}", self.fault_count())
    }
}

/// Holds the virtual system: loads the scripts, admits them as processes and
/// runs them to completion in either dispatch mode.
pub struct Driver {
    config: SimulatorConfig,
    disk: Arc<RwLock<Disk>>,
    cpu: Cpu,
    lts: LongTermScheduler,
}

impl Driver {
    pub fn new(config: SimulatorConfig, interpreter: Arc<dyn Interpreter>) -> Driver {
        let disk = Arc::new(RwLock::new(Disk::new()));
        let table = Arc::new(ProcessTable::new(config.max_processes));

        Driver {
            cpu: Cpu::new(disk.clone(), interpreter),
            lts: LongTermScheduler::new(table),
            disk,
            config,
        }
    }

    pub fn start(&mut self) -> Result<Report, DriverError> {
        let requests = self.load_programs()?;
        let policy = self.config.policy;
        let mut lengths = HashMap::new();

        let trace = match self.config.worker_count() {
            None => {
                info!("Running {} processes single-threaded ({})", requests.len(), policy);
                let mut sts = ShortTermScheduler::new(policy, self.lts.clone());
                for request in requests {
                    let pid = sts.schedule_process(request)?;
                    lengths.insert(pid, request.program.length);
                }
                sts.run(&self.cpu)
            }
            Some(workers) => {
                info!("Running {} processes on {} workers ({})", requests.len(), workers, policy);
                let pool = WorkerPool::start(workers, policy, self.cpu.clone(), self.lts.clone());
                let pids = match pool.schedule_batch(requests.iter().copied()) {
                    Ok(pids) => pids,
                    Err(err) => {
                        pool.shutdown();
                        return Err(err.into());
                    }
                };
                for (pid, request) in pids.into_iter().zip(&requests) {
                    lengths.insert(pid, request.program.length);
                }
                pool.await_all_procs_finished();
                pool.shutdown()
            }
        };

        info!("All processes finished");
        Ok(Report::new(policy, trace, &lengths))
    }

    /// Loads every script onto a fresh disk and builds the spawn requests,
    /// with the background batch, if any, placed at the front.
    fn load_programs(&self) -> Result<Vec<SpawnRequest>, DriverError> {
        let scripts = &self.config.scripts;
        if scripts.is_empty() || scripts.len() > MAX_SCRIPTS {
            return Err(DriverError::ScriptCount {
                given: scripts.len(),
                max: MAX_SCRIPTS,
            });
        }

        let mut seen = HashSet::new();
        for script in scripts.iter().chain(self.config.background.iter()) {
            if !seen.insert(script) {
                return Err(DriverError::DuplicateScript(script.clone()));
            }
        }

        let mut disk = self.disk.write().expect("Disk lock poisoned");
        disk.clear();

        let mut requests = Vec::new();
        for script in scripts {
            let program = loader::append_program(&mut disk, script)?;
            requests.push(SpawnRequest::new(program, self.config.policy));
        }

        if let Some(background) = &self.config.background {
            let program = loader::append_program(&mut disk, background)?;
            requests.push(SpawnRequest::new(program, self.config.policy).at_front());
        }

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::error::LoadError;
    use crate::io::ScriptInterpreter;

    struct Scripts {
        dir: TempDir,
    }

    impl Scripts {
        fn new() -> Scripts {
            Scripts {
                dir: TempDir::new().unwrap(),
            }
        }

        fn write(&self, name: &str, lines: &[&str]) -> PathBuf {
            let path = self.dir.path().join(name);
            let mut file = std::fs::File::create(&path).unwrap();
            for line in lines {
                writeln!(file, "{line}").unwrap();
            }
            path
        }
    }

    fn run(config: SimulatorConfig) -> (Result<Report, DriverError>, String) {
        let interpreter = Arc::new(ScriptInterpreter::new(Vec::new()));
        let result = Driver::new(config, interpreter.clone()).start();
        let interpreter = Arc::try_unwrap(interpreter).ok().unwrap();
        (result, String::from_utf8(interpreter.into_output()).unwrap())
    }

    #[test]
    fn test_driver_round_robin_interleaves_output() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["echo a1", "echo a2", "echo a3"]);
        let b = scripts.write("b.txt", &["echo b1", "echo b2"]);

        let (report, output) = run(SimulatorConfig::new(vec![a, b], SchedulingPolicy::Rr));
        let report = report.unwrap();

        assert_eq!(output, "a1\na2\nb1\nb2\na3\n");
        let pids: Vec<Pid> = report.stats.iter().map(|stats| stats.pid).collect();
        assert_eq!(pids, vec![2, 1]);
        assert_eq!(report.stats[0].turnaround, 4);
        assert_eq!(report.stats[1].turnaround, 5);
        assert_eq!(report.stats[1].dispatches, 2);
    }

    #[test]
    fn test_driver_sjf_runs_shortest_script_first() {
        let scripts = Scripts::new();
        let long = scripts.write("long.txt", &["echo l1", "echo l2", "echo l3"]);
        let short = scripts.write("short.txt", &["echo s1"]);

        let (report, output) = run(SimulatorConfig::new(vec![long, short], SchedulingPolicy::Sjf));

        assert_eq!(output, "s1\nl1\nl2\nl3\n");
        assert_eq!(report.unwrap().avg_turnaround(), 2.5);
    }

    #[test]
    fn test_driver_background_runs_first() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["echo a"]);
        let batch = scripts.write("batch.txt", &["set x 1", "echo $x"]);

        let mut config = SimulatorConfig::new(vec![a], SchedulingPolicy::Fcfs);
        config.background = Some(batch);
        let (report, output) = run(config);

        assert_eq!(output, "1\na\n");
        assert_eq!(report.unwrap().stats[0].pid, 2);
    }

    #[test]
    fn test_driver_failures_are_reported_not_fatal() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["bogus", "print missing", "echo ok"]);

        let (report, output) = run(SimulatorConfig::new(vec![a], SchedulingPolicy::Fcfs));
        let report = report.unwrap();

        assert_eq!(output, "ok\n");
        assert_eq!(report.fault_count(), 2);
        assert_eq!(report.stats.len(), 1);
    }

    #[test]
    fn test_driver_multi_worker() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["set a 1"; 10]);
        let b = scripts.write("b.txt", &["set b 2"; 20]);
        let c = scripts.write("c.txt", &["set c 3"; 30]);

        let mut config = SimulatorConfig::new(vec![a, b, c], SchedulingPolicy::Rr30);
        config.mt = true;
        let (report, _) = run(config);
        let report = report.unwrap();

        assert_eq!(report.stats.len(), 3);
        let executed: usize = report.trace.iter().map(|record| record.executed).sum();
        assert_eq!(executed, 60);
        assert_eq!(report.fault_count(), 0);
    }

    #[test]
    fn test_driver_multi_worker_admits_whole_batch_first() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["echo a"]);
        let batch = scripts.write("batch.txt", &["set x 1", "echo $x"]);
        let long = scripts.write("long.txt", &["echo l1", "echo l2", "echo l3", "echo l4", "echo l5"]);
        let short = scripts.write("short.txt", &["echo s1"]);

        for _ in 0..20 {
            let mut config = SimulatorConfig::new(vec![a.clone()], SchedulingPolicy::Fcfs);
            config.background = Some(batch.clone());
            config.mt = true;
            config.workers = 1;
            let (report, output) = run(config);
            assert_eq!(output, "1\na\n");
            assert_eq!(report.unwrap().stats[0].pid, 2);

            let mut config = SimulatorConfig::new(vec![long.clone(), short.clone()], SchedulingPolicy::Sjf);
            config.mt = true;
            config.workers = 1;
            let (_, output) = run(config);
            assert_eq!(output, "s1\nl1\nl2\nl3\nl4\nl5\n");
        }
    }

    #[test]
    fn test_driver_rejects_duplicate_scripts() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["echo a"]);

        let (report, _) = run(SimulatorConfig::new(vec![a.clone(), a], SchedulingPolicy::Fcfs));

        assert!(matches!(report, Err(DriverError::DuplicateScript(_))));
    }

    #[test]
    fn test_driver_rejects_script_count() {
        let (report, _) = run(SimulatorConfig::new(Vec::new(), SchedulingPolicy::Fcfs));
        assert!(matches!(report, Err(DriverError::ScriptCount { given: 0, max: MAX_SCRIPTS })));
    }

    #[test]
    fn test_driver_missing_script() {
        let (report, _) = run(SimulatorConfig::new(vec![PathBuf::from("nope.txt")], SchedulingPolicy::Fcfs));
        assert!(matches!(report, Err(DriverError::Load(LoadError::Io { .. }))));
    }

    #[test]
    fn test_driver_process_table_full() {
        let scripts = Scripts::new();
        let a = scripts.write("a.txt", &["echo a"]);
        let b = scripts.write("b.txt", &["echo b"]);

        let mut config = SimulatorConfig::new(vec![a, b], SchedulingPolicy::Fcfs);
        config.max_processes = 1;
        let (report, _) = run(config);

        assert!(matches!(
            report,
            Err(DriverError::Spawn(crate::error::SpawnError::ProcessTableFull { capacity: 1 }))
        ));
    }

    #[test]
    fn test_report_display() {
        let report = Report::new(
            SchedulingPolicy::Fcfs,
            vec![DispatchRecord {
                pid: 1,
                executed: 3,
                outcome: DispatchOutcome::Completed,
                faults: Vec::new(),
            }],
            &HashMap::from([(1, 3)]),
        );

        let text = report.to_string();

        assert!(text.starts_with("Stats for executed processes (FCFS scheduling):"));
        assert!(text.contains("... 001 | 000003 | 0000000001 | 00003"));
        assert_eq!(report.avg_waiting(), 0.0);
    }
}
