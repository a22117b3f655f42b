use std::fmt;
use std::str::FromStr;

use crate::error::PolicyParseError;

/// Where a record is placed when it enters the ready queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// FIFO append.
    Tail,
    /// Ahead of everything currently queued.
    Front,
    /// Before the first entry with a strictly greater score.
    ScoreAdmission,
    /// At the front if nothing queued scores lower, otherwise before the
    /// first entry with a greater or equal score.
    ScoreReinsertion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulingPolicy {
    Fcfs,
    Sjf,
    Rr,
    Rr30,
    Aging,
}

impl SchedulingPolicy {
    /// Instructions a process may run before preemption. Zero runs it to completion.
    pub fn quantum(self) -> usize {
        match self {
            SchedulingPolicy::Fcfs | SchedulingPolicy::Sjf => 0,
            SchedulingPolicy::Rr => 2,
            SchedulingPolicy::Rr30 => 30,
            SchedulingPolicy::Aging => 1,
        }
    }

    pub fn admission(self) -> Insertion {
        match self {
            SchedulingPolicy::Fcfs | SchedulingPolicy::Rr | SchedulingPolicy::Rr30 => Insertion::Tail,
            SchedulingPolicy::Sjf | SchedulingPolicy::Aging => Insertion::ScoreAdmission,
        }
    }

    /// Placement for a preempted process, `None` for run-to-completion policies.
    pub fn requeue(self) -> Option<Insertion> {
        match self {
            SchedulingPolicy::Fcfs | SchedulingPolicy::Sjf => None,
            SchedulingPolicy::Rr | SchedulingPolicy::Rr30 => Some(Insertion::Tail),
            SchedulingPolicy::Aging => Some(Insertion::ScoreReinsertion),
        }
    }

    /// Whether queued records age each time a process is preempted.
    pub fn ages(self) -> bool {
        self == SchedulingPolicy::Aging
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulingPolicy::Fcfs => "FCFS",
            SchedulingPolicy::Sjf => "SJF",
            SchedulingPolicy::Rr => "RR",
            SchedulingPolicy::Rr30 => "RR30",
            SchedulingPolicy::Aging => "AGING",
        };
        f.write_str(name)
    }
}

impl FromStr for SchedulingPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FCFS" => Ok(SchedulingPolicy::Fcfs),
            "SJF" => Ok(SchedulingPolicy::Sjf),
            "RR" => Ok(SchedulingPolicy::Rr),
            "RR30" => Ok(SchedulingPolicy::Rr30),
            "AGING" => Ok(SchedulingPolicy::Aging),
            _ => Err(PolicyParseError(s.to_string())),
        }
    }
}
