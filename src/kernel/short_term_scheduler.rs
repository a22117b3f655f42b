use log::debug;

use super::{
    Cpu, Fault, LongTermScheduler, Pid, ProcessControlBlock, ReadyQueue, SchedulingPolicy,
    SpawnRequest,
};

use crate::error::SpawnError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    Preempted,
}

/// One turn of one process on the CPU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRecord {
    pub pid: Pid,
    pub executed: usize,
    pub outcome: DispatchOutcome,
    pub faults: Vec<Fault>,
}

/// Runs one dispatched process for its quantum and retires or requeues it.
///
/// Shared by the single-threaded scheduler and the worker pool. `requeue`
/// receives the record only if it was preempted.
pub(crate) fn run_quantum<F>(
    cpu: &Cpu,
    lts: &LongTermScheduler,
    policy: SchedulingPolicy,
    mut pcb: ProcessControlBlock,
    requeue: F,
) -> DispatchRecord
where
    F: FnOnce(ProcessControlBlock),
{
    let pid = pcb.get_id();
    let burst = cpu.execute_process(&mut pcb, policy.quantum());

    let outcome = if pcb.is_complete() {
        lts.retire(pcb);
        DispatchOutcome::Completed
    } else {
        requeue(pcb);
        DispatchOutcome::Preempted
    };

    debug!(
        "Process {} ran {} instructions ({:?})",
        pid, burst.executed, outcome
    );

    DispatchRecord {
        pid,
        executed: burst.executed,
        outcome,
        faults: burst.faults,
    }
}

/// Single-threaded dispatcher: the sole owner of its ready queue.
pub struct ShortTermScheduler {
    queue: ReadyQueue,
    policy: SchedulingPolicy,
    lts: LongTermScheduler,
}

impl ShortTermScheduler {
    pub fn new(policy: SchedulingPolicy, lts: LongTermScheduler) -> ShortTermScheduler {
        ShortTermScheduler {
            queue: ReadyQueue::new(),
            policy,
            lts,
        }
    }

    /// Admits a new process. The active policy switches to the request's
    /// policy only while nothing is queued.
    pub fn schedule_process(&mut self, request: SpawnRequest) -> Result<Pid, SpawnError> {
        if request.policy != self.policy {
            if !self.queue.is_empty() {
                return Err(SpawnError::PolicyConflict {
                    active: self.policy,
                    requested: request.policy,
                });
            }
            self.policy = request.policy;
        }

        let (pcb, insertion) = self.lts.admit(&request)?;
        let pid = pcb.get_id();
        self.queue.insert(pcb, insertion);
        Ok(pid)
    }

    /// Dispatches the head of the queue for one quantum. `None` once the queue is idle.
    pub fn schedule_next(&mut self, cpu: &Cpu) -> Option<DispatchRecord> {
        let pcb = self.queue.pop_front()?;
        let policy = self.policy;
        let queue = &mut self.queue;

        Some(run_quantum(cpu, &self.lts, policy, pcb, |pcb| {
            if policy.ages() {
                queue.age_all();
            }
            if let Some(insertion) = policy.requeue() {
                queue.insert(pcb, insertion);
            }
        }))
    }

    /// Dispatches until the queue drains, returning the trace in dispatch order.
    pub fn run(&mut self, cpu: &Cpu) -> Vec<DispatchRecord> {
        std::iter::from_fn(|| self.schedule_next(cpu)).collect()
    }

    pub fn get_policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn get_queue(&self) -> &ReadyQueue {
        &self.queue
    }
}
