use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info};

use super::{Insertion, ProcessControlBlock, ProcessState, SchedulingPolicy};

use crate::error::SpawnError;
use crate::io::Program;

/// Where a spawned process enters the ready queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The policy's admission discipline.
    Default,
    /// Ahead of everything already queued, whatever the policy.
    Front,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: Program,
    pub policy: SchedulingPolicy,
    pub placement: Placement,
}

impl SpawnRequest {
    pub fn new(program: Program, policy: SchedulingPolicy) -> SpawnRequest {
        SpawnRequest {
            program,
            policy,
            placement: Placement::Default,
        }
    }

    pub fn at_front(mut self) -> SpawnRequest {
        self.placement = Placement::Front;
        self
    }

    pub fn insertion(&self) -> Insertion {
        match self.placement {
            Placement::Default => self.policy.admission(),
            Placement::Front => Insertion::Front,
        }
    }
}

/// Hands out process identifiers and caps the number of live processes.
///
/// Shared between the spawning thread and whichever executors retire
/// processes, so both counters are atomics.
#[derive(Debug)]
pub struct ProcessTable {
    capacity: usize,
    next_pid: AtomicU32,
    live: AtomicUsize,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> ProcessTable {
        ProcessTable {
            capacity,
            next_pid: AtomicU32::new(1),
            live: AtomicUsize::new(0),
        }
    }

    pub fn allocate(&self, program: Program) -> Result<ProcessControlBlock, SpawnError> {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < self.capacity).then_some(live + 1)
            })
            .map_err(|_| SpawnError::ProcessTableFull {
                capacity: self.capacity,
            })?;

        let pid = self.next_pid.fetch_add(1, Ordering::Relaxed);
        Ok(ProcessControlBlock::new(pid, program))
    }

    /// Retires a finished process and frees its slot. Its identifier is never handed out again.
    pub fn release(&self, mut pcb: ProcessControlBlock) {
        pcb.state = ProcessState::Terminated;
        self.live.fetch_sub(1, Ordering::AcqRel);
        debug!("Process {} terminated", pcb.get_id());
    }

    pub fn get_live_count(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Turns spawn requests into process records ready for queueing.
#[derive(Clone, Debug)]
pub struct LongTermScheduler {
    table: Arc<ProcessTable>,
}

impl LongTermScheduler {
    pub fn new(table: Arc<ProcessTable>) -> LongTermScheduler {
        LongTermScheduler { table }
    }

    pub fn admit(&self, request: &SpawnRequest) -> Result<(ProcessControlBlock, Insertion), SpawnError> {
        let pcb = self.table.allocate(request.program)?;

        info!(
            "Spawned process {} ({} lines at {}, {}, {:?})",
            pcb.get_id(),
            request.program.length,
            request.program.start_index,
            request.policy,
            request.placement
        );

        Ok((pcb, request.insertion()))
    }

    pub fn retire(&self, pcb: ProcessControlBlock) {
        self.table.release(pcb);
    }

    pub fn get_table(&self) -> &ProcessTable {
        &self.table
    }
}
