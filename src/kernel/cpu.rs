use std::sync::{Arc, RwLock};

use log::warn;

use super::{Pid, ProcessControlBlock};

use crate::error::ExecError;
use crate::io::{Disk, Interpreter};

/// An instruction that failed while a process ran. The process still moved past it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    pub pid: Pid,
    pub program_counter: usize,
    pub error: ExecError,
}

/// What happened during one turn of a process on the CPU.
#[derive(Debug, Default)]
pub struct Burst {
    pub executed: usize,
    pub faults: Vec<Fault>,
}

/// Fetch-execute loop for a single process.
///
/// The disk is only read-locked for the fetch; the interpreter runs with no
/// lock held so workers never serialize on instruction execution.
#[derive(Clone)]
pub struct Cpu {
    disk: Arc<RwLock<Disk>>,
    interpreter: Arc<dyn Interpreter>,
}

impl Cpu {
    pub fn new(disk: Arc<RwLock<Disk>>, interpreter: Arc<dyn Interpreter>) -> Cpu {
        Cpu { disk, interpreter }
    }

    /// Runs `pcb` for up to `quantum` instructions, or to completion when `quantum` is 0.
    pub fn execute_process(&self, pcb: &mut ProcessControlBlock, quantum: usize) -> Burst {
        let mut burst = Burst::default();

        while !pcb.is_complete() && (quantum == 0 || burst.executed < quantum) {
            let program_counter = pcb.get_program_counter();

            if let Err(error) = self.step(pcb) {
                warn!(
                    "Process {} failed at instruction {}: {}",
                    pcb.get_id(),
                    program_counter,
                    error
                );
                burst.faults.push(Fault {
                    pid: pcb.get_id(),
                    program_counter,
                    error,
                });
            }

            pcb.advance();
            burst.executed += 1;
        }

        burst
    }

    fn step(&self, pcb: &ProcessControlBlock) -> Result<(), ExecError> {
        let instruction = self.fetch(pcb)?;
        self.interpreter.execute(&instruction)
    }

    fn fetch(&self, pcb: &ProcessControlBlock) -> Result<String, ExecError> {
        let disk = self.disk.read().expect("Disk lock poisoned");
        disk.fetch(pcb.get_start_index(), pcb.get_program_counter())
            .map(str::to_string)
            .ok_or(ExecError::MissingInstruction(
                pcb.get_start_index() + pcb.get_program_counter(),
            ))
    }
}
