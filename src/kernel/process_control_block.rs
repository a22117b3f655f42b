use crate::io::Program;

pub type Pid = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Terminated,
}

/// The schedulable state of one script: where its lines live in the
/// program store, how far it has run, and its priority score.
///
/// Records are only created through the process table, which hands out
/// identifiers and enforces the live-process cap.
#[derive(Debug)]
pub struct ProcessControlBlock {
    pub state: ProcessState,

    id: Pid,
    start_index: usize,
    length: usize,
    program_counter: usize,
    score: usize,
}

impl ProcessControlBlock {
    pub(crate) fn new(id: Pid, program: Program) -> ProcessControlBlock {
        ProcessControlBlock {
            state: ProcessState::Ready,
            id,
            start_index: program.start_index,
            length: program.length,
            program_counter: 0,
            score: program.length,
        }
    }

    pub fn get_id(&self) -> Pid {
        self.id
    }

    pub fn get_start_index(&self) -> usize {
        self.start_index
    }

    pub fn get_length(&self) -> usize {
        self.length
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_score(&self) -> usize {
        self.score
    }

    pub fn is_complete(&self) -> bool {
        self.program_counter >= self.length
    }

    /// Moves to the next instruction. Does nothing once the program is done.
    pub fn advance(&mut self) {
        if !self.is_complete() {
            self.program_counter += 1;
        }
    }

    pub fn age(&mut self) {
        self.score = self.score.saturating_sub(1);
    }
}

#[cfg(test)]
pub(crate) fn test_pcb(id: Pid, length: usize) -> ProcessControlBlock {
    ProcessControlBlock::new(id, Program { start_index: 0, length })
}
