use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::SchedulingPolicy;

/// Failure to admit a new process into the ready queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("process table is full ({capacity} live processes)")]
    ProcessTableFull { capacity: usize },
    #[error("cannot admit a {requested} process while {active} work is queued")]
    PolicyConflict {
        active: SchedulingPolicy,
        requested: SchedulingPolicy,
    },
}

/// Failure to bring a script file into the program store.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} does not fit in the program store ({capacity} lines)")]
    OutOfSpace { path: PathBuf, capacity: usize },
}

/// Non-fatal failure reported by the instruction executor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("bad arguments for {0}")]
    BadArguments(String),
    #[error("variable does not exist: {0}")]
    VariableNotFound(String),
    #[error("variable store is full")]
    VariableStoreFull,
    #[error("no instruction at address {0}")]
    MissingInstruction(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scheduling policy: {0}")]
pub struct PolicyParseError(pub String);

/// Failure of a whole simulator run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error("script given more than once: {0}")]
    DuplicateScript(PathBuf),
    #[error("expected between 1 and {max} scripts, got {given}")]
    ScriptCount { given: usize, max: usize },
}
