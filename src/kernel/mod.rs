mod concurrent_ready_queue;
mod cpu;
mod long_term_scheduler;
mod memory;
mod policy;
mod process_control_block;
mod ready_queue;
mod short_term_scheduler;
mod worker_pool;

pub use concurrent_ready_queue::ConcurrentReadyQueue;
pub use cpu::{Burst, Cpu, Fault};
pub use long_term_scheduler::{LongTermScheduler, Placement, ProcessTable, SpawnRequest};
pub use memory::Memory;
pub use policy::{Insertion, SchedulingPolicy};
pub use process_control_block::{Pid, ProcessControlBlock, ProcessState};
pub use ready_queue::ReadyQueue;
pub use short_term_scheduler::{DispatchOutcome, DispatchRecord, ShortTermScheduler};
pub use worker_pool::WorkerPool;

pub mod driver;

pub use driver::Driver;
