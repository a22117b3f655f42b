//! Simulated process scheduling over scripts held in a shared program store.
//!
//! Scripts are loaded onto the [`io::Disk`], admitted as processes by the
//! [`kernel::LongTermScheduler`] and dispatched either by the single-threaded
//! [`kernel::ShortTermScheduler`] or by a [`kernel::WorkerPool`] sharing a
//! [`kernel::ConcurrentReadyQueue`]. Time is counted in executed instructions.

pub mod config;
pub mod error;
pub mod io;
pub mod kernel;
