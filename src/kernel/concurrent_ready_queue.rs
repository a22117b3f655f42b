//! Ready queue shared by a pool of workers.
//!
//! The queue, the in-flight count, the admission hold and the termination
//! flag live behind a single mutex and always change together. Two condition
//! variables hang off that mutex:
//!
//! - `work_available`: a record was queued, a hold was lifted or shutdown began
//! - `drained`: the queue is empty and nothing is checked out
//!
//! While a hold is in place, records can be queued but none are handed out.
//! A batch queued under one hold is therefore ordered as a whole before any
//! worker sees it.
//!
//! A dequeued record is owned by the worker holding it until that worker
//! calls `worker_done`. Nothing else reads or writes it in between.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::{Insertion, Pid, ProcessControlBlock, ReadyQueue, SchedulingPolicy};

#[derive(Debug, Default)]
struct State {
    queue: ReadyQueue,
    in_flight: usize,
    held: bool,
    terminating: bool,
}

impl State {
    fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

#[derive(Debug, Default)]
pub struct ConcurrentReadyQueue {
    state: Mutex<State>,
    work_available: Condvar,
    drained: Condvar,
}

impl ConcurrentReadyQueue {
    pub fn new() -> ConcurrentReadyQueue {
        ConcurrentReadyQueue::default()
    }

    /// Every operation leaves the state consistent before it can panic, so a
    /// poisoned lock still guards usable state. Recovering keeps `worker_done`
    /// callable while a worker unwinds.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Empties the queue and clears the in-flight count, hold and termination flag.
    pub fn initialize(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.in_flight = 0;
        state.held = false;
        state.terminating = false;
    }

    /// Stops handing out records until `release`. Queueing still works.
    pub fn hold(&self) {
        self.lock().held = true;
    }

    pub fn release(&self) {
        let mut state = self.lock();
        state.held = false;
        self.work_available.notify_all();
    }

    pub fn enqueue(&self, pcb: ProcessControlBlock, insertion: Insertion) {
        let mut state = self.lock();
        state.queue.insert(pcb, insertion);
        self.work_available.notify_one();
    }

    pub fn enqueue_front(&self, pcb: ProcessControlBlock) {
        self.enqueue(pcb, Insertion::Front);
    }

    /// Puts a preempted record back, aging the queue first when the policy asks for it.
    pub fn requeue(&self, pcb: ProcessControlBlock, policy: SchedulingPolicy) {
        let Some(insertion) = policy.requeue() else {
            return self.enqueue(pcb, Insertion::Tail);
        };

        let mut state = self.lock();
        if policy.ages() {
            state.queue.age_all();
        }
        state.queue.insert(pcb, insertion);
        self.work_available.notify_one();
    }

    /// Blocks until a record is available and checks it out.
    ///
    /// Returns `None` once shutdown has begun and the queue is empty; the
    /// caller should exit. Shutdown overrides a hold.
    pub fn dequeue_blocking(&self) -> Option<ProcessControlBlock> {
        let mut state = self.lock();

        loop {
            if !state.held || state.terminating {
                if let Some(pcb) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(pcb);
                }
            }
            if state.terminating {
                return None;
            }
            state = self
                .work_available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Marks one checked-out record as handled (retired or requeued).
    pub fn worker_done(&self) {
        let mut state = self.lock();
        debug_assert!(state.in_flight > 0, "worker_done without a checked-out record");
        state.in_flight = state.in_flight.saturating_sub(1);

        if state.is_drained() {
            debug!("Ready queue drained");
            self.drained.notify_all();
        }
    }

    /// Blocks until the queue is empty and no record is checked out.
    pub fn wait_all_done(&self) {
        let state = self.lock();
        let _state = self
            .drained
            .wait_while(state, |state| !state.is_drained())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Lets idle workers exit. Does not interrupt a worker mid-quantum.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.terminating = true;
        self.work_available.notify_all();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn ids(&self) -> Vec<Pid> {
        self.lock().queue.ids()
    }
}
