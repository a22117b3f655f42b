use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use super::short_term_scheduler::run_quantum;
use super::{
    ConcurrentReadyQueue, Cpu, DispatchRecord, LongTermScheduler, Pid, SchedulingPolicy,
    SpawnRequest,
};

use crate::error::SpawnError;

/// Marks a dequeued record as handled when dropped, including while a worker
/// unwinds from a panic in the interpreter.
struct CheckedOut<'a>(&'a ConcurrentReadyQueue);

impl Drop for CheckedOut<'_> {
    fn drop(&mut self) {
        self.0.worker_done();
    }
}

/// Fixed set of worker threads dispatching from one shared ready queue.
///
/// The policy is fixed for the lifetime of the pool.
pub struct WorkerPool {
    policy: SchedulingPolicy,
    queue: Arc<ConcurrentReadyQueue>,
    lts: LongTermScheduler,
    trace: Arc<Mutex<Vec<DispatchRecord>>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(worker_count: usize, policy: SchedulingPolicy, cpu: Cpu, lts: LongTermScheduler) -> WorkerPool {
        let queue = Arc::new(ConcurrentReadyQueue::new());
        queue.initialize();
        let trace = Arc::new(Mutex::new(Vec::new()));

        let workers = (0..worker_count.max(1))
            .map(|worker_id| {
                let queue = queue.clone();
                let trace = trace.clone();
                let cpu = cpu.clone();
                let lts = lts.clone();

                thread::spawn(move || {
                    WorkerPool::work(worker_id, policy, &queue, &cpu, &lts, &trace);
                })
            })
            .collect::<Vec<_>>();

        info!("Started {} workers ({})", workers.len(), policy);

        WorkerPool {
            policy,
            queue,
            lts,
            trace,
            workers,
        }
    }

    fn work(
        worker_id: usize,
        policy: SchedulingPolicy,
        queue: &ConcurrentReadyQueue,
        cpu: &Cpu,
        lts: &LongTermScheduler,
        trace: &Mutex<Vec<DispatchRecord>>,
    ) {
        while let Some(pcb) = queue.dequeue_blocking() {
            let _checked_out = CheckedOut(queue);
            debug!("Worker {} dispatching process {}", worker_id, pcb.get_id());

            let record = run_quantum(cpu, lts, policy, pcb, |pcb| queue.requeue(pcb, policy));
            trace.lock().unwrap_or_else(PoisonError::into_inner).push(record);
        }

        debug!("Worker {} exiting", worker_id);
    }

    pub fn schedule_process(&self, request: SpawnRequest) -> Result<Pid, SpawnError> {
        if request.policy != self.policy {
            return Err(SpawnError::PolicyConflict {
                active: self.policy,
                requested: request.policy,
            });
        }

        let (pcb, insertion) = self.lts.admit(&request)?;
        let pid = pcb.get_id();
        self.queue.enqueue(pcb, insertion);
        Ok(pid)
    }

    /// Admits every request before any worker may dequeue one of them, so the
    /// batch is dispatched in the order the policy gives the whole batch.
    ///
    /// On failure the requests admitted so far stay queued and are released.
    pub fn schedule_batch<I>(&self, requests: I) -> Result<Vec<Pid>, SpawnError>
    where
        I: IntoIterator<Item = SpawnRequest>,
    {
        self.queue.hold();
        let pids = requests
            .into_iter()
            .map(|request| self.schedule_process(request))
            .collect();
        self.queue.release();
        pids
    }

    /// Blocks until every scheduled process has finished.
    pub fn await_all_procs_finished(&self) {
        self.queue.wait_all_done();
    }

    /// Stops the workers once the queue is empty and returns the trace in
    /// the order quanta finished.
    pub fn shutdown(self) -> Vec<DispatchRecord> {
        self.queue.shutdown();

        for worker in self.workers {
            if worker.join().is_err() {
                error!("A worker thread panicked");
            }
        }

        let mut trace = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *trace)
    }

    pub fn get_queue(&self) -> &ConcurrentReadyQueue {
        &self.queue
    }
}
