use std::collections::VecDeque;

use log::debug;

use super::{Insertion, Pid, ProcessControlBlock, ProcessState};

/// Ordered collection of processes waiting to run.
///
/// Records are owned by the queue while they wait; `pop_front` moves one out
/// to whichever executor runs it next.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<ProcessControlBlock>,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue {
            queue: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, mut pcb: ProcessControlBlock, insertion: Insertion) {
        pcb.state = ProcessState::Ready;

        let index = match insertion {
            Insertion::Tail => self.queue.len(),
            Insertion::Front => 0,
            Insertion::ScoreAdmission => self
                .queue
                .iter()
                .position(|queued| queued.get_score() > pcb.get_score())
                .unwrap_or(self.queue.len()),
            Insertion::ScoreReinsertion => {
                let score = pcb.get_score();
                if self.queue.iter().all(|queued| queued.get_score() >= score) {
                    0
                } else {
                    self.queue
                        .iter()
                        .position(|queued| queued.get_score() >= score)
                        .unwrap_or(self.queue.len())
                }
            }
        };

        debug!(
            "Queueing process {} (score {}) at position {} of {} ({:?})",
            pcb.get_id(),
            pcb.get_score(),
            index,
            self.queue.len(),
            insertion
        );

        match index {
            0 => self.queue.push_front(pcb),
            i if i == self.queue.len() => self.queue.push_back(pcb),
            i => self.queue.insert(i, pcb),
        }
    }

    pub fn push_back(&mut self, pcb: ProcessControlBlock) {
        self.insert(pcb, Insertion::Tail);
    }

    pub fn push_front(&mut self, pcb: ProcessControlBlock) {
        self.insert(pcb, Insertion::Front);
    }

    pub fn pop_front(&mut self) -> Option<ProcessControlBlock> {
        let mut pcb = self.queue.pop_front()?;
        pcb.state = ProcessState::Running;
        Some(pcb)
    }

    /// Decrements the score of every queued record, floored at zero.
    pub fn age_all(&mut self) {
        for pcb in self.queue.iter_mut() {
            pcb.age();
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn ids(&self) -> Vec<Pid> {
        self.queue.iter().map(|pcb| pcb.get_id()).collect()
    }

    pub fn scores(&self) -> Vec<usize> {
        self.queue.iter().map(|pcb| pcb.get_score()).collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::kernel::process_control_block::test_pcb;

    fn admit_all(lengths: &[usize], insertion: Insertion) -> ReadyQueue {
        let mut queue = ReadyQueue::new();
        for (i, &length) in lengths.iter().enumerate() {
            queue.insert(test_pcb(i as Pid + 1, length), insertion);
        }
        queue
    }

    fn drain(queue: &mut ReadyQueue) -> Vec<Pid> {
        std::iter::from_fn(|| queue.pop_front()).map(|pcb| pcb.get_id()).collect()
    }

    #[test]
    fn test_ready_queue_pop_empty() {
        let mut queue = ReadyQueue::new();
        assert!(queue.pop_front().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ready_queue_tail_and_front() {
        let mut queue = ReadyQueue::new();
        queue.push_back(test_pcb(1, 3));
        queue.push_back(test_pcb(2, 3));
        queue.push_front(test_pcb(3, 3));
        assert_eq!(queue.ids(), vec![3, 1, 2]);
    }

    #[test]
    fn test_ready_queue_pop_marks_running() {
        let mut queue = ReadyQueue::new();
        queue.push_back(test_pcb(1, 3));
        let pcb = queue.pop_front().unwrap();
        assert_eq!(pcb.state, ProcessState::Running);
    }

    #[test]
    fn test_ready_queue_score_admission_keeps_ties_in_arrival_order() {
        let queue = admit_all(&[5, 3, 3], Insertion::ScoreAdmission);
        assert_eq!(queue.ids(), vec![2, 3, 1]);
    }

    #[test]
    fn test_ready_queue_score_admission_before_strictly_greater() {
        let mut queue = admit_all(&[2, 4, 4, 6], Insertion::ScoreAdmission);
        queue.insert(test_pcb(9, 4), Insertion::ScoreAdmission);
        assert_eq!(queue.ids(), vec![1, 2, 3, 9, 4]);
    }

    #[test]
    fn test_ready_queue_reinsertion_goes_to_front_when_nothing_lower() {
        let mut queue = admit_all(&[3, 3, 5], Insertion::ScoreAdmission);
        queue.insert(test_pcb(9, 3), Insertion::ScoreReinsertion);
        assert_eq!(queue.ids(), vec![9, 1, 2, 3]);

        let mut queue = admit_all(&[4, 7], Insertion::ScoreAdmission);
        queue.insert(test_pcb(9, 1), Insertion::ScoreReinsertion);
        assert_eq!(queue.ids(), vec![9, 1, 2]);
    }

    #[test]
    fn test_ready_queue_reinsertion_before_first_greater_or_equal() {
        let mut queue = admit_all(&[1, 3, 3, 5], Insertion::ScoreAdmission);
        queue.insert(test_pcb(9, 3), Insertion::ScoreReinsertion);
        assert_eq!(queue.ids(), vec![1, 9, 2, 3, 4]);
    }

    #[test]
    fn test_ready_queue_reinsertion_into_empty_queue() {
        let mut queue = ReadyQueue::new();
        queue.insert(test_pcb(9, 3), Insertion::ScoreReinsertion);
        assert_eq!(queue.ids(), vec![9]);
    }

    #[test]
    fn test_ready_queue_age_all() {
        let mut queue = admit_all(&[0, 1, 4], Insertion::Tail);
        queue.age_all();
        assert_eq!(queue.scores(), vec![0, 0, 3]);
    }

    #[test]
    fn test_ready_queue_age_all_empty_is_noop() {
        let mut queue = ReadyQueue::new();
        queue.age_all();
        assert!(queue.is_empty());
    }

    proptest! {
        #[test]
        fn test_ready_queue_fcfs_preserves_arrival(lengths in proptest::collection::vec(0usize..50, 0..32)) {
            let mut queue = admit_all(&lengths, Insertion::Tail);
            let expected: Vec<Pid> = (1..=lengths.len() as Pid).collect();
            prop_assert_eq!(drain(&mut queue), expected);
        }

        #[test]
        fn test_ready_queue_sjf_is_stable_by_length(lengths in proptest::collection::vec(0usize..10, 0..32)) {
            let mut queue = admit_all(&lengths, Insertion::ScoreAdmission);
            let mut expected: Vec<(usize, Pid)> = lengths
                .iter()
                .enumerate()
                .map(|(i, &length)| (length, i as Pid + 1))
                .collect();
            expected.sort_by_key(|&(length, _)| length);
            let expected: Vec<Pid> = expected.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(drain(&mut queue), expected);
        }
    }
}
