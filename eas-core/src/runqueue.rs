/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-CPU run-queue: an ordered multiset of runnable tasks keyed by virtual
//! runtime, plus a FIFO side queue of injected overhead tasks.
//!
//! The spec's design notes (§9) explicitly allow any data structure that
//! gives `O(log n)` `pop_smallest`/`insert`, noting that a red-black tree
//! (what the Python original hand-rolls, since the language has no sorted
//! multiset in its standard library) and a heap are both acceptable. Rust's
//! `std::collections::BTreeMap` already **is** a balanced B-tree, so it is
//! used directly here in place of a hand-rolled RB-tree — keyed by
//! `executed_cycles` (virtual runtime), with same-key ties broken FIFO via a
//! small per-key `VecDeque`.

use std::collections::{BTreeMap, VecDeque};

use crate::task::Task;

/// Per-CPU ordered structure of runnable tasks plus an overhead side queue.
///
/// Invariant: `cap()` always equals the sum of `remaining_cycles()` over
/// every task currently held (main queue + side queue).
#[derive(Debug, Default)]
pub struct RunQueue {
    /// Main ordered container, keyed by virtual runtime (executed_cycles).
    /// A `VecDeque` per key preserves FIFO order among tasks tied on vruntime.
    main: BTreeMap<u64, VecDeque<Task>>,
    /// FIFO side queue of injected overhead ("kernel") tasks. Drained ahead
    /// of the main queue on the next `pop_smallest`.
    overhead: VecDeque<Task>,
    cap: u64,
    size: usize,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` to the main ordered container, keyed by its current
    /// `executed_cycles`.
    pub fn insert(&mut self, task: Task) {
        self.cap += task.remaining_cycles();
        self.size += 1;
        let key = task.executed_cycles();
        self.main.entry(key).or_default().push_back(task);
    }

    /// Add `task` to the overhead side FIFO. Does not count toward
    /// [`size`](Self::size).
    pub fn insert_overhead(&mut self, task: Task) {
        self.cap += task.remaining_cycles();
        self.overhead.push_back(task);
    }

    /// Pop the side FIFO's head if non-empty, else the main queue's
    /// smallest-vruntime task, else `None`.
    pub fn pop_smallest(&mut self) -> Option<Task> {
        if let Some(task) = self.overhead.pop_front() {
            self.cap -= task.remaining_cycles();
            return Some(task);
        }

        let key = *self.main.keys().next()?;
        let bucket = self.main.get_mut(&key).expect("key just observed");
        let task = bucket.pop_front().expect("non-empty bucket");
        if bucket.is_empty() {
            self.main.remove(&key);
        }
        self.cap -= task.remaining_cycles();
        self.size -= 1;
        Some(task)
    }

    /// Remove and return the main-queue task with the largest
    /// `executed_cycles`. Ignores the side FIFO. `None` if the main queue is
    /// empty.
    pub fn pop_largest(&mut self) -> Option<Task> {
        let key = *self.main.keys().next_back()?;
        let bucket = self.main.get_mut(&key).expect("key just observed");
        let task = bucket.pop_back().expect("non-empty bucket");
        if bucket.is_empty() {
            self.main.remove(&key);
        }
        self.cap -= task.remaining_cycles();
        self.size -= 1;
        Some(task)
    }

    /// Count of main-queue items only (excludes the overhead side queue).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sum of `remaining_cycles()` over every task held (main + overhead).
    pub fn cap(&self) -> u64 {
        self.cap
    }

    /// `true` if both the main queue and the overhead side queue are empty.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.overhead.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskClass;

    fn task(total: u64, executed: u64, class: TaskClass) -> Task {
        let mut t = Task::new(total, class);
        t.execute(executed);
        t
    }

    #[test]
    fn cap_tracks_sum_of_remaining_cycles() {
        let mut rq = RunQueue::new();
        rq.insert(Task::new(100, TaskClass::User(0)));
        rq.insert(Task::new(50, TaskClass::User(1)));
        assert_eq!(rq.cap(), 150);
        rq.insert_overhead(Task::new(10, TaskClass::Balance));
        assert_eq!(rq.cap(), 160);

        rq.pop_smallest(); // drains overhead first
        assert_eq!(rq.cap(), 150);
    }

    #[test]
    fn pop_smallest_drains_overhead_before_main_queue() {
        let mut rq = RunQueue::new();
        rq.insert(task(100, 0, TaskClass::User(0))); // vr=0, should be main-queue-smallest
        rq.insert_overhead(Task::new(5, TaskClass::Energy));

        let first = rq.pop_smallest().unwrap();
        assert_eq!(first.class(), TaskClass::Energy);

        let second = rq.pop_smallest().unwrap();
        assert_eq!(second.class(), TaskClass::User(0));
    }

    #[test]
    fn pop_smallest_returns_lowest_vruntime_first() {
        let mut rq = RunQueue::new();
        rq.insert(task(100, 40, TaskClass::User(0)));
        rq.insert(task(100, 10, TaskClass::User(1)));
        rq.insert(task(100, 70, TaskClass::User(2)));

        assert_eq!(rq.pop_smallest().unwrap().class(), TaskClass::User(1));
        assert_eq!(rq.pop_smallest().unwrap().class(), TaskClass::User(0));
        assert_eq!(rq.pop_smallest().unwrap().class(), TaskClass::User(2));
        assert!(rq.pop_smallest().is_none());
    }

    #[test]
    fn pop_largest_returns_highest_vruntime_and_ignores_overhead() {
        let mut rq = RunQueue::new();
        rq.insert(task(100, 40, TaskClass::User(0)));
        rq.insert(task(100, 90, TaskClass::User(1)));
        rq.insert_overhead(Task::new(5, TaskClass::Balance));

        let largest = rq.pop_largest().unwrap();
        assert_eq!(largest.class(), TaskClass::User(1));
        // overhead untouched
        assert_eq!(rq.cap(), 100 - 40 + 5);
    }

    #[test]
    fn size_counts_main_queue_only() {
        let mut rq = RunQueue::new();
        rq.insert(Task::new(10, TaskClass::User(0)));
        rq.insert_overhead(Task::new(10, TaskClass::Energy));
        assert_eq!(rq.size(), 1);
    }

    #[test]
    fn ties_on_vruntime_are_broken_fifo() {
        let mut rq = RunQueue::new();
        rq.insert(task(100, 0, TaskClass::User(1)));
        rq.insert(task(100, 0, TaskClass::User(2)));
        assert_eq!(rq.pop_smallest().unwrap().class(), TaskClass::User(1));
        assert_eq!(rq.pop_smallest().unwrap().class(), TaskClass::User(2));
    }

    #[test]
    fn empty_queue_pops_return_none() {
        let mut rq = RunQueue::new();
        assert!(rq.pop_smallest().is_none());
        assert!(rq.pop_largest().is_none());
        assert!(rq.is_empty());
    }
}
