// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Round-robin ready queue.
//!
//! Holds the indices of admitted, not yet completed processes in admission
//! order. The head is the process that runs under round robin. Expiry of the
//! quantum moves the head to the tail; completion drops the head. Both keep
//! the relative order of every other entry.

use std::collections::VecDeque;

use log::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyQueue {
    queue: VecDeque<usize>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly admitted process.
    pub fn push(&mut self, idx: usize) {
        debug_assert!(!self.contains(idx), "index {idx} queued twice");
        self.queue.push_back(idx);
    }

    pub fn head(&self) -> Option<usize> {
        self.queue.front().copied()
    }

    /// Move the head to the tail.
    pub fn rotate(&mut self) {
        if let Some(idx) = self.queue.pop_front() {
            self.queue.push_back(idx);
            trace!("rr rotate: {idx} to tail, head now {:?}", self.head());
        }
    }

    /// Drop the head after it completed. Equivalent to a rotation followed
    /// by shrinking the queue by one slot.
    pub fn retire_head(&mut self) -> Option<usize> {
        let idx = self.queue.pop_front();
        trace!("rr retire: {idx:?}, {} left", self.len());
        idx
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.queue.contains(&idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().copied()
    }
}
