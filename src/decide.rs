// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Per-tick runner selection.
//!
//! [`decide`] picks the process that owns the CPU for the upcoming tick. By
//! default the previous runner keeps the CPU; each policy states when it
//! looks for someone else:
//!
//! - **FIFO**: only once the previous runner completed. The next runner is the
//!   first present process after it in admission order.
//! - **RR**: once the previous runner completed or its quantum ran out. The
//!   next runner is the head of the ready queue, after rotating a still
//!   present previous runner to the tail.
//! - **SJF**: only once the previous runner completed. The next runner is the
//!   present process with the least remaining work.
//! - **PSJF**: every tick, with the same rule as SJF.
//!
//! Least-remaining-work ties go to the lowest index. Since indices follow
//! admission order, that is the earliest arrival.

use log::trace;

use crate::policy::Policy;
use crate::process::Process;
use crate::ready_queue::ReadyQueue;
use crate::types::Tick;

/// Round-robin bookkeeping: the ready queue and the quantum counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    pub queue: ReadyQueue,
    /// Length of a full quantum.
    pub quantum: Tick,
    /// Units the current runner may still use before rotation.
    pub remaining: Tick,
}

impl RoundRobin {
    pub fn new(quantum: Tick) -> Self {
        Self {
            queue: ReadyQueue::new(),
            quantum,
            remaining: quantum,
        }
    }

    /// Account one unit of CPU time to the current runner.
    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Select the runner for the upcoming tick.
///
/// `last` is the most recent runner, which idle ticks do not reset. Only the
/// round-robin state is modified: the queue may rotate and the quantum counter
/// is refilled whenever a new round-robin selection is made.
pub fn decide(
    policy: Policy,
    procs: &[Process],
    last: Option<usize>,
    rr: &mut RoundRobin,
) -> Option<usize> {
    let last_present = last.filter(|&l| procs[l].is_present());

    match policy {
        Policy::Fifo => match last_present {
            Some(l) => Some(l),
            None => {
                let from = last.map_or(0, |l| l + 1);
                (from..procs.len()).find(|&i| procs[i].is_present())
            }
        },
        Policy::RoundRobin => match last_present {
            Some(l) if !rr.expired() => Some(l),
            _ => {
                if last_present.is_some() && !rr.queue.is_empty() {
                    rr.queue.rotate();
                }
                rr.remaining = rr.quantum;
                trace!("rr reselect: head {:?}", rr.queue.head());
                rr.queue.head()
            }
        },
        Policy::Sjf => last_present.or_else(|| shortest_remaining(procs)),
        Policy::Psjf => shortest_remaining(procs),
    }
}

/// Present process with the least remaining work, lowest index on ties.
fn shortest_remaining(procs: &[Process]) -> Option<usize> {
    procs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_present())
        .min_by_key(|&(i, p)| (p.exec_time, i))
        .map(|(i, _)| i)
}
