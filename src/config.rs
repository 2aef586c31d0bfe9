// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Run configuration shared by the library and the command line.

use std::path::PathBuf;

use crate::types::Tick;

/// Default round-robin time quantum, in units.
pub const DEFAULT_TIME_QUANTUM: Tick = 500;

/// Busy-loop iterations making up one unit of time in live mode.
pub const DEFAULT_UNIT_ITERATIONS: u64 = 1_000_000;

/// CPU the scheduler itself is pinned to in live mode.
pub const DEFAULT_PARENT_CPU: usize = 0;

/// CPU every launched worker is pinned to in live mode.
pub const DEFAULT_CHILD_CPU: usize = 1;

/// Policy-independent knobs of the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    /// Units a round-robin runner keeps the CPU before it is rotated.
    pub time_quantum: Tick,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            time_quantum: DEFAULT_TIME_QUANTUM,
        }
    }
}

/// Settings for driving real processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    pub unit_iterations: u64,
    pub parent_cpu: usize,
    pub child_cpu: usize,
    /// Program launched for each admitted process. It is invoked as
    /// `<program> worker --units <n> --unit-iterations <m>`.
    pub worker_program: PathBuf,
}

impl LiveConfig {
    pub fn new(worker_program: PathBuf) -> Self {
        Self {
            unit_iterations: DEFAULT_UNIT_ITERATIONS,
            parent_cpu: DEFAULT_PARENT_CPU,
            child_cpu: DEFAULT_CHILD_CPU,
            worker_program,
        }
    }
}
