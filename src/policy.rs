// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchedError;

/// The scheduling policy applied for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Policy {
    /// First come, first served. Never preempts.
    #[serde(rename = "FIFO")]
    Fifo,
    /// Round robin over the ready queue with a fixed time quantum.
    #[serde(rename = "RR")]
    RoundRobin,
    /// Shortest job first, non-preemptive.
    #[serde(rename = "SJF")]
    Sjf,
    /// Shortest remaining time first, re-evaluated every tick.
    #[serde(rename = "PSJF")]
    Psjf,
}

impl Policy {
    pub const ALL: [Policy; 4] = [Policy::Fifo, Policy::RoundRobin, Policy::Sjf, Policy::Psjf];

    /// The token naming this policy in batch input.
    pub fn name(self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::RoundRobin => "RR",
            Policy::Sjf => "SJF",
            Policy::Psjf => "PSJF",
        }
    }

    /// Whether a process that arrives can take the CPU from the current runner
    /// before it completes.
    pub fn is_preemptive(self) -> bool {
        matches!(self, Policy::RoundRobin | Policy::Psjf)
    }
}

impl FromStr for Policy {
    type Err = SchedError;

    /// Case-sensitive exact match on the policy token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| SchedError::UnknownPolicy(s.to_string()))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
