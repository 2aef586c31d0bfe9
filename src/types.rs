// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Newtype wrappers and type aliases for domain concepts.
//!
//! Process identifiers get a newtype so a pid is never confused with a
//! process-set index. Ticks stay a plain alias: they are counted, added and
//! compared everywhere and a newtype would only add noise.

use std::fmt;

use serde::Serialize;

/// Logical time, in scheduling units since the run started.
pub type Tick = u64;

/// Handle of a running process.
///
/// In live mode this is the OS process identifier. The virtual executor hands
/// out synthetic, strictly increasing values so traces stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
