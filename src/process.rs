// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Process records and the admission order of a batch.

use crate::error::SchedError;
use crate::types::{Pid, Tick};

/// Definition of a process as read from the batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDef {
    pub name: String,
    /// Tick at which the process becomes ready.
    pub ready_time: Tick,
    /// Units of CPU time the process needs.
    pub exec_time: Tick,
}

/// A schedulable process at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub name: String,
    pub ready_time: Tick,
    /// Remaining units. Only the simulation loop decrements it.
    pub exec_time: Tick,
    /// Units requested at load time.
    pub burst: Tick,
    /// Present from admission until completion.
    pub handle: Option<Pid>,
    /// Tick of the first run.
    pub start: Option<Tick>,
    /// Tick of completion.
    pub end: Option<Tick>,
}

impl ProcessDef {
    pub fn new(name: impl Into<String>, ready_time: Tick, exec_time: Tick) -> Self {
        Self {
            name: name.into(),
            ready_time,
            exec_time,
        }
    }

    /// A process with no work can never reach completion.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.exec_time == 0 {
            return Err(SchedError::InvalidProcessSpec {
                name: self.name.clone(),
                reason: "exec_time must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Process {
    pub fn new(def: &ProcessDef) -> Self {
        Process {
            name: def.name.clone(),
            ready_time: def.ready_time,
            exec_time: def.exec_time,
            burst: def.exec_time,
            handle: None,
            start: None,
            end: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.end.is_some()
    }
}

/// Build the process set in admission order: by ready time, then by
/// execution time. Equal keys keep input order, so indices are a
/// deterministic tie-break for the rest of the run.
pub fn admission_order(defs: &[ProcessDef]) -> Result<Vec<Process>, SchedError> {
    for def in defs {
        def.validate()?;
    }
    let mut procs: Vec<Process> = defs.iter().map(Process::new).collect();
    procs.sort_by_key(|p| (p.ready_time, p.exec_time));
    Ok(procs)
}
