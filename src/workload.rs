// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Batch workload definition, parser and builder API.
//!
//! The batch format is a whitespace separated token stream:
//!
//! ```text
//! <POLICY>
//! <N>
//! <name> <ready_time> <exec_time>    (N times)
//! ```
//!
//! Line breaks carry no meaning. Tokens past the last record are ignored.

use std::str::SplitWhitespace;

use crate::error::SchedError;
use crate::policy::Policy;
use crate::process::ProcessDef;
use crate::types::Tick;

/// A complete batch: the policy and every process to schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub policy: Policy,
    pub processes: Vec<ProcessDef>,
}

/// Builder for constructing workloads in code.
pub struct WorkloadBuilder {
    policy: Policy,
    processes: Vec<ProcessDef>,
}

impl Workload {
    pub fn builder(policy: Policy) -> WorkloadBuilder {
        WorkloadBuilder {
            policy,
            processes: Vec::new(),
        }
    }

    /// Parse a batch. The policy token is checked before anything else is
    /// read, so an unknown policy is reported even if the rest is garbage.
    pub fn parse(input: &str) -> Result<Self, SchedError> {
        let mut tokens = Tokens::new(input);

        let policy: Policy = tokens.next("policy")?.parse()?;
        let count = tokens.next_int("process count")?;
        let count = usize::try_from(count)
            .map_err(|_| SchedError::Input(format!("negative process count {count}")))?;

        // The announced count may exceed the records actually present.
        let mut processes = Vec::new();
        for i in 0..count {
            let name = tokens.next(&format!("name of process #{i}"))?.to_string();
            let ready_time = tokens.next_int(&format!("ready_time of {name:?}"))?;
            let exec_time = tokens.next_int(&format!("exec_time of {name:?}"))?;
            processes.push(process_def(name, ready_time, exec_time)?);
        }

        Ok(Workload { policy, processes })
    }
}

impl WorkloadBuilder {
    /// Add a process. Order of calls is the input order used to break
    /// admission ties.
    pub fn process(mut self, name: &str, ready_time: Tick, exec_time: Tick) -> Self {
        self.processes
            .push(ProcessDef::new(name, ready_time, exec_time));
        self
    }

    pub fn build(self) -> Result<Workload, SchedError> {
        for def in &self.processes {
            def.validate()?;
        }
        Ok(Workload {
            policy: self.policy,
            processes: self.processes,
        })
    }
}

fn process_def(name: String, ready_time: i64, exec_time: i64) -> Result<ProcessDef, SchedError> {
    let ready_time = Tick::try_from(ready_time).map_err(|_| SchedError::InvalidProcessSpec {
        name: name.clone(),
        reason: format!("ready_time {ready_time} is negative"),
    })?;
    let exec_time = match Tick::try_from(exec_time) {
        Ok(t) if t > 0 => t,
        _ => {
            return Err(SchedError::InvalidProcessSpec {
                name,
                reason: format!("exec_time {exec_time} must be at least 1"),
            })
        }
    };
    Ok(ProcessDef::new(name, ready_time, exec_time))
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str, SchedError> {
        self.inner
            .next()
            .ok_or_else(|| SchedError::Input(format!("unexpected end of input, expected {what}")))
    }

    fn next_int(&mut self, what: &str) -> Result<i64, SchedError> {
        let tok = self.next(what)?;
        tok.parse()
            .map_err(|e| SchedError::Input(format!("{what}: {tok:?} is not an integer ({e})")))
    }
}
