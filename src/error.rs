// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Errors that abort a scheduling run.
//!
//! Every variant is fatal for the current run: nothing is retried and no
//! partial schedule is reported.

use std::fmt;
use std::io;

use crate::types::Pid;

#[derive(Debug)]
pub enum SchedError {
    /// The policy token is not one of `FIFO`, `RR`, `SJF`, `PSJF`.
    UnknownPolicy(String),
    /// A process can never complete or was given an impossible arrival.
    InvalidProcessSpec { name: String, reason: String },
    /// The batch input is malformed.
    Input(String),
    /// A run setting is out of range.
    InvalidConfig(String),
    /// An OS-level control call failed while driving real processes.
    ExecutorFault {
        op: &'static str,
        pid: Option<Pid>,
        source: io::Error,
    },
}

impl SchedError {
    pub(crate) fn fault(op: &'static str, pid: Option<Pid>, source: io::Error) -> Self {
        SchedError::ExecutorFault { op, pid, source }
    }

    /// Fault built from `errno` right after a failed libc call.
    pub(crate) fn last_os_fault(op: &'static str, pid: Option<Pid>) -> Self {
        Self::fault(op, pid, io::Error::last_os_error())
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::UnknownPolicy(name) => write!(f, "unknown scheduling policy: {name:?}"),
            SchedError::InvalidProcessSpec { name, reason } => {
                write!(f, "invalid process {name:?}: {reason}")
            }
            SchedError::Input(msg) => write!(f, "malformed input: {msg}"),
            SchedError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            SchedError::ExecutorFault {
                op,
                pid: Some(pid),
                source,
            } => write!(f, "{op} failed for pid {pid}: {source}"),
            SchedError::ExecutorFault {
                op,
                pid: None,
                source,
            } => write!(f, "{op} failed: {source}"),
        }
    }
}

impl std::error::Error for SchedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchedError::ExecutorFault { source, .. } => Some(source),
            _ => None,
        }
    }
}
