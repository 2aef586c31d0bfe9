// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! The boundary between the simulation loop and whatever actually runs the
//! processes.
//!
//! The loop calls into an [`Executor`] at fixed points of every tick and
//! never blocks anywhere else. Any error returned here aborts the run.

use crate::error::SchedError;
use crate::process::Process;
use crate::types::Pid;

pub trait Executor {
    /// Bring an admitted process into existence, held back from running.
    fn launch(&mut self, proc: &Process) -> Result<Pid, SchedError>;

    /// Let the process run from now on.
    fn promote(&mut self, pid: Pid) -> Result<(), SchedError>;

    /// Hold the process back. The previous runner is demoted only after the
    /// new one was promoted.
    fn demote(&mut self, pid: Pid) -> Result<(), SchedError>;

    /// Let one unit of time pass.
    fn advance(&mut self) -> Result<(), SchedError>;

    /// Block until the process has exited. Called once its remaining work
    /// reached zero.
    fn await_exit(&mut self, pid: Pid) -> Result<(), SchedError>;
}

/// Executor for the virtual clock: nothing runs, time passes instantly.
///
/// Handles are synthetic and assigned in launch order starting at 1, which
/// keeps runs bit-for-bit reproducible.
#[derive(Debug, Default)]
pub struct VirtualExecutor {
    next_pid: i32,
}

impl VirtualExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for VirtualExecutor {
    fn launch(&mut self, _proc: &Process) -> Result<Pid, SchedError> {
        self.next_pid += 1;
        Ok(Pid(self.next_pid))
    }

    fn promote(&mut self, _pid: Pid) -> Result<(), SchedError> {
        Ok(())
    }

    fn demote(&mut self, _pid: Pid) -> Result<(), SchedError> {
        Ok(())
    }

    fn advance(&mut self) -> Result<(), SchedError> {
        Ok(())
    }

    fn await_exit(&mut self, _pid: Pid) -> Result<(), SchedError> {
        Ok(())
    }
}
