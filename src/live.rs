// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Executor driving real processes.
//!
//! Every admitted process is a worker child that busy-loops for its execution
//! time. The scheduler sits alone on the parent CPU while all workers share
//! the child CPU. A worker that is not supposed to run is moved to
//! `SCHED_IDLE`, which in practice starves it as long as the runner sits at
//! `SCHED_OTHER` on the same CPU. It is not a hard guarantee: the kernel may
//! still give an idle-class worker an occasional slice.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};

use crate::config::LiveConfig;
use crate::error::SchedError;
use crate::executor::Executor;
use crate::process::Process;
use crate::types::{Pid, Tick};

/// Burn one unit of CPU time.
pub fn unit_time(iterations: u64) {
    for i in 0..iterations {
        std::hint::black_box(i);
    }
}

/// Pin `pid` to a single CPU.
pub fn assign_cpu(pid: Pid, cpu: usize) -> Result<(), SchedError> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(SchedError::fault(
            "sched_setaffinity",
            Some(pid),
            io::Error::from_raw_os_error(libc::EINVAL),
        ));
    }

    unsafe {
        let mut cpu_set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(cpu, &mut cpu_set);
        if libc::sched_setaffinity(pid.0, std::mem::size_of_val(&cpu_set), &cpu_set) != 0 {
            return Err(SchedError::last_os_fault("sched_setaffinity", Some(pid)));
        }
    }
    Ok(())
}

fn set_sched_class(pid: Pid, policy: libc::c_int) -> Result<(), SchedError> {
    let param = libc::sched_param { sched_priority: 0 };
    let ret = unsafe { libc::sched_setscheduler(pid.0, policy, &param as *const libc::sched_param) };
    if ret != 0 {
        return Err(SchedError::last_os_fault("sched_setscheduler", Some(pid)));
    }
    Ok(())
}

/// Give `pid` normal priority.
pub fn wake_up(pid: Pid) -> Result<(), SchedError> {
    set_sched_class(pid, libc::SCHED_OTHER)
}

/// Drop `pid` to the lowest priority class.
pub fn block_down(pid: Pid) -> Result<(), SchedError> {
    set_sched_class(pid, libc::SCHED_IDLE)
}

/// Body of a launched worker: run `units` units, then report the wall clock
/// interval it covered.
pub fn run_worker(units: Tick, unit_iterations: u64) {
    let start = SystemTime::now();
    for _ in 0..units {
        unit_time(unit_iterations);
    }
    let end = SystemTime::now();

    let ts = |t: SystemTime| t.duration_since(UNIX_EPOCH).unwrap_or_default();
    let (start, end) = (ts(start), ts(end));
    info!(
        "worker {} ran {} units: {}.{:09} -> {}.{:09}",
        std::process::id(),
        units,
        start.as_secs(),
        start.subsec_nanos(),
        end.as_secs(),
        end.subsec_nanos()
    );
}

fn worker_command(program: &Path, units: Tick, unit_iterations: u64) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg("worker")
        .arg("--units")
        .arg(units.to_string())
        .arg("--unit-iterations")
        .arg(unit_iterations.to_string());
    cmd
}

pub struct LiveExecutor {
    config: LiveConfig,
    children: HashMap<Pid, Child>,
    shutdown: Arc<AtomicBool>,
}

impl LiveExecutor {
    /// Pin the calling process to the parent CPU at normal priority.
    ///
    /// Setting `shutdown` makes the next time advance fail, which aborts
    /// the run.
    pub fn new(config: LiveConfig, shutdown: Arc<AtomicBool>) -> Result<Self, SchedError> {
        let me = Pid(std::process::id() as i32);
        assign_cpu(me, config.parent_cpu)?;
        wake_up(me)?;
        info!(
            "scheduler pid {} on cpu {}, workers on cpu {}",
            me, config.parent_cpu, config.child_cpu
        );

        Ok(Self {
            config,
            children: HashMap::new(),
            shutdown,
        })
    }
}

impl Executor for LiveExecutor {
    fn launch(&mut self, proc: &Process) -> Result<Pid, SchedError> {
        let child = worker_command(
            &self.config.worker_program,
            proc.exec_time,
            self.config.unit_iterations,
        )
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| SchedError::fault("spawn worker", None, e))?;

        let pid = Pid(child.id() as i32);
        // Tracked before any further call so it is reaped on failure.
        self.children.insert(pid, child);

        assign_cpu(pid, self.config.child_cpu)?;
        block_down(pid)?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{} {}", proc.name, pid)
            .and_then(|_| stdout.flush())
            .map_err(|e| SchedError::fault("announce admission", Some(pid), e))?;
        Ok(pid)
    }

    fn promote(&mut self, pid: Pid) -> Result<(), SchedError> {
        wake_up(pid)
    }

    fn demote(&mut self, pid: Pid) -> Result<(), SchedError> {
        block_down(pid)
    }

    fn advance(&mut self) -> Result<(), SchedError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(SchedError::fault(
                "advance",
                None,
                io::Error::new(io::ErrorKind::Interrupted, "run interrupted"),
            ));
        }
        unit_time(self.config.unit_iterations);
        Ok(())
    }

    fn await_exit(&mut self, pid: Pid) -> Result<(), SchedError> {
        let mut child = self.children.remove(&pid).ok_or_else(|| {
            SchedError::fault(
                "waitpid",
                Some(pid),
                io::Error::from_raw_os_error(libc::ECHILD),
            )
        })?;
        let status = child
            .wait()
            .map_err(|e| SchedError::fault("waitpid", Some(pid), e))?;
        if !status.success() {
            return Err(SchedError::fault(
                "worker exit",
                Some(pid),
                io::Error::new(io::ErrorKind::Other, format!("worker {status}")),
            ));
        }
        Ok(())
    }
}

impl Drop for LiveExecutor {
    fn drop(&mut self) {
        for (pid, mut child) in self.children.drain() {
            if let Err(e) = child.kill() {
                warn!("failed to kill worker {pid}: {e}");
            }
            if let Err(e) = child.wait() {
                warn!("failed to reap worker {pid}: {e}");
            }
        }
    }
}
