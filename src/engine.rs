// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Tick-driven simulation loop.
//!
//! One iteration is one tick:
//!
//! 1. admit every process whose ready time is now (RR: append to the queue),
//! 2. ask [`decide`] for the runner,
//! 3. on a change of runner, stamp the first start, promote the new runner
//!    and demote the old one,
//! 4. let one unit pass and charge it to the runner,
//! 5. retire the runner once its work is done.
//!
//! The loop ends as soon as every process completed. The same loop drives
//! the virtual clock and real processes; only the [`Executor`] differs.

use log::{debug, info};

use crate::config::SchedConfig;
use crate::decide::{decide, RoundRobin};
use crate::error::SchedError;
use crate::executor::Executor;
use crate::policy::Policy;
use crate::process::{admission_order, Process};
use crate::trace::{Trace, TraceKind};
use crate::types::Tick;
use crate::workload::Workload;

/// All mutable scheduling state of a run.
#[derive(Debug, Clone)]
pub struct SimState {
    /// Process set in admission order. Never resized during a run.
    pub procs: Vec<Process>,
    pub clock: Tick,
    pub rr: RoundRobin,
    /// Most recent runner. Idle ticks leave it untouched.
    pub last: Option<usize>,
    /// Completed processes.
    pub done: usize,
    /// First process not admitted yet. Admission follows index order
    /// because the set is sorted by ready time.
    next_admit: usize,
}

impl SimState {
    pub fn new(procs: Vec<Process>, time_quantum: Tick) -> Self {
        Self {
            procs,
            clock: 0,
            rr: RoundRobin::new(time_quantum),
            last: None,
            done: 0,
            next_admit: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.done == self.procs.len()
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub policy: Policy,
    /// Processes in admission order, every one with `start` and `end` set.
    pub procs: Vec<Process>,
    pub trace: Trace,
}

impl Outcome {
    pub fn names(&self) -> Vec<String> {
        self.procs.iter().map(|p| p.name.clone()).collect()
    }
}

/// The main simulator.
pub struct Simulator<E: Executor> {
    config: SchedConfig,
    executor: E,
}

impl<E: Executor> Simulator<E> {
    pub fn new(config: SchedConfig, executor: E) -> Self {
        Simulator { config, executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run a workload to completion.
    pub fn run(&mut self, workload: &Workload) -> Result<Outcome, SchedError> {
        if self.config.time_quantum == 0 {
            return Err(SchedError::InvalidConfig(
                "time quantum must be at least 1".to_string(),
            ));
        }

        let policy = workload.policy;
        let procs = admission_order(&workload.processes)?;
        let mut state = SimState::new(procs, self.config.time_quantum);
        let mut trace = Trace::new();

        info!(
            "scheduling {} processes with {} (quantum {})",
            state.procs.len(),
            policy,
            self.config.time_quantum
        );

        // Runner of the previous tick, unlike `state.last` this is reset by
        // idle ticks.
        let mut prev_tick: Option<usize> = None;

        while !state.is_finished() {
            self.admit(policy, &mut state, &mut trace)?;

            let curr = decide(policy, &state.procs, state.last, &mut state.rr);
            debug!(
                "tick {}: runner {:?}",
                state.clock,
                curr.map(|c| state.procs[c].name.as_str())
            );

            match curr {
                Some(c) if prev_tick != Some(c) => {
                    trace.record(state.clock, TraceKind::Scheduled { idx: c })
                }
                None if prev_tick.is_some() || state.clock == 0 => {
                    trace.record(state.clock, TraceKind::Idle)
                }
                _ => {}
            }

            if curr != state.last {
                self.switch(policy, &mut state, curr, &mut trace)?;
            }

            self.executor.advance()?;
            state.clock += 1;

            if let Some(c) = curr {
                let proc = &mut state.procs[c];
                proc.exec_time -= 1;
                state.rr.consume();
                if proc.exec_time == 0 {
                    self.complete(policy, &mut state, c, &mut trace)?;
                }
                state.last = curr;
            }
            debug_assert!(
                policy != Policy::RoundRobin
                    || state.rr.queue.iter().all(|i| state.procs[i].is_present()),
                "rr queue holds a completed process"
            );
            prev_tick = curr;
        }

        trace.finish(state.clock);
        info!("all processes done at tick {}", state.clock);

        Ok(Outcome {
            policy,
            procs: state.procs,
            trace,
        })
    }

    fn admit(
        &mut self,
        policy: Policy,
        state: &mut SimState,
        trace: &mut Trace,
    ) -> Result<(), SchedError> {
        while let Some(proc) = state.procs.get_mut(state.next_admit) {
            if proc.ready_time != state.clock {
                break;
            }
            let idx = state.next_admit;
            let pid = self.executor.launch(proc)?;
            proc.handle = Some(pid);
            debug!("tick {}: {} ready as pid {}", state.clock, proc.name, pid);

            if policy == Policy::RoundRobin {
                state.rr.queue.push(idx);
            }
            trace.record(state.clock, TraceKind::Admitted { idx });
            state.next_admit += 1;
        }
        Ok(())
    }

    /// Hand the CPU from `state.last` to `curr`.
    fn switch(
        &mut self,
        policy: Policy,
        state: &mut SimState,
        curr: Option<usize>,
        trace: &mut Trace,
    ) -> Result<(), SchedError> {
        if let Some(c) = curr {
            let proc = &mut state.procs[c];
            if proc.start.is_none() {
                proc.start = Some(state.clock);
            }
            if let Some(pid) = proc.handle {
                self.executor.promote(pid)?;
            }
        }
        if let Some(l) = state.last {
            if let Some(pid) = state.procs[l].handle {
                debug_assert!(policy.is_preemptive(), "{policy} preempted a runner");
                self.executor.demote(pid)?;
                trace.record(state.clock, TraceKind::Preempted { idx: l });
            }
        }
        Ok(())
    }

    fn complete(
        &mut self,
        policy: Policy,
        state: &mut SimState,
        idx: usize,
        trace: &mut Trace,
    ) -> Result<(), SchedError> {
        let proc = &mut state.procs[idx];
        if let Some(pid) = proc.handle.take() {
            self.executor.await_exit(pid)?;
        }
        proc.end = Some(state.clock);

        if policy == Policy::RoundRobin {
            let retired = state.rr.queue.retire_head();
            debug_assert_eq!(retired, Some(idx), "rr runner was not at the head");
        }

        trace.record(state.clock, TraceKind::Completed { idx });
        info!("{} done at tick {}", proc.name, state.clock);
        state.done += 1;
        Ok(())
    }
}
