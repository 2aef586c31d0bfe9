// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! scx_unitsched - Discrete-time batch scheduler for FIFO, RR, SJF and PSJF.
//!
//! A fixed batch of processes, each with a ready time and an execution time,
//! is scheduled one unit of time at a time on a single CPU.
//!
//! # Architecture
//!
//! - **Workload**: the policy and the process batch, parsed or built in code
//! - **Decide**: picks the runner of the upcoming tick
//! - **Engine**: tick loop doing admission, selection, context switch and
//!   completion
//! - **Executors**: [`VirtualExecutor`] runs on a logical clock,
//!   [`LiveExecutor`] drives real worker processes by switching them between
//!   `SCHED_OTHER` and `SCHED_IDLE`
//! - **Trace / Report**: what ran when, and the final `name start end` rows
//!
//! # Usage
//!
//! ```rust
//! use scx_unitsched::*;
//!
//! let workload = Workload::builder(Policy::Psjf)
//!     .process("A", 0, 5)
//!     .process("B", 1, 2)
//!     .build()
//!     .unwrap();
//!
//! let outcome = simulate(&workload, SchedConfig::default()).unwrap();
//! let report = Report::new(&outcome);
//! assert_eq!(report.rows[0].name, "B");
//! ```

pub mod config;
pub mod decide;
pub mod engine;
pub mod error;
pub mod executor;
pub mod live;
pub mod policy;
pub mod process;
pub mod ready_queue;
pub mod report;
pub mod trace;
pub mod types;
pub mod workload;

// Re-export the main public types for convenience.
pub use config::{LiveConfig, SchedConfig};
pub use engine::{Outcome, Simulator};
pub use error::SchedError;
pub use executor::{Executor, VirtualExecutor};
pub use live::LiveExecutor;
pub use policy::Policy;
pub use process::{Process, ProcessDef};
pub use report::Report;
pub use trace::{Trace, TraceEvent, TraceKind};
pub use types::{Pid, Tick};
pub use workload::Workload;

/// Run a workload on the virtual clock.
pub fn simulate(workload: &Workload, config: SchedConfig) -> Result<Outcome, SchedError> {
    Simulator::new(config, VirtualExecutor::new()).run(workload)
}
