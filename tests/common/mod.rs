#![allow(dead_code)]

use scx_unitsched::*;

/// Initialize logging for tests.
///
/// `init()` fails once a logger is installed; the first test in the process
/// wins and the rest silently reuse it.
pub fn setup_test() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
    );
}

/// Quantum used by round-robin tests. Small enough that rotation happens
/// within a handful of ticks.
pub const TEST_QUANTUM: Tick = 2;

pub fn test_config() -> SchedConfig {
    SchedConfig {
        time_quantum: TEST_QUANTUM,
    }
}

pub fn run(workload: &Workload) -> Outcome {
    simulate(workload, test_config()).expect("simulation failed")
}

/// `(name, start, end)` in report order.
pub fn rows(outcome: &Outcome) -> Vec<(String, Tick, Tick)> {
    Report::new(outcome)
        .rows
        .into_iter()
        .map(|r| (r.name, r.start, r.end))
        .collect()
}

pub fn row(name: &str, start: Tick, end: Tick) -> (String, Tick, Tick) {
    (name.to_string(), start, end)
}

/// Deterministic xorshift PRNG for generating workloads.
pub struct Prng(u64);

impl Prng {
    pub fn new(seed: u64) -> Self {
        Prng(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `lo..=hi`.
    pub fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next() % (hi - lo + 1)
    }
}

/// A random batch of 1..=8 processes with arrivals in 0..=20 and bursts in
/// 1..=10.
pub fn random_workload(policy: Policy, seed: u64) -> Workload {
    let mut rng = Prng::new(seed);
    let n = rng.range(1, 8);
    let mut builder = Workload::builder(policy);
    for i in 0..n {
        let ready = rng.range(0, 20);
        let exec = rng.range(1, 10);
        builder = builder.process(&format!("P{i}"), ready, exec);
    }
    builder.build().expect("generated workload is valid")
}

pub const SEEDS: std::ops::Range<u64> = 1..64;

/// Ticks at which each process ran, by index.
pub fn run_ticks(outcome: &Outcome) -> Vec<Vec<Tick>> {
    let mut ticks = vec![Vec::new(); outcome.procs.len()];
    for (tick, runner) in outcome.trace.timeline().into_iter().enumerate() {
        if let Some(idx) = runner {
            ticks[idx].push(tick as Tick);
        }
    }
    ticks
}

/// Remaining work of every process at the start of every tick, `None` while
/// the process is not present.
pub fn remaining_by_tick(outcome: &Outcome) -> Vec<Vec<Option<Tick>>> {
    let mut remaining: Vec<Tick> = outcome.procs.iter().map(|p| p.burst).collect();
    let mut by_tick = Vec::new();
    for (tick, runner) in outcome.trace.timeline().into_iter().enumerate() {
        let tick = tick as Tick;
        by_tick.push(
            outcome
                .procs
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let present = p.ready_time <= tick && remaining[i] > 0;
                    present.then_some(remaining[i])
                })
                .collect(),
        );
        if let Some(idx) = runner {
            remaining[idx] -= 1;
        }
    }
    by_tick
}

/// Generate the policy-independent test suite.
///
/// Usage:
/// ```ignore
/// mod common;
/// policy_tests!(Policy::Fifo);
/// ```
#[macro_export]
macro_rules! policy_tests {
    ($policy:expr) => {
        /// Smoke test: single process runs from its arrival to completion.
        #[test]
        fn test_single_process() {
            common::setup_test();
            let wl = Workload::builder($policy)
                .process("solo", 3, 4)
                .build()
                .unwrap();
            let out = common::run(&wl);
            assert_eq!(common::rows(&out), [common::row("solo", 3, 7)]);
            assert_eq!(out.trace.idle_ticks(), 3);
            assert_eq!(out.trace.schedule_count(0), 1);
        }

        /// Every process is stamped once, within its arrival and burst.
        #[test]
        fn test_start_end_bounds() {
            common::setup_test();
            for seed in common::SEEDS {
                let out = common::run(&common::random_workload($policy, seed));
                for p in &out.procs {
                    let start = p.start.expect("start not stamped");
                    let end = p.end.expect("end not stamped");
                    assert!(p.ready_time <= start, "seed {seed}: {p:?} started early");
                    assert!(start <= end, "seed {seed}: {p:?}");
                    assert!(end - start >= p.burst, "seed {seed}: {p:?} ran too short");
                    assert_eq!(p.exec_time, 0, "seed {seed}: {p:?} has work left");
                    assert!(p.handle.is_none(), "seed {seed}: {p:?} still present");
                    if !$policy.is_preemptive() {
                        assert_eq!(end - start, p.burst, "seed {seed}: {p:?} was interrupted");
                    }
                }
            }
        }

        /// The CPU time handed out equals the total burst, and only idle
        /// ticks account for the rest of the run.
        #[test]
        fn test_runtime_conservation() {
            common::setup_test();
            for seed in common::SEEDS {
                let out = common::run(&common::random_workload($policy, seed));
                let mut total = 0;
                for (idx, p) in out.procs.iter().enumerate() {
                    assert_eq!(
                        out.trace.total_runtime(idx),
                        p.burst,
                        "seed {seed}: runtime of {}",
                        p.name
                    );
                    total += p.burst;
                }
                assert_eq!(total, out.trace.end_tick() - out.trace.idle_ticks());
                assert_eq!(
                    out.trace.end_tick(),
                    out.procs.iter().filter_map(|p| p.end).max().unwrap()
                );
            }
        }

        /// A process only ever runs while it is present.
        #[test]
        fn test_runs_only_when_present() {
            common::setup_test();
            for seed in common::SEEDS {
                let out = common::run(&common::random_workload($policy, seed));
                for (idx, ticks) in common::run_ticks(&out).iter().enumerate() {
                    let p = &out.procs[idx];
                    for &t in ticks {
                        assert!(t >= p.ready_time && t < p.end.unwrap(), "seed {seed}: tick {t}");
                    }
                }
            }
        }

        /// The CPU is never left idle while someone is present.
        #[test]
        fn test_work_conserving() {
            common::setup_test();
            for seed in common::SEEDS {
                let out = common::run(&common::random_workload($policy, seed));
                let remaining = common::remaining_by_tick(&out);
                for (tick, runner) in out.trace.timeline().into_iter().enumerate() {
                    let anyone = remaining[tick].iter().any(Option::is_some);
                    assert_eq!(runner.is_some(), anyone, "seed {seed}: tick {tick}");
                }
            }
        }

        /// Determinism: the same workload produces identical traces.
        #[test]
        fn test_determinism() {
            common::setup_test();
            for seed in common::SEEDS {
                let wl = common::random_workload($policy, seed);
                let out1 = common::run(&wl);
                let out2 = common::run(&wl);
                assert_eq!(common::rows(&out1), common::rows(&out2));
                assert_eq!(out1.trace, out2.trace, "seed {seed}: traces differ");
            }
        }

        /// The report is sorted by completion tick.
        #[test]
        fn test_report_sorted_by_end() {
            common::setup_test();
            for seed in common::SEEDS {
                let out = common::run(&common::random_workload($policy, seed));
                let ends: Vec<Tick> = common::rows(&out).iter().map(|r| r.2).collect();
                assert!(ends.windows(2).all(|w| w[0] <= w[1]), "seed {seed}: {ends:?}");
            }
        }

        /// Processes arriving after the CPU went idle are picked up.
        #[test]
        fn test_idle_gap_between_arrivals() {
            common::setup_test();
            let wl = Workload::builder($policy)
                .process("early", 0, 2)
                .process("late", 5, 3)
                .build()
                .unwrap();
            let out = common::run(&wl);
            assert_eq!(
                common::rows(&out),
                [common::row("early", 0, 2), common::row("late", 5, 8)]
            );
            assert_eq!(out.trace.idle_ticks(), 3);
        }
    };
}
