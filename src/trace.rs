// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Trace event recording for a scheduling run.
//!
//! Every scheduling action (admission, dispatch, preemption, completion, CPU
//! idle) is recorded as a [`TraceEvent`] stamped with the tick it happened at.
//! Events of one tick appear in the order the loop produced them: admissions,
//! then the dispatch or idle decision. A completion is stamped with the tick
//! the process finished at, which is the tick the next decision is made for.

use crate::types::Tick;

/// A single trace event produced by the simulation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub tick: Tick,
    pub kind: TraceKind,
}

/// The type of scheduling event recorded. Processes are referred to by their
/// index in admission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// The process became ready.
    Admitted { idx: usize },
    /// The process got the CPU.
    Scheduled { idx: usize },
    /// The process lost the CPU while still needing work.
    Preempted { idx: usize },
    /// The process finished its work.
    Completed { idx: usize },
    /// Nobody was selected to run.
    Idle,
}

/// A complete run trace, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    events: Vec<TraceEvent>,
    /// Clock value when the run terminated.
    end: Tick,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, tick: Tick, kind: TraceKind) {
        self.events.push(TraceEvent { tick, kind });
    }

    pub(crate) fn finish(&mut self, end: Tick) {
        self.end = end;
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Final clock value of the run.
    pub fn end_tick(&self) -> Tick {
        self.end
    }

    /// Maximal spans of ticks with the same runner, as half-open
    /// `(from, to, runner)` intervals covering `0..end_tick()`.
    ///
    /// The number of spans is bounded by the number of events, not by the
    /// length of the run.
    pub fn spans(&self) -> Vec<(Tick, Tick, Option<usize>)> {
        let mut spans = Vec::new();
        let mut running = None;
        let mut since = 0;
        let mut events = self.events.iter().peekable();

        while let Some(tick) = events.peek().map(|e| e.tick) {
            if tick >= self.end {
                break;
            }
            let mut next = running;
            while let Some(e) = events.next_if(|e| e.tick == tick) {
                match e.kind {
                    TraceKind::Scheduled { idx } => next = Some(idx),
                    TraceKind::Completed { .. } | TraceKind::Idle => next = None,
                    TraceKind::Admitted { .. } | TraceKind::Preempted { .. } => {}
                }
            }
            if next != running {
                if tick > since {
                    spans.push((since, tick, running));
                }
                since = tick;
                running = next;
            }
        }
        if self.end > since {
            spans.push((since, self.end, running));
        }
        spans
    }

    /// Runner of every tick in `0..end_tick()`, `None` for idle ticks.
    ///
    /// Allocates one entry per tick; meant for inspecting short runs.
    pub fn timeline(&self) -> Vec<Option<usize>> {
        self.spans()
            .into_iter()
            .flat_map(|(from, to, runner)| (from..to).map(move |_| runner))
            .collect()
    }

    fn ticks_where(&self, runner: Option<usize>) -> Tick {
        self.spans()
            .into_iter()
            .filter(|&(_, _, r)| r == runner)
            .map(|(from, to, _)| to - from)
            .sum()
    }

    /// Ticks during which the process held the CPU.
    pub fn total_runtime(&self, idx: usize) -> Tick {
        self.ticks_where(Some(idx))
    }

    /// Number of times the process was given the CPU.
    pub fn schedule_count(&self, idx: usize) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Scheduled { idx: i } if i == idx))
            .count()
    }

    pub fn preempt_count(&self, idx: usize) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Preempted { idx: i } if i == idx))
            .count()
    }

    /// Ticks nobody ran.
    pub fn idle_ticks(&self) -> Tick {
        self.ticks_where(None)
    }

    /// Times any process was given the CPU.
    pub fn dispatches(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Scheduled { .. }))
            .count()
    }

    /// Times a process lost the CPU before completing.
    pub fn preemptions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Preempted { .. }))
            .count()
    }

    /// Pretty-print the trace for debugging. `names` maps indices to process
    /// names.
    pub fn dump(&self, names: &[String]) {
        let name = |idx: usize| names.get(idx).map_or("?", String::as_str);
        for event in &self.events {
            let desc = match event.kind {
                TraceKind::Admitted { idx } => format!("ADMIT    {}", name(idx)),
                TraceKind::Scheduled { idx } => format!("SCHED    {}", name(idx)),
                TraceKind::Preempted { idx } => format!("PREEMPT  {}", name(idx)),
                TraceKind::Completed { idx } => format!("COMPLETE {}", name(idx)),
                TraceKind::Idle => "IDLE".to_string(),
            };
            eprintln!("[{:>10}] {}", event.tick, desc);
        }
        eprintln!("[{:>10}] END", self.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trace {
        // P0 runs 0..2, P1 preempts it for 2..3, P0 finishes 3..4, idle at 4,
        // P2 runs 5..6.
        let mut t = Trace::new();
        t.record(0, TraceKind::Admitted { idx: 0 });
        t.record(0, TraceKind::Scheduled { idx: 0 });
        t.record(2, TraceKind::Admitted { idx: 1 });
        t.record(2, TraceKind::Scheduled { idx: 1 });
        t.record(2, TraceKind::Preempted { idx: 0 });
        t.record(3, TraceKind::Completed { idx: 1 });
        t.record(3, TraceKind::Scheduled { idx: 0 });
        t.record(4, TraceKind::Completed { idx: 0 });
        t.record(4, TraceKind::Idle);
        t.record(5, TraceKind::Admitted { idx: 2 });
        t.record(5, TraceKind::Scheduled { idx: 2 });
        t.record(6, TraceKind::Completed { idx: 2 });
        t.finish(6);
        t
    }

    #[test]
    fn test_timeline() {
        let t = sample();
        assert_eq!(
            t.timeline(),
            [Some(0), Some(0), Some(1), Some(0), None, Some(2)]
        );
        assert_eq!(
            t.spans(),
            [
                (0, 2, Some(0)),
                (2, 3, Some(1)),
                (3, 4, Some(0)),
                (4, 5, None),
                (5, 6, Some(2)),
            ]
        );
    }

    #[test]
    fn test_counters() {
        let t = sample();
        assert_eq!(t.total_runtime(0), 3);
        assert_eq!(t.total_runtime(1), 1);
        assert_eq!(t.total_runtime(2), 1);
        assert_eq!(t.schedule_count(0), 2);
        assert_eq!(t.preempt_count(0), 1);
        assert_eq!(t.idle_ticks(), 1);
        assert_eq!(t.dispatches(), 4);
        assert_eq!(t.preemptions(), 1);
    }

    #[test]
    fn test_long_idle_gap_counted_from_spans() {
        // A single unit of work arriving after a long idle stretch.
        let gap: Tick = 1 << 40;
        let mut t = Trace::new();
        t.record(0, TraceKind::Idle);
        t.record(gap, TraceKind::Admitted { idx: 0 });
        t.record(gap, TraceKind::Scheduled { idx: 0 });
        t.record(gap + 1, TraceKind::Completed { idx: 0 });
        t.finish(gap + 1);

        assert_eq!(t.spans(), [(0, gap, None), (gap, gap + 1, Some(0))]);
        assert_eq!(t.idle_ticks(), gap);
        assert_eq!(t.total_runtime(0), 1);
    }
}
