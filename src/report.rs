// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Final schedule report and per-run statistics.

use std::io::{self, Write};

use serde::Serialize;

use crate::engine::Outcome;
use crate::policy::Policy;
use crate::types::Tick;

/// Schedule of one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub start: Tick,
    pub end: Tick,
    pub ready_time: Tick,
    pub burst: Tick,
    /// `end - ready_time`
    pub turnaround: Tick,
    /// Ticks spent ready but not running.
    pub waiting: Tick,
    /// `start - ready_time`
    pub response: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub policy: Policy,
    /// Clock value when the last process completed.
    pub makespan: Tick,
    pub idle_ticks: Tick,
    pub dispatches: usize,
    pub preemptions: usize,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Sorted by `end`, ties in admission order.
    pub rows: Vec<ReportRow>,
    pub summary: Summary,
}

impl Report {
    pub fn new(outcome: &Outcome) -> Self {
        let mut rows: Vec<ReportRow> = outcome
            .procs
            .iter()
            .map(|p| {
                // A finished run stamps both; fall back to the arrival so a
                // report of a partial state stays well-formed.
                let start = p.start.unwrap_or(p.ready_time);
                let end = p.end.unwrap_or(start);
                let turnaround = end.saturating_sub(p.ready_time);
                ReportRow {
                    name: p.name.clone(),
                    start,
                    end,
                    ready_time: p.ready_time,
                    burst: p.burst,
                    turnaround,
                    waiting: turnaround.saturating_sub(p.burst),
                    response: start.saturating_sub(p.ready_time),
                }
            })
            .collect();
        rows.sort_by_key(|r| r.end);

        let avg = |f: fn(&ReportRow) -> Tick| {
            if rows.is_empty() {
                0.0
            } else {
                rows.iter().map(f).sum::<Tick>() as f64 / rows.len() as f64
            }
        };
        let summary = Summary {
            policy: outcome.policy,
            makespan: outcome.trace.end_tick(),
            idle_ticks: outcome.trace.idle_ticks(),
            dispatches: outcome.trace.dispatches(),
            preemptions: outcome.trace.preemptions(),
            avg_turnaround: avg(|r| r.turnaround),
            avg_waiting: avg(|r| r.waiting),
            avg_response: avg(|r| r.response),
        };

        Report { rows, summary }
    }

    /// `name start end`, one line per process.
    pub fn write_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for row in &self.rows {
            writeln!(w, "{} {} {}", row.name, row.start, row.end)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, w: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self)?;
        writeln!(w)
    }

    pub fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let s = &self.summary;
        writeln!(
            w,
            "policy={} makespan={} idle={} dispatch={} preempt={}",
            s.policy, s.makespan, s.idle_ticks, s.dispatches, s.preemptions
        )?;
        writeln!(
            w,
            "avg turnaround={:.2} waiting={:.2} response={:.2}",
            s.avg_turnaround, s.avg_waiting, s.avg_response
        )?;
        for row in &self.rows {
            writeln!(
                w,
                "  {:<16} ready={:<6} burst={:<6} turnaround={:<6} waiting={:<6} response={}",
                row.name, row.ready_time, row.burst, row.turnaround, row.waiting, row.response
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Process, ProcessDef};
    use crate::trace::{Trace, TraceKind};

    #[test]
    fn test_report_after_long_idle_gap() {
        let ready: Tick = 400_000_000;
        let mut proc = Process::new(&ProcessDef::new("A", ready, 1));
        proc.exec_time = 0;
        proc.start = Some(ready);
        proc.end = Some(ready + 1);

        let mut trace = Trace::new();
        trace.record(0, TraceKind::Idle);
        trace.record(ready, TraceKind::Admitted { idx: 0 });
        trace.record(ready, TraceKind::Scheduled { idx: 0 });
        trace.record(ready + 1, TraceKind::Completed { idx: 0 });
        trace.finish(ready + 1);

        let outcome = Outcome {
            policy: Policy::Fifo,
            procs: vec![proc],
            trace,
        };
        let report = Report::new(&outcome);
        assert_eq!(report.summary.makespan, ready + 1);
        assert_eq!(report.summary.idle_ticks, ready);
        assert_eq!(report.summary.dispatches, 1);

        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A 400000000 400000001\n");
    }
}
