//! CSV metrics export.
//!
//! Creates two files in the configured output directory:
//! - `tick_metrics.csv` — one row per tick of fleet-level counts
//! - `task_log.csv`     — one row per finished task

use std::fs::File;
use std::path::Path;

use csv::Writer;

use pf_core::{AgentId, Tick};
use pf_dispatch::scheduler::TaskSpec;

use crate::observer::{FleetObserver, TickSummary};
use crate::SimResult;

/// A [`FleetObserver`] that appends fleet metrics to CSV files.
///
/// Observer hooks are infallible, so write errors are held back and
/// surfaced by [`finish`](Self::finish) — call it when the run ends.
pub struct CsvMetricsObserver {
    metrics: Writer<File>,
    tasks: Writer<File>,
    error: Option<csv::Error>,
}

impl CsvMetricsObserver {
    /// Open (or create) the two CSV files in `dir` and write header rows.
    pub fn new(dir: &Path) -> SimResult<Self> {
        let mut metrics = Writer::from_path(dir.join("tick_metrics.csv"))?;
        metrics.write_record([
            "tick",
            "active_agents",
            "dwelling",
            "pending_crane",
            "pending_gantry",
            "finished_tasks",
            "mean_speed",
            "total_waiting_ticks",
        ])?;

        let mut tasks = Writer::from_path(dir.join("task_log.csv"))?;
        tasks.write_record(["tick", "agent", "kind", "destination"])?;

        Ok(Self { metrics, tasks, error: None })
    }

    fn record(&mut self, result: Result<(), csv::Error>) {
        if self.error.is_none()
            && let Err(e) = result
        {
            self.error = Some(e);
        }
    }

    /// Flush both files and surface the first deferred write error, if any.
    pub fn finish(mut self) -> SimResult<()> {
        self.metrics.flush()?;
        self.tasks.flush()?;
        match self.error.take() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl FleetObserver for CsvMetricsObserver {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let result = self.metrics.write_record(&[
            tick.0.to_string(),
            summary.active_agents.to_string(),
            summary.dwelling.to_string(),
            summary.pending_crane.to_string(),
            summary.pending_gantry.to_string(),
            summary.finished_tasks.to_string(),
            format!("{:.3}", summary.mean_speed),
            summary.total_waiting_ticks.to_string(),
        ]);
        self.record(result);
    }

    fn on_task_finished(&mut self, tick: Tick, agent: AgentId, task: &TaskSpec) {
        let result = self.tasks.write_record(&[
            tick.0.to_string(),
            agent.0.to_string(),
            task.kind.as_str().to_string(),
            task.id.0.to_string(),
        ]);
        self.record(result);
    }
}
