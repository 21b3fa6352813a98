//! Metric files for one run directory.
//!
//! `metrics.jsonl` gets one `CycleMetrics` per line, `metrics.csv` the same
//! in flat form (header written once, when the file is created), and
//! `summary.json` is rewritten wholesale.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ObserverError;
use crate::model::{AgentMetrics, CycleMetrics, RunSummary};

pub const METRICS_JSONL: &str = "metrics.jsonl";
pub const METRICS_CSV: &str = "metrics.csv";
pub const SUMMARY_JSON: &str = "summary.json";

const CSV_HEADER: &str = "cycle_id,timestamp,\
a_step_count,a_open_end_ratio,a_avg_step_length,a_is_silent,a_profile_changed,a_artifact_type,\
b_step_count,b_open_end_ratio,b_avg_step_length,b_is_silent,b_profile_changed,b_artifact_type,\
both_silent";

pub struct MetricsRecorder {
    dir: PathBuf,
}

impl MetricsRecorder {
    /// Create the directory if needed and write the CSV header on first use.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ObserverError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ObserverError::io(&dir, e))?;
        let recorder = Self { dir };

        let csv = recorder.csv_path();
        if !csv.exists() {
            fs::write(&csv, format!("{CSV_HEADER}\n")).map_err(|e| ObserverError::io(&csv, e))?;
        }
        Ok(recorder)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn jsonl_path(&self) -> PathBuf {
        self.dir.join(METRICS_JSONL)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(METRICS_CSV)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_JSON)
    }

    /// Append one cycle to both metric files.
    pub fn record(&self, metrics: &CycleMetrics) -> Result<(), ObserverError> {
        let line = serde_json::to_string(metrics)?;
        append_line(&self.jsonl_path(), &line)?;
        append_line(&self.csv_path(), &csv_row(metrics))?;
        debug!(cycle = metrics.cycle, dir = %self.dir.display(), "Cycle metrics recorded");
        Ok(())
    }

    pub fn write_summary(&self, summary: &RunSummary) -> Result<(), ObserverError> {
        let path = self.summary_path();
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json).map_err(|e| ObserverError::io(&path, e))
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), ObserverError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ObserverError::io(path, e))?;
    writeln!(file, "{line}").map_err(|e| ObserverError::io(path, e))
}

fn csv_columns(m: Option<&AgentMetrics>) -> [String; 6] {
    match m {
        Some(m) => [
            m.step_count.to_string(),
            format!("{:.2}", m.open_end_ratio),
            format!("{:.1}", m.avg_step_length),
            m.is_silent.to_string(),
            m.profile_changed.to_string(),
            m.artifact_type.clone(),
        ],
        None => [
            "0".into(),
            "0".into(),
            "0".into(),
            "false".into(),
            "false".into(),
            String::new(),
        ],
    }
}

fn csv_row(m: &CycleMetrics) -> String {
    let mut row = vec![m.cycle.to_string(), m.timestamp.to_rfc3339()];
    row.extend(csv_columns(m.first.as_ref()));
    row.extend(csv_columns(m.second.as_ref()));
    row.push(m.both_silent.to_string());
    row.join(",")
}
