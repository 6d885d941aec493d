//! Per-tick telemetry: CSV log, running torque statistics and run summary.
//!
//! The header is written when the log is opened. Every record is flushed as
//! soon as it is appended so the file reflects progress even if the process
//! is killed. The summary is computed from running totals; the full record
//! list is kept in memory only while history is enabled.

use pendulum_common::consts::LOG_HEADER;
use pendulum_common::motion::Status;
use serde::{Serialize, Serializer};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ControlError;

/// Immutable snapshot of one control tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    /// Completed cycles at the time of the tick.
    #[serde(rename = "Cycle")]
    pub cycle: u32,
    /// Seconds since controller start.
    #[serde(rename = "Timestamp", serialize_with = "fixed3")]
    pub timestamp: f64,
    /// Simulated position [deg].
    #[serde(rename = "Current_Position", serialize_with = "fixed3")]
    pub position: f64,
    /// Commanded position [deg].
    #[serde(rename = "Target_Position", serialize_with = "fixed3")]
    pub target_position: f64,
    /// Commanded velocity [deg/s].
    #[serde(rename = "Velocity", serialize_with = "fixed3")]
    pub velocity: f64,
    /// Gravity load at `position` [N·m].
    #[serde(rename = "Load_Torque", serialize_with = "fixed3")]
    pub load_torque: f64,
    /// Minimum-angle limit switch.
    #[serde(rename = "Limit_0", serialize_with = "flag")]
    pub limit_0: bool,
    /// Maximum-angle limit switch.
    #[serde(rename = "Limit_90", serialize_with = "flag")]
    pub limit_90: bool,
    /// Loop state label.
    #[serde(rename = "Status")]
    pub status: Status,
}

fn fixed3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{value:.3}"))
}

fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// End-of-run statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Completed up+down cycles.
    pub cycles_completed: u32,
    /// Records written, including the shutdown record.
    pub data_points: usize,
    /// Simulated position after the shutdown command [deg].
    pub final_position: f64,
    /// Timestamp of the last record [s]; `None` for an empty log.
    pub total_time: Option<f64>,
    /// Largest absolute load torque [N·m].
    pub max_load_torque: f64,
    /// Mean absolute load torque [N·m].
    pub avg_load_torque: f64,
    /// Where the CSV was written, if file-backed.
    pub log_path: Option<PathBuf>,
}

/// Running totals over every appended record.
#[derive(Debug, Default, Clone, Copy)]
struct TorqueStats {
    count: usize,
    max: f64,
    sum: f64,
}

impl TorqueStats {
    fn add(&mut self, torque: f64) {
        let t = torque.abs();
        self.count += 1;
        self.max = self.max.max(t);
        self.sum += t;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Ordered telemetry log backed by a CSV writer.
pub struct TelemetryLog<W: Write> {
    writer: csv::Writer<W>,
    history: Option<Vec<CycleRecord>>,
    last: Option<CycleRecord>,
    stats: TorqueStats,
    path: Option<PathBuf>,
}

impl TelemetryLog<File> {
    /// Create (truncate) the CSV file at `path`, creating parent directories.
    pub fn create(path: &Path) -> Result<Self, ControlError> {
        let open_err = |source| ControlError::LogOpen {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }
        let file = File::create(path).map_err(open_err)?;

        let mut log = Self::from_writer(file)?;
        log.path = Some(path.to_path_buf());
        Ok(log)
    }
}

impl<W: Write> TelemetryLog<W> {
    /// Wrap an arbitrary writer and emit the header.
    pub fn from_writer(inner: W) -> Result<Self, ControlError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(LOG_HEADER)?;
        writer.flush()?;

        Ok(Self {
            writer,
            history: Some(Vec::new()),
            last: None,
            stats: TorqueStats::default(),
            path: None,
        })
    }

    /// Keep (default) or drop the in-memory copy of every record.
    ///
    /// Long runs disable it; the CSV file and the summary are unaffected.
    pub fn with_history(mut self, keep: bool) -> Self {
        if !keep {
            self.history = None;
        } else if self.history.is_none() {
            self.history = Some(Vec::new());
        }
        self
    }

    /// Append and flush one record.
    pub fn append(&mut self, record: CycleRecord) -> Result<(), ControlError> {
        self.writer.serialize(&record)?;
        self.writer.flush()?;
        self.stats.add(record.load_torque);
        if let Some(history) = self.history.as_mut() {
            history.push(record.clone());
        }
        self.last = Some(record);
        Ok(())
    }

    /// Records in append order; empty when history is disabled.
    pub fn records(&self) -> &[CycleRecord] {
        self.history.as_deref().unwrap_or(&[])
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&CycleRecord> {
        self.last.as_ref()
    }

    /// Number of records appended.
    pub fn len(&self) -> usize {
        self.stats.count
    }

    /// `true` if no record was appended yet.
    pub fn is_empty(&self) -> bool {
        self.stats.count == 0
    }

    /// Backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Summarize the log.
    pub fn summary(&self, cycles_completed: u32, final_position: f64) -> RunSummary {
        RunSummary {
            cycles_completed,
            data_points: self.stats.count,
            final_position,
            total_time: self.last().map(|r| r.timestamp),
            max_load_torque: self.stats.max,
            avg_load_torque: self.stats.mean(),
            log_path: self.path.clone(),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, ControlError> {
        self.writer
            .into_inner()
            .map_err(|e| ControlError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}
