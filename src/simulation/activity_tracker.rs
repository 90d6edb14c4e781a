//! Activity occupancy and runtime tracking
//!
//! The tracker records every entry into and exit from a tracked activity,
//! keeps a snapshot of all occupancy counts after each change, and collects
//! the duration of every completed activity. At the end of a run the data is
//! exported as three files:
//!
//! - `queue_size_tracking.log`: the entry/exit audit trail, one line per change
//! - `queue_size_tracking.csv`: occupancy history, one row per snapshot
//! - `activity_time_log.csv`: max/min/mean per activity plus every duration

use crate::simulation::{SimTime, SimulationResult};
use crate::types::Activity;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// File name of the entry/exit audit log
pub const AUDIT_LOG_FILE: &str = "queue_size_tracking.log";
/// File name of the occupancy history table
pub const OCCUPANCY_FILE: &str = "queue_size_tracking.csv";
/// File name of the runtime statistics table
pub const RUNTIME_FILE: &str = "activity_time_log.csv";

#[derive(Debug, Clone)]
struct Snapshot {
    /// Counts indexed like `TrackerState::order`; activities first seen later are absent
    counts: Vec<u32>,
    timestamp: f64,
}

#[derive(Debug, Default)]
struct TrackerState {
    ended: bool,
    audit_log: Vec<String>,
    order: Vec<Activity>,
    counts: HashMap<Activity, u32>,
    history: Vec<Snapshot>,
    runtimes: Vec<(Activity, Vec<f64>)>,
}

impl TrackerState {
    fn change(&mut self, activity: Activity, time: SimTime, entry: bool) {
        if self.ended {
            return;
        }

        let direction = if entry { "entry" } else { "exit" };
        self.audit_log.push(format!("{}, {}, {}", time, activity, direction));

        if entry {
            if !self.counts.contains_key(&activity) {
                self.order.push(activity);
            }
            *self.counts.entry(activity).or_insert(0) += 1;
        } else {
            let count = self.counts.get_mut(&activity).unwrap_or_else(|| {
                panic!("exit from activity {} that was never entered (t={})", activity, time)
            });
            assert!(*count > 0, "occupancy of {} would go negative (t={})", activity, time);
            *count -= 1;
        }

        let counts = self.order.iter().map(|a| self.counts[a]).collect();
        self.history.push(Snapshot { counts, timestamp: time.rounded() });
    }
}

/// Runtime statistics of one activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeStats {
    /// Activity the durations belong to
    pub activity: Activity,
    /// Number of completed executions
    pub count: usize,
    /// Longest duration
    pub max: f64,
    /// Shortest duration
    pub min: f64,
    /// Mean duration
    pub mean: f64,
}

/// Summary computed while exporting the tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityReport {
    /// Highest concurrent occupancy per activity, in first-seen order
    pub peak_occupancy: Vec<(Activity, u32)>,
    /// Highest of all peaks
    pub max_of_maxes: u32,
    /// Duration statistics per activity, in first-recorded order
    pub runtimes: Vec<RuntimeStats>,
}

impl ActivityReport {
    /// Peak occupancy of one activity, if it was ever entered
    pub fn peak(&self, activity: Activity) -> Option<u32> {
        self.peak_occupancy.iter().find(|(a, _)| *a == activity).map(|(_, peak)| *peak)
    }

    /// Runtime statistics of one activity, if any duration was recorded
    pub fn runtime(&self, activity: Activity) -> Option<&RuntimeStats> {
        self.runtimes.iter().find(|stats| stats.activity == activity)
    }

    /// Get a formatted summary
    pub fn summary(&self) -> String {
        let mut out = String::from("Queue size statistics:\n");
        for (activity, peak) in &self.peak_occupancy {
            let _ = writeln!(out, "  {}: MAX={}", activity, peak);
        }
        let _ = writeln!(out, "  Max of maxes: {}", self.max_of_maxes);
        out.push_str("\nActivity runtime duration statistics:\n");
        let _ = writeln!(out, "  {:<22} {:>10} {:>10} {:>10}", "Activity", "max", "min", "average");
        for stats in &self.runtimes {
            let _ = writeln!(
                out,
                "  {:<22} {:>10.2} {:>10.2} {:>10.2}",
                stats.activity.as_str(),
                stats.max,
                stats.min,
                stats.mean
            );
        }
        out
    }
}

/// Thread-safe recorder of activity occupancy and durations
///
/// One tracker is created per run and shared by every process of that run.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    state: Mutex<TrackerState>,
}

impl ActivityTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an entry into `activity` at `time`
    pub fn enter(&self, activity: Activity, time: SimTime) {
        self.lock().change(activity, time, true);
    }

    /// Record an exit from `activity` at `time`
    ///
    /// # Panics
    /// Panics if the activity has no occupant, unless the tracker has ended.
    pub fn exit(&self, activity: Activity, time: SimTime) {
        self.lock().change(activity, time, false);
    }

    /// Append one completed duration for `activity`
    pub fn record_duration(&self, activity: Activity, duration: f64) {
        let mut state = self.lock();
        match state.runtimes.iter_mut().find(|(a, _)| *a == activity) {
            Some((_, durations)) => durations.push(duration),
            None => state.runtimes.push((activity, vec![duration])),
        }
    }

    /// Stop tracking; later entries and exits are ignored
    pub fn mark_ended(&self) {
        self.lock().ended = true;
    }

    /// Whether [`ActivityTracker::mark_ended`] was called
    pub fn is_ended(&self) -> bool {
        self.lock().ended
    }

    /// Current number of occupants of `activity`
    pub fn occupancy(&self, activity: Activity) -> u32 {
        self.lock().counts.get(&activity).copied().unwrap_or(0)
    }

    /// Copy of the audit log lines
    pub fn audit_log(&self) -> Vec<String> {
        self.lock().audit_log.clone()
    }

    /// Number of occupancy snapshots taken so far
    pub fn snapshot_count(&self) -> usize {
        self.lock().history.len()
    }

    /// All durations recorded for `activity`
    pub fn durations(&self, activity: Activity) -> Vec<f64> {
        self.lock()
            .runtimes
            .iter()
            .find(|(a, _)| *a == activity)
            .map(|(_, durations)| durations.clone())
            .unwrap_or_default()
    }

    /// Compute the report without writing anything
    pub fn report(&self) -> ActivityReport {
        let state = self.lock();
        Self::build_report(&state)
    }

    fn build_report(state: &TrackerState) -> ActivityReport {
        let mut peaks = vec![0u32; state.order.len()];
        for snapshot in &state.history {
            for (peak, count) in peaks.iter_mut().zip(&snapshot.counts) {
                *peak = (*peak).max(*count);
            }
        }
        let max_of_maxes = peaks.iter().copied().max().unwrap_or(0);

        let runtimes = state
            .runtimes
            .iter()
            .map(|(activity, durations)| {
                let max = durations.iter().copied().fold(f64::MIN, f64::max);
                let min = durations.iter().copied().fold(f64::MAX, f64::min);
                let mean = durations.iter().sum::<f64>() / durations.len() as f64;
                RuntimeStats { activity: *activity, count: durations.len(), max, min, mean }
            })
            .collect();

        ActivityReport {
            peak_occupancy: state.order.iter().copied().zip(peaks).collect(),
            max_of_maxes,
            runtimes,
        }
    }

    /// Write the audit log, occupancy history and runtime table into `dir`
    pub fn export_snapshot<P: AsRef<Path>>(&self, dir: P) -> SimulationResult<ActivityReport> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let state = self.lock();

        let mut audit = BufWriter::new(File::create(dir.join(AUDIT_LOG_FILE))?);
        for line in &state.audit_log {
            writeln!(audit, "{}", line)?;
        }
        audit.flush()?;

        let mut occupancy = BufWriter::new(File::create(dir.join(OCCUPANCY_FILE))?);
        for activity in &state.order {
            write!(occupancy, "{}, ", activity)?;
        }
        writeln!(occupancy, "timestamp, ")?;
        for snapshot in &state.history {
            for index in 0..state.order.len() {
                match snapshot.counts.get(index) {
                    Some(count) => write!(occupancy, "{}, ", count)?,
                    None => write!(occupancy, ", ")?,
                }
            }
            writeln!(occupancy, "{}, ", snapshot.timestamp)?;
        }
        occupancy.flush()?;

        let report = Self::build_report(&state);

        let mut runtime = BufWriter::new(File::create(dir.join(RUNTIME_FILE))?);
        writeln!(runtime, "{:<22}, {:<22}, {:<22}, {:<22}", "Activity", "max", "min", "average")?;
        for stats in &report.runtimes {
            writeln!(
                runtime,
                "{:<22}, {:<22}, {:<22}, {:<22}",
                stats.activity.as_str(),
                stats.max,
                stats.min,
                stats.mean
            )?;
        }
        write!(runtime, "\n\nExhaustive list of execution time:")?;
        for (activity, durations) in &state.runtimes {
            write!(runtime, "\n{}, ", activity)?;
            for duration in durations {
                write!(runtime, "{}, ", duration)?;
            }
        }
        runtime.flush()?;

        debug!(
            entries = state.audit_log.len(),
            snapshots = state.history.len(),
            "Activity tracker exported"
        );
        info!("Saved statistics to {}", dir.display());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: f64) -> SimTime {
        SimTime::new(value)
    }

    #[test]
    fn test_enter_exit_counts() {
        let tracker = ActivityTracker::new();
        tracker.enter(Activity::Support, t(1.0));
        tracker.enter(Activity::Support, t(2.0));
        tracker.exit(Activity::Support, t(3.0));
        assert_eq!(tracker.occupancy(Activity::Support), 1);
        assert_eq!(tracker.snapshot_count(), 3);
        assert_eq!(
            tracker.audit_log(),
            vec!["1, support, entry", "2, support, entry", "3, support, exit"]
        );
    }

    #[test]
    #[should_panic(expected = "never entered")]
    fn test_exit_unknown_activity_panics() {
        let tracker = ActivityTracker::new();
        tracker.exit(Activity::RebootDevice, t(1.0));
    }

    #[test]
    #[should_panic(expected = "negative")]
    fn test_double_exit_panics() {
        let tracker = ActivityTracker::new();
        tracker.enter(Activity::RebootDevice, t(1.0));
        tracker.exit(Activity::RebootDevice, t(2.0));
        tracker.exit(Activity::RebootDevice, t(3.0));
    }

    #[test]
    fn test_changes_ignored_after_end() {
        let tracker = ActivityTracker::new();
        tracker.enter(Activity::Support, t(1.0));
        tracker.mark_ended();
        assert!(tracker.is_ended());
        tracker.exit(Activity::Support, t(2.0));
        tracker.exit(Activity::UpdateIncident, t(2.0));
        tracker.enter(Activity::IsHwIssue, t(2.0));
        assert_eq!(tracker.occupancy(Activity::Support), 1);
        assert_eq!(tracker.audit_log().len(), 1);
    }

    #[test]
    fn test_report_peaks_and_runtimes() {
        let tracker = ActivityTracker::new();
        tracker.enter(Activity::Support, t(0.0));
        tracker.enter(Activity::IsConfigCorrect, t(0.0));
        tracker.enter(Activity::IsConfigCorrect, t(1.0));
        tracker.exit(Activity::IsConfigCorrect, t(2.0));
        tracker.exit(Activity::IsConfigCorrect, t(3.0));
        tracker.exit(Activity::Support, t(4.0));
        tracker.record_duration(Activity::IsConfigCorrect, 2.0);
        tracker.record_duration(Activity::IsConfigCorrect, 4.0);
        tracker.record_duration(Activity::Support, 4.0);

        let report = tracker.report();
        assert_eq!(report.peak(Activity::Support), Some(1));
        assert_eq!(report.peak(Activity::IsConfigCorrect), Some(2));
        assert_eq!(report.max_of_maxes, 2);
        let stats = report.runtime(Activity::IsConfigCorrect).unwrap();
        assert_eq!((stats.count, stats.max, stats.min, stats.mean), (2, 4.0, 2.0, 3.0));
        assert!(report.summary().contains("Max of maxes: 2"));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = ActivityTracker::new();
        tracker.enter(Activity::Support, t(0.5));
        tracker.enter(Activity::IsConfigCorrect, t(1.234));
        tracker.exit(Activity::IsConfigCorrect, t(2.0));
        tracker.record_duration(Activity::IsConfigCorrect, 0.766);

        let report = tracker.export_snapshot(dir.path()).unwrap();
        assert_eq!(report.max_of_maxes, 1);

        let audit = fs::read_to_string(dir.path().join(AUDIT_LOG_FILE)).unwrap();
        assert_eq!(audit.lines().count(), 3);
        assert!(audit.starts_with("0.5, support, entry\n"));

        let occupancy = fs::read_to_string(dir.path().join(OCCUPANCY_FILE)).unwrap();
        let lines: Vec<&str> = occupancy.lines().collect();
        assert_eq!(lines[0], "support, is_config_correct, timestamp, ");
        assert_eq!(lines[1], "1, , 0.5, ");
        assert_eq!(lines[2], "1, 1, 1.23, ");
        assert_eq!(lines[3], "1, 0, 2, ");

        let runtime = fs::read_to_string(dir.path().join(RUNTIME_FILE)).unwrap();
        assert!(runtime.starts_with("Activity"));
        assert!(runtime.contains("Exhaustive list of execution time:"));
        assert!(runtime.contains("\nis_config_correct, 0.766, "));
    }

    #[test]
    fn test_export_empty_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let report = ActivityTracker::new().export_snapshot(dir.path()).unwrap();
        assert_eq!(report, ActivityReport::default());
        let occupancy = fs::read_to_string(dir.path().join(OCCUPANCY_FILE)).unwrap();
        assert_eq!(occupancy, "timestamp, \n");
    }
}
