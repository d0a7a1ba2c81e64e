//! Core data types for the CPM scheduling engine.

use chrono::NaiveDate;
use pyo3::prelude::*;

/// Precedence relationship kind between two activities.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DependencyType {
    /// Successor may start once the predecessor finishes (most common).
    FinishToStart,
    /// Successor may start once the predecessor starts.
    StartToStart,
    /// Successor may finish once the predecessor finishes.
    FinishToFinish,
    /// Successor may finish once the predecessor starts (rare).
    StartToFinish,
}

/// A unit of work to be scheduled.
///
/// Only `id` and `duration` feed the calculation; `code`, `name` and
/// `percent_complete` are carried through to the Gantt projection.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Activity {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub code: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Duration in working days, >= 1.
    #[pyo3(get, set)]
    pub duration: i64,
    #[pyo3(get, set)]
    pub percent_complete: f64,
}

#[pymethods]
impl Activity {
    #[new]
    #[pyo3(signature = (id, code, name, duration, percent_complete=0.0))]
    fn new(id: String, code: String, name: String, duration: i64, percent_complete: f64) -> Self {
        Self {
            id,
            code,
            name,
            duration,
            percent_complete,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={:?}, code={:?}, duration={})",
            self.id, self.code, self.duration
        )
    }
}

/// A directed precedence edge between two activities.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub predecessor_id: String,
    #[pyo3(get, set)]
    pub successor_id: String,
    #[pyo3(get, set)]
    pub dep_type: DependencyType,
    /// Day offset applied to the constraint; negative = lead, positive = lag.
    #[pyo3(get, set)]
    pub lag: i64,
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (predecessor_id, successor_id, dep_type=DependencyType::FinishToStart, lag=0))]
    fn new(
        predecessor_id: String,
        successor_id: String,
        dep_type: DependencyType,
        lag: i64,
    ) -> Self {
        Self {
            predecessor_id,
            successor_id,
            dep_type,
            lag,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency(predecessor_id={:?}, successor_id={:?}, type={:?}, lag={})",
            self.predecessor_id, self.successor_id, self.dep_type, self.lag
        )
    }
}

/// Computed timing for one activity after a calculation run.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityTiming {
    #[pyo3(get, set)]
    pub activity_id: String,
    #[pyo3(get, set)]
    pub code: String,
    #[pyo3(get, set)]
    pub early_start: i64,
    #[pyo3(get, set)]
    pub early_finish: i64,
    #[pyo3(get, set)]
    pub late_start: i64,
    #[pyo3(get, set)]
    pub late_finish: i64,
    #[pyo3(get, set)]
    pub total_float: i64,
    #[pyo3(get, set)]
    pub free_float: i64,
    #[pyo3(get, set)]
    pub is_critical: bool,
}

#[pymethods]
impl ActivityTiming {
    #[new]
    #[pyo3(signature = (
        activity_id,
        code,
        early_start,
        early_finish,
        late_start,
        late_finish,
        total_float,
        free_float=0,
        is_critical=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        activity_id: String,
        code: String,
        early_start: i64,
        early_finish: i64,
        late_start: i64,
        late_finish: i64,
        total_float: i64,
        free_float: i64,
        is_critical: bool,
    ) -> Self {
        Self {
            activity_id,
            code,
            early_start,
            early_finish,
            late_start,
            late_finish,
            total_float,
            free_float,
            is_critical,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ActivityTiming(activity_id={:?}, es={}, ef={}, ls={}, lf={}, float={}, critical={})",
            self.activity_id,
            self.early_start,
            self.early_finish,
            self.late_start,
            self.late_finish,
            self.total_float,
            self.is_critical
        )
    }
}

/// Result of a full CPM calculation over one schedule.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleResult {
    /// Per-activity timings, in the order the activities were supplied.
    #[pyo3(get, set)]
    pub timings: Vec<ActivityTiming>,
    /// Activity codes along one traversal of the critical subgraph.
    #[pyo3(get, set)]
    pub critical_path: Vec<String>,
    /// Project length in days (max early finish).
    #[pyo3(get, set)]
    pub total_duration: i64,
}

#[pymethods]
impl ScheduleResult {
    #[new]
    #[pyo3(signature = (timings, critical_path=Vec::new(), total_duration=0))]
    fn new(timings: Vec<ActivityTiming>, critical_path: Vec<String>, total_duration: i64) -> Self {
        Self {
            timings,
            critical_path,
            total_duration,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(activities={}, total_duration={}, critical_path={:?})",
            self.timings.len(),
            self.total_duration,
            self.critical_path
        )
    }
}

/// One bar of the Gantt projection.
#[pyclass]
#[derive(Clone, Debug)]
pub struct GanttTask {
    #[pyo3(get, set)]
    pub activity_id: String,
    #[pyo3(get, set)]
    pub code: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub start_date: NaiveDate,
    #[pyo3(get, set)]
    pub end_date: NaiveDate,
    #[pyo3(get, set)]
    pub duration: i64,
    #[pyo3(get, set)]
    pub progress: f64,
    /// Codes of this activity's predecessors.
    #[pyo3(get, set)]
    pub predecessors: Vec<String>,
    #[pyo3(get, set)]
    pub is_critical: bool,
    #[pyo3(get, set)]
    pub total_float: i64,
}

#[pymethods]
impl GanttTask {
    #[new]
    #[pyo3(signature = (
        activity_id,
        code,
        name,
        start_date,
        end_date,
        duration,
        progress=0.0,
        predecessors=Vec::new(),
        is_critical=false,
        total_float=0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        activity_id: String,
        code: String,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration: i64,
        progress: f64,
        predecessors: Vec<String>,
        is_critical: bool,
        total_float: i64,
    ) -> Self {
        Self {
            activity_id,
            code,
            name,
            start_date,
            end_date,
            duration,
            progress,
            predecessors,
            is_critical,
            total_float,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "GanttTask(code={:?}, start={}, end={}, critical={})",
            self.code, self.start_date, self.end_date, self.is_critical
        )
    }
}

/// Full Gantt view of a calculated schedule.
#[pyclass]
#[derive(Clone, Debug)]
pub struct GanttData {
    #[pyo3(get, set)]
    pub tasks: Vec<GanttTask>,
    #[pyo3(get, set)]
    pub critical_path: Vec<String>,
    #[pyo3(get, set)]
    pub start_date: NaiveDate,
    #[pyo3(get, set)]
    pub end_date: NaiveDate,
    #[pyo3(get, set)]
    pub total_duration: i64,
}

#[pymethods]
impl GanttData {
    #[new]
    fn new(
        tasks: Vec<GanttTask>,
        critical_path: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_duration: i64,
    ) -> Self {
        Self {
            tasks,
            critical_path,
            start_date,
            end_date,
            total_duration,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "GanttData(tasks={}, start={}, end={}, total_duration={})",
            self.tasks.len(),
            self.start_date,
            self.end_date,
            self.total_duration
        )
    }
}
