//! Rust implementation of the schedule service's CPM engine.
//!
//! This module provides the Critical Path Method calculation and the Gantt
//! projection for the scheduling system. Persistence, HTTP surface and UI
//! live on the Python side; the engine consumes a schedule snapshot and
//! returns computed values.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

pub mod config;
pub mod cpm;
pub mod gantt;
pub mod graph;
pub mod logging;
mod models;

pub use config::CpmConfig;
pub use cpm::{calculate, ActivitySchedule, CpmError, CpmResult};
pub use gantt::{project, GanttError};
pub use graph::{ActivityId, ActivityIndex, GraphError, ScheduleGraph};
pub use models::{
    Activity, ActivityTiming, Dependency, DependencyType, GanttData, GanttTask, ScheduleResult,
};

/// Run the CPM calculation for one schedule.
///
/// Computes early/late start and finish, total and free float, the critical
/// flag per activity, the project's total duration, and one traversal of the
/// critical path.
///
/// # Arguments
/// * `activities` - Activities scoped to one schedule
/// * `dependencies` - Precedence edges over those activities
/// * `config` - Optional safeguards and verbosity
///
/// # Returns
/// * ScheduleResult with per-activity timings in input order
///
/// # Raises
/// * ValueError on an empty schedule, dangling or self-referential
///   dependency, circular dependency, or activity count over the limit
#[pyfunction]
#[pyo3(signature = (activities, dependencies, config=None))]
fn calculate_schedule(
    activities: Vec<Activity>,
    dependencies: Vec<Dependency>,
    config: Option<CpmConfig>,
) -> PyResult<ScheduleResult> {
    let config = config.unwrap_or_default();

    match cpm::calculate(&activities, &dependencies, &config) {
        Ok(result) => Ok(to_schedule_result(&activities, result)),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// Flatten a calculation result into per-activity timings in input order.
fn to_schedule_result(activities: &[Activity], result: CpmResult) -> ScheduleResult {
    let timings = activities
        .iter()
        .filter_map(|activity| {
            result.schedules.get(&activity.id).map(|sched| ActivityTiming {
                activity_id: activity.id.clone(),
                code: activity.code.clone(),
                early_start: sched.early_start,
                early_finish: sched.early_finish,
                late_start: sched.late_start,
                late_finish: sched.late_finish,
                total_float: sched.total_float,
                free_float: sched.free_float,
                is_critical: sched.is_critical,
            })
        })
        .collect();

    ScheduleResult {
        timings,
        critical_path: result.critical_path,
        total_duration: result.total_duration,
    }
}

/// Project a calculated schedule onto calendar dates for chart rendering.
///
/// # Arguments
/// * `activities` - The same activities the schedule was calculated from
/// * `dependencies` - Precedence edges (for predecessor code lists)
/// * `schedule` - A ScheduleResult from calculate_schedule
/// * `start_date` - Calendar date of project day 0
///
/// # Returns
/// * GanttData with per-activity date ranges and schedule bounds
///
/// # Raises
/// * ValueError if the schedule result does not cover every activity
#[pyfunction]
fn generate_gantt(
    activities: Vec<Activity>,
    dependencies: Vec<Dependency>,
    schedule: ScheduleResult,
    start_date: NaiveDate,
) -> PyResult<GanttData> {
    match gantt::project(&activities, &dependencies, &schedule, start_date) {
        Ok(data) => Ok(data),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// The obra.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Activity>()?;
    m.add_class::<Dependency>()?;
    m.add_class::<DependencyType>()?;
    m.add_class::<ActivityTiming>()?;
    m.add_class::<ScheduleResult>()?;
    m.add_class::<GanttTask>()?;
    m.add_class::<GanttData>()?;

    // Config types
    m.add_class::<CpmConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(calculate_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(generate_gantt, m)?)?;

    Ok(())
}
