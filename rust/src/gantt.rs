//! Gantt projection: maps computed day offsets onto calendar dates.
//!
//! Pure presentation transform over a calculated schedule; inputs are never
//! mutated and no scheduling math happens here.

use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::models::{Activity, ActivityTiming, Dependency, GanttData, GanttTask, ScheduleResult};

/// Errors producing the Gantt view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GanttError {
    #[error("No computed timing for activity: {0}")]
    MissingTiming(String),
}

/// Calendar date for a day offset from the schedule start.
#[inline]
fn calendar_date(start_date: NaiveDate, day_offset: i64) -> NaiveDate {
    start_date + Duration::days(day_offset)
}

/// Project a calculated schedule onto calendar dates.
///
/// Bars are placed on early start/finish. Each task carries its progress
/// percentage (passed through), critical flag, total float, and the codes of
/// its predecessors.
pub fn project(
    activities: &[Activity],
    dependencies: &[Dependency],
    schedule: &ScheduleResult,
    start_date: NaiveDate,
) -> Result<GanttData, GanttError> {
    let timings: FxHashMap<&str, &ActivityTiming> = schedule
        .timings
        .iter()
        .map(|t| (t.activity_id.as_str(), t))
        .collect();

    let codes: FxHashMap<&str, &str> = activities
        .iter()
        .map(|a| (a.id.as_str(), a.code.as_str()))
        .collect();

    // Predecessor codes per successor ID
    let mut predecessors: FxHashMap<&str, Vec<String>> = FxHashMap::default();
    for dep in dependencies {
        if let Some(&code) = codes.get(dep.predecessor_id.as_str()) {
            predecessors
                .entry(dep.successor_id.as_str())
                .or_default()
                .push(code.to_string());
        }
    }

    let mut tasks = Vec::with_capacity(activities.len());
    for activity in activities {
        let timing = timings
            .get(activity.id.as_str())
            .ok_or_else(|| GanttError::MissingTiming(activity.id.clone()))?;

        tasks.push(GanttTask {
            activity_id: activity.id.clone(),
            code: activity.code.clone(),
            name: activity.name.clone(),
            start_date: calendar_date(start_date, timing.early_start),
            end_date: calendar_date(start_date, timing.early_finish),
            duration: activity.duration,
            progress: activity.percent_complete,
            predecessors: predecessors
                .remove(activity.id.as_str())
                .unwrap_or_default(),
            is_critical: timing.is_critical,
            total_float: timing.total_float,
        });
    }

    Ok(GanttData {
        tasks,
        critical_path: schedule.critical_path.clone(),
        start_date,
        end_date: calendar_date(start_date, schedule.total_duration),
        total_duration: schedule.total_duration,
    })
}
