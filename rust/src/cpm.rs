//! Critical Path Method calculation: forward/backward passes, float, and
//! critical path extraction.
//!
//! The engine is a pure function over a schedule snapshot: it never mutates
//! its inputs and returns a fresh [`CpmResult`] per run, so a validation
//! failure leaves no partial state behind.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use thiserror::Error;

use crate::config::CpmConfig;
use crate::graph::{ActivityId, GraphError, ScheduleGraph};
use crate::models::{Activity, Dependency, DependencyType};
use crate::{log_changes, log_checks, log_debug};

/// Errors that can abort a calculation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpmError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Circular dependency detected in activity graph")]
    CircularDependency,
    #[error("Schedule exceeds maximum activity count: {count} > {limit}")]
    TooManyActivities { count: usize, limit: usize },
}

/// Computed schedule values for one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySchedule {
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
}

/// Result of one CPM calculation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpmResult {
    /// Computed values keyed by activity ID.
    pub schedules: FxHashMap<String, ActivitySchedule>,
    /// Activity codes along one traversal of the critical subgraph.
    pub critical_path: Vec<String>,
    /// Project length in days (max early finish).
    pub total_duration: i64,
}

/// Order activities with Kahn's algorithm so every predecessor comes before
/// its successors.
///
/// Rejects the graph if any activity never reaches in-degree 0, rather than
/// silently dropping it from the passes.
fn topological_order(graph: &ScheduleGraph) -> Result<Vec<ActivityId>, CpmError> {
    let n = graph.len();
    let mut in_degree: Vec<usize> = graph.predecessors.iter().map(|p| p.len()).collect();

    let mut queue: VecDeque<ActivityId> = (0..n as ActivityId)
        .filter(|&id| in_degree[id as usize] == 0)
        .collect();

    let mut order: Vec<ActivityId> = Vec::with_capacity(n);
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for edge in &graph.successors[id as usize] {
            let degree = &mut in_degree[edge.other as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(edge.other);
            }
        }
    }

    if order.len() != n {
        return Err(CpmError::CircularDependency);
    }

    Ok(order)
}

/// Forward pass: early start and early finish per activity.
///
/// An activity's ES is the tightest of all predecessor constraints (max over
/// incoming edges), floored at day 0 for activities with no predecessors or
/// with only lead-time constraints reaching before project start.
fn forward_pass(graph: &ScheduleGraph, order: &[ActivityId]) -> (Vec<i64>, Vec<i64>) {
    let n = graph.len();
    let mut early_start = vec![0i64; n];
    let mut early_finish = vec![0i64; n];

    for &id in order {
        let i = id as usize;
        let mut es = 0i64;
        for edge in &graph.predecessors[i] {
            let p = edge.other as usize;
            let candidate = match edge.kind {
                DependencyType::FinishToStart | DependencyType::FinishToFinish => {
                    early_finish[p] + edge.lag
                }
                DependencyType::StartToStart | DependencyType::StartToFinish => {
                    early_start[p] + edge.lag
                }
            };
            es = es.max(candidate);
        }
        early_start[i] = es;
        early_finish[i] = es + graph.durations[i];
    }

    (early_start, early_finish)
}

/// Backward pass: late start and late finish per activity, seeded by the
/// project duration (max EF).
///
/// An activity's LF is the loosest finish that still satisfies every
/// successor constraint (min over outgoing edges).
fn backward_pass(
    graph: &ScheduleGraph,
    order: &[ActivityId],
    early_finish: &[i64],
) -> (Vec<i64>, Vec<i64>, i64) {
    let n = graph.len();
    let project_duration = early_finish.iter().copied().max().unwrap_or(0);
    let mut late_start = vec![0i64; n];
    let mut late_finish = vec![0i64; n];

    for &id in order.iter().rev() {
        let i = id as usize;
        let succs = &graph.successors[i];
        let lf = if succs.is_empty() {
            project_duration
        } else {
            let mut lf = i64::MAX;
            for edge in succs {
                let s = edge.other as usize;
                let candidate = match edge.kind {
                    DependencyType::FinishToStart | DependencyType::StartToStart => {
                        late_start[s] - edge.lag
                    }
                    DependencyType::FinishToFinish | DependencyType::StartToFinish => {
                        late_finish[s] - edge.lag
                    }
                };
                lf = lf.min(candidate);
            }
            lf
        };
        late_finish[i] = lf;
        late_start[i] = lf - graph.durations[i];
    }

    (late_start, late_finish, project_duration)
}

/// Free float: how far an activity can slip without delaying any successor's
/// earliest times. For activities with no successors, slack against project
/// end.
fn free_float(
    graph: &ScheduleGraph,
    early_start: &[i64],
    early_finish: &[i64],
    project_duration: i64,
) -> Vec<i64> {
    let n = graph.len();
    let mut free = vec![0i64; n];

    for i in 0..n {
        let succs = &graph.successors[i];
        if succs.is_empty() {
            free[i] = project_duration - early_finish[i];
            continue;
        }
        let mut slack = i64::MAX;
        for edge in succs {
            let s = edge.other as usize;
            let candidate = match edge.kind {
                DependencyType::FinishToStart => early_start[s] - (early_finish[i] + edge.lag),
                DependencyType::StartToStart => early_start[s] - (early_start[i] + edge.lag),
                DependencyType::FinishToFinish => early_finish[s] - (early_finish[i] + edge.lag),
                DependencyType::StartToFinish => early_finish[s] - (early_start[i] + edge.lag),
            };
            slack = slack.min(candidate);
        }
        free[i] = slack;
    }

    free
}

/// Walk the critical subgraph depth-first from `start`, appending each
/// activity's code on first visit.
fn walk_critical(
    graph: &ScheduleGraph,
    start: ActivityId,
    critical: &[bool],
    visited: &mut [bool],
    path: &mut Vec<String>,
) {
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let i = id as usize;
        if visited[i] {
            continue;
        }
        visited[i] = true;
        path.push(graph.codes[i].clone());
        // Reverse push so successors are visited in edge order
        for edge in graph.successors[i].iter().rev() {
            if critical[edge.other as usize] && !visited[edge.other as usize] {
                stack.push(edge.other);
            }
        }
    }
}

/// Extract one ordered traversal of the critical subgraph as activity codes.
///
/// Starts from critical activities with no critical predecessor; if none
/// exists, falls back to the first critical activity. When the critical
/// subgraph branches the result is one valid traversal, not an enumeration
/// of every zero-float path.
fn extract_critical_path(graph: &ScheduleGraph, critical: &[bool], verbosity: u8) -> Vec<String> {
    let n = graph.len();
    let mut path = Vec::new();
    let mut visited = vec![false; n];

    let starts: Vec<ActivityId> = (0..n as ActivityId)
        .filter(|&id| {
            critical[id as usize]
                && !graph.predecessors[id as usize]
                    .iter()
                    .any(|edge| critical[edge.other as usize])
        })
        .collect();

    if starts.is_empty() {
        if let Some(first) = (0..n as ActivityId).find(|&id| critical[id as usize]) {
            log_checks!(
                verbosity,
                "No unambiguous critical start; walking from {:?}",
                graph.codes[first as usize]
            );
            walk_critical(graph, first, critical, &mut visited, &mut path);
        }
    } else {
        for start in starts {
            walk_critical(graph, start, critical, &mut visited, &mut path);
        }
    }

    path
}

/// Run the full CPM calculation for one schedule snapshot.
///
/// # Arguments
/// * `activities` - Activities scoped to one schedule (id, code, duration)
/// * `dependencies` - Precedence edges over those activities
/// * `config` - Safeguards and verbosity
///
/// # Returns
/// * `Ok(CpmResult)` with per-activity timings, total duration, and one
///   critical path traversal
/// * `Err(CpmError)` if the input is empty, references unknown activities,
///   contains a self-loop or cycle, or exceeds the activity limit
pub fn calculate(
    activities: &[Activity],
    dependencies: &[Dependency],
    config: &CpmConfig,
) -> Result<CpmResult, CpmError> {
    if let Some(limit) = config.max_activities {
        if activities.len() > limit {
            return Err(CpmError::TooManyActivities {
                count: activities.len(),
                limit,
            });
        }
    }

    let graph = ScheduleGraph::build(activities, dependencies)?;
    let order = topological_order(&graph)?;

    log_changes!(
        config.verbosity,
        "Calculating CPM for {} activities",
        graph.len()
    );
    log_debug!(config.verbosity, "Topological order: {:?}", order);

    let (early_start, early_finish) = forward_pass(&graph, &order);
    let (late_start, late_finish, project_duration) = backward_pass(&graph, &order, &early_finish);
    let free = free_float(&graph, &early_start, &early_finish, project_duration);

    let n = graph.len();
    let mut critical = vec![false; n];
    for i in 0..n {
        critical[i] = late_start[i] - early_start[i] == 0;
    }

    let critical_path = extract_critical_path(&graph, &critical, config.verbosity);

    log_changes!(
        config.verbosity,
        "CPM calculation complete. Project duration: {} days",
        project_duration
    );
    log_changes!(
        config.verbosity,
        "Critical path: {}",
        critical_path.join(" -> ")
    );

    let mut schedules: FxHashMap<String, ActivitySchedule> =
        FxHashMap::with_capacity_and_hasher(n, Default::default());
    for i in 0..n {
        let id = graph
            .index
            .resolve(i as ActivityId)
            .unwrap_or_default()
            .to_string();
        schedules.insert(
            id,
            ActivitySchedule {
                early_start: early_start[i],
                early_finish: early_finish[i],
                late_start: late_start[i],
                late_finish: late_finish[i],
                total_float: late_start[i] - early_start[i],
                free_float: free[i],
                is_critical: critical[i],
            },
        );
    }

    Ok(CpmResult {
        schedules,
        critical_path,
        total_duration: project_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, duration: i64) -> Activity {
        Activity {
            id: id.to_string(),
            code: id.to_uppercase(),
            name: format!("Activity {}", id),
            duration,
            percent_complete: 0.0,
        }
    }

    fn dep(pred: &str, succ: &str, kind: DependencyType, lag: i64) -> Dependency {
        Dependency {
            predecessor_id: pred.to_string(),
            successor_id: succ.to_string(),
            dep_type: kind,
            lag,
        }
    }

    fn fs(pred: &str, succ: &str) -> Dependency {
        dep(pred, succ, DependencyType::FinishToStart, 0)
    }

    fn run(activities: &[Activity], deps: &[Dependency]) -> CpmResult {
        calculate(activities, deps, &CpmConfig::default()).unwrap()
    }

    #[test]
    fn test_linear_chain() {
        let activities = vec![activity("a", 3), activity("b", 2), activity("c", 4)];
        let deps = vec![fs("a", "b"), fs("b", "c")];
        let result = run(&activities, &deps);

        let a = &result.schedules["a"];
        assert_eq!((a.early_start, a.early_finish), (0, 3));
        let b = &result.schedules["b"];
        assert_eq!((b.early_start, b.early_finish), (3, 5));
        let c = &result.schedules["c"];
        assert_eq!((c.early_start, c.early_finish), (5, 9));

        assert_eq!(result.total_duration, 9);
        for sched in result.schedules.values() {
            assert_eq!(sched.total_float, 0);
            assert!(sched.is_critical);
        }
        assert_eq!(result.critical_path, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parallel_paths_with_float() {
        // a feeds b (short) and c (long); both feed d
        let activities = vec![
            activity("a", 3),
            activity("b", 2),
            activity("c", 6),
            activity("d", 1),
        ];
        let deps = vec![fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let result = run(&activities, &deps);

        assert_eq!(result.total_duration, 10);
        assert_eq!(result.critical_path, vec!["A", "C", "D"]);

        let b = &result.schedules["b"];
        assert_eq!(b.total_float, 4);
        assert!(!b.is_critical);
        for id in ["a", "c", "d"] {
            let sched = &result.schedules[id];
            assert_eq!(sched.total_float, 0);
            assert!(sched.is_critical);
        }
    }

    #[test]
    fn test_consistency_invariants() {
        let activities = vec![
            activity("a", 3),
            activity("b", 2),
            activity("c", 6),
            activity("d", 1),
        ];
        let deps = vec![fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let result = run(&activities, &deps);

        for act in &activities {
            let sched = &result.schedules[&act.id];
            assert_eq!(sched.early_finish, sched.early_start + act.duration);
            assert_eq!(sched.late_start, sched.late_finish - act.duration);
            assert_eq!(sched.total_float, sched.late_start - sched.early_start);
            assert!(sched.total_float >= 0);
            assert_eq!(sched.is_critical, sched.total_float == 0);
        }
    }

    #[test]
    fn test_idempotence() {
        let activities = vec![activity("a", 3), activity("b", 2), activity("c", 6)];
        let deps = vec![fs("a", "b"), fs("a", "c")];
        let first = run(&activities, &deps);
        let second = run(&activities, &deps);
        assert_eq!(first, second);
    }

    #[test]
    fn test_start_to_start_lag() {
        let activities = vec![activity("a", 5), activity("b", 3)];
        let deps = vec![dep("a", "b", DependencyType::StartToStart, 2)];
        let result = run(&activities, &deps);

        let b = &result.schedules["b"];
        assert_eq!(b.early_start, 2);
        assert_eq!(b.early_finish, 5);
    }

    #[test]
    fn test_finish_to_finish() {
        let activities = vec![activity("a", 4), activity("b", 2)];
        let deps = vec![dep("a", "b", DependencyType::FinishToFinish, 0)];
        let result = run(&activities, &deps);

        // FF contributes the predecessor's EF to the successor's ES
        let b = &result.schedules["b"];
        assert_eq!(b.early_start, 4);
        assert_eq!(b.early_finish, 6);
    }

    #[test]
    fn test_negative_lag_lead() {
        // b may start one day before a finishes
        let activities = vec![activity("a", 3), activity("b", 2)];
        let deps = vec![dep("a", "b", DependencyType::FinishToStart, -1)];
        let result = run(&activities, &deps);

        let b = &result.schedules["b"];
        assert_eq!(b.early_start, 2);
        assert_eq!(b.early_finish, 4);
        assert_eq!(result.total_duration, 4);
    }

    #[test]
    fn test_single_isolated_activity() {
        let activities = vec![activity("a", 7)];
        let result = run(&activities, &[]);

        let a = &result.schedules["a"];
        assert_eq!(a.early_start, 0);
        assert_eq!(a.early_finish, 7);
        assert_eq!(a.late_start, 0);
        assert_eq!(a.late_finish, 7);
        assert_eq!(a.total_float, 0);
        assert!(a.is_critical);
        assert_eq!(result.total_duration, 7);
        assert_eq!(result.critical_path, vec!["A"]);
    }

    #[test]
    fn test_free_float() {
        let activities = vec![
            activity("a", 3),
            activity("b", 2),
            activity("c", 6),
            activity("d", 1),
        ];
        let deps = vec![fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let result = run(&activities, &deps);

        // b finishes day 5, d cannot start before day 9 anyway
        assert_eq!(result.schedules["b"].free_float, 4);
        for id in ["a", "c", "d"] {
            assert_eq!(result.schedules[id].free_float, 0);
        }
    }

    #[test]
    fn test_cycle_rejected() {
        let activities = vec![activity("a", 3), activity("b", 2)];
        let deps = vec![fs("a", "b"), fs("b", "a")];
        let result = calculate(&activities, &deps, &CpmConfig::default());
        assert_eq!(result.unwrap_err(), CpmError::CircularDependency);
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let result = calculate(&[], &[], &CpmConfig::default());
        assert_eq!(
            result.unwrap_err(),
            CpmError::Graph(GraphError::EmptySchedule)
        );
    }

    #[test]
    fn test_dangling_dependency_rejected() {
        let activities = vec![activity("a", 3)];
        let deps = vec![fs("a", "ghost")];
        let result = calculate(&activities, &deps, &CpmConfig::default());
        assert_eq!(
            result.unwrap_err(),
            CpmError::Graph(GraphError::DanglingDependency("ghost".to_string()))
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let activities = vec![activity("a", 3)];
        let deps = vec![fs("a", "a")];
        let result = calculate(&activities, &deps, &CpmConfig::default());
        assert_eq!(
            result.unwrap_err(),
            CpmError::Graph(GraphError::SelfDependency("a".to_string()))
        );
    }

    #[test]
    fn test_max_activities_limit() {
        let activities = vec![activity("a", 3), activity("b", 2)];
        let config = CpmConfig {
            max_activities: Some(1),
            verbosity: 0,
        };
        let result = calculate(&activities, &[], &config);
        assert_eq!(
            result.unwrap_err(),
            CpmError::TooManyActivities { count: 2, limit: 1 }
        );
    }

    #[test]
    fn test_branching_critical_subgraph_single_traversal() {
        // Two equal-length parallel paths: a -> b -> d and a -> c -> d.
        // All four are critical; the extractor emits each code exactly once
        // in one depth-first order, not every zero-float path.
        let activities = vec![
            activity("a", 1),
            activity("b", 2),
            activity("c", 2),
            activity("d", 1),
        ];
        let deps = vec![fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let result = run(&activities, &deps);

        for sched in result.schedules.values() {
            assert!(sched.is_critical);
        }
        assert_eq!(result.critical_path.len(), 4);
        assert_eq!(result.critical_path[0], "A");
        let mut sorted = result.critical_path.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_disconnected_components() {
        // Two independent chains; the longer one sets project duration and
        // the shorter one picks up float.
        let activities = vec![
            activity("a", 5),
            activity("b", 5),
            activity("x", 2),
            activity("y", 2),
        ];
        let deps = vec![fs("a", "b"), fs("x", "y")];
        let result = run(&activities, &deps);

        assert_eq!(result.total_duration, 10);
        assert!(result.schedules["a"].is_critical);
        assert!(result.schedules["b"].is_critical);
        assert_eq!(result.schedules["x"].total_float, 6);
        assert_eq!(result.schedules["y"].total_float, 6);
        assert_eq!(result.critical_path, vec!["A", "B"]);
    }
}
