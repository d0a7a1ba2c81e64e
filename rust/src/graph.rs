//! Schedule graph construction: activity interning and adjacency lists.
//!
//! Converts the flat activity/dependency lists into an arena indexed by dense
//! integer IDs, with per-activity predecessor and successor edge lists. All
//! structural validation (empty schedule, dangling references, self-loops)
//! happens here, before any pass runs.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::models::{Activity, Dependency, DependencyType};

/// Dense activity ID (u32 for compact storage and fast indexing).
pub type ActivityId = u32;

/// Errors detected while building the schedule graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Schedule has no activities")]
    EmptySchedule,
    #[error("Dependency references unknown activity: {0}")]
    DanglingDependency(String),
    #[error("Activity cannot depend on itself: {0}")]
    SelfDependency(String),
}

/// Maps activity ID strings to dense integers and back.
///
/// IDs are assigned in insertion order, so iteration by integer ID preserves
/// the order activities were supplied in.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    to_int: FxHashMap<String, ActivityId>,
    from_int: Vec<String>,
}

impl ActivityIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_int: Vec::with_capacity(capacity),
        }
    }

    /// Intern a string ID, returning its integer ID.
    /// If already interned, returns the existing ID.
    pub fn intern(&mut self, s: &str) -> ActivityId {
        if let Some(&id) = self.to_int.get(s) {
            return id;
        }
        let id = self.from_int.len() as ActivityId;
        self.from_int.push(s.to_string());
        self.to_int.insert(s.to_string(), id);
        id
    }

    /// Get the integer ID for a string, if it exists.
    #[inline]
    pub fn get(&self, s: &str) -> Option<ActivityId> {
        self.to_int.get(s).copied()
    }

    /// Get the string for an integer ID.
    #[inline]
    pub fn resolve(&self, id: ActivityId) -> Option<&str> {
        self.from_int.get(id as usize).map(|s| s.as_str())
    }

    /// Number of interned activities.
    pub fn len(&self) -> usize {
        self.from_int.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.from_int.is_empty()
    }
}

/// One typed, lagged edge incident to an activity.
///
/// In a predecessor list `other` is the predecessor; in a successor list it
/// is the successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge {
    pub other: ActivityId,
    pub kind: DependencyType,
    pub lag: i64,
}

/// Validated schedule graph over dense activity IDs.
///
/// Every activity has an entry in both adjacency vectors, even if empty;
/// isolated activities are valid (they are both start and end nodes).
#[derive(Debug, Clone)]
pub struct ScheduleGraph {
    pub index: ActivityIndex,
    /// Durations in days, indexed by activity ID.
    pub durations: Vec<i64>,
    /// Display codes, indexed by activity ID.
    pub codes: Vec<String>,
    /// Incoming edges per activity.
    pub predecessors: Vec<Vec<DepEdge>>,
    /// Outgoing edges per activity.
    pub successors: Vec<Vec<DepEdge>>,
}

impl ScheduleGraph {
    /// Build the graph from flat activity and dependency lists.
    ///
    /// Rejects empty schedules, dependencies referencing unknown activities,
    /// and self-loops. Cycle detection is the topological sorter's job.
    pub fn build(
        activities: &[Activity],
        dependencies: &[Dependency],
    ) -> Result<Self, GraphError> {
        if activities.is_empty() {
            return Err(GraphError::EmptySchedule);
        }

        let mut index = ActivityIndex::with_capacity(activities.len());
        let mut durations = Vec::with_capacity(activities.len());
        let mut codes = Vec::with_capacity(activities.len());
        for activity in activities {
            index.intern(&activity.id);
            durations.push(activity.duration);
            codes.push(activity.code.clone());
        }

        let n = index.len();
        let mut predecessors: Vec<Vec<DepEdge>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<DepEdge>> = vec![Vec::new(); n];

        for dep in dependencies {
            let pred = index
                .get(&dep.predecessor_id)
                .ok_or_else(|| GraphError::DanglingDependency(dep.predecessor_id.clone()))?;
            let succ = index
                .get(&dep.successor_id)
                .ok_or_else(|| GraphError::DanglingDependency(dep.successor_id.clone()))?;
            if pred == succ {
                return Err(GraphError::SelfDependency(dep.predecessor_id.clone()));
            }

            predecessors[succ as usize].push(DepEdge {
                other: pred,
                kind: dep.dep_type,
                lag: dep.lag,
            });
            successors[pred as usize].push(DepEdge {
                other: succ,
                kind: dep.dep_type,
                lag: dep.lag,
            });
        }

        Ok(Self {
            index,
            durations,
            codes,
            predecessors,
            successors,
        })
    }

    /// Number of activities in the graph.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the graph has no activities.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
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

    fn dep(pred: &str, succ: &str) -> Dependency {
        Dependency {
            predecessor_id: pred.to_string(),
            successor_id: succ.to_string(),
            dep_type: DependencyType::FinishToStart,
            lag: 0,
        }
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let result = ScheduleGraph::build(&[], &[]);
        assert_eq!(result.unwrap_err(), GraphError::EmptySchedule);
    }

    #[test]
    fn test_adjacency_lists() {
        let activities = vec![activity("a", 3), activity("b", 2)];
        let deps = vec![dep("a", "b")];
        let graph = ScheduleGraph::build(&activities, &deps).unwrap();

        let a = graph.index.get("a").unwrap();
        let b = graph.index.get("b").unwrap();
        assert_eq!(graph.successors[a as usize].len(), 1);
        assert_eq!(graph.successors[a as usize][0].other, b);
        assert_eq!(graph.predecessors[b as usize].len(), 1);
        assert_eq!(graph.predecessors[b as usize][0].other, a);
        assert!(graph.predecessors[a as usize].is_empty());
        assert!(graph.successors[b as usize].is_empty());
    }

    #[test]
    fn test_isolated_activity_has_entries() {
        let activities = vec![activity("a", 3), activity("solo", 1)];
        let deps = vec![];
        let graph = ScheduleGraph::build(&activities, &deps).unwrap();

        let solo = graph.index.get("solo").unwrap();
        assert!(graph.predecessors[solo as usize].is_empty());
        assert!(graph.successors[solo as usize].is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_dangling_dependency_rejected() {
        let activities = vec![activity("a", 3)];
        let deps = vec![dep("a", "ghost")];
        let result = ScheduleGraph::build(&activities, &deps);
        assert_eq!(
            result.unwrap_err(),
            GraphError::DanglingDependency("ghost".to_string())
        );
    }

    #[test]
    fn test_self_dependency_rejected() {
        let activities = vec![activity("a", 3)];
        let deps = vec![dep("a", "a")];
        let result = ScheduleGraph::build(&activities, &deps);
        assert_eq!(
            result.unwrap_err(),
            GraphError::SelfDependency("a".to_string())
        );
    }

    #[test]
    fn test_index_roundtrip() {
        let activities = vec![activity("a", 1), activity("b", 1), activity("c", 1)];
        let graph = ScheduleGraph::build(&activities, &[]).unwrap();

        for id in ["a", "b", "c"] {
            let int_id = graph.index.get(id).unwrap();
            assert_eq!(graph.index.resolve(int_id), Some(id));
        }
        assert_eq!(graph.index.get("missing"), None);
    }
}
