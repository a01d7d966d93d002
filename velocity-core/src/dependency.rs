//! Task dependency graph checks.
//!
//! Edges point from predecessor to successor. The graph must stay acyclic and
//! every predecessor id must name a known task.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, VelocityError};
use crate::task::Task;

/// Reject unknown predecessor ids and dependency cycles (self-loops included).
pub fn validate_dependencies(tasks: &[Task]) -> Result<()> {
    let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();

    for t in tasks {
        for pred in &t.depends_on {
            if !known.contains(pred.as_str()) {
                return Err(VelocityError::UnknownDependency {
                    task: t.id.clone(),
                    missing: pred.clone(),
                });
            }
        }
    }

    match find_cycle(tasks) {
        Some(cycle) => Err(VelocityError::DependencyCycle(cycle)),
        None => Ok(()),
    }
}

/// Returns the first cycle found as a closed path, e.g. `[a, b, a]`.
pub fn find_cycle(tasks: &[Task]) -> Option<Vec<String>> {
    // successor -> predecessors; walking predecessors finds the same cycles
    let adjacency: HashMap<&str, Vec<&str>> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.depends_on.iter().map(String::as_str).collect()))
        .collect();

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();

    fn dfs<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| *n == node) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if visited.contains(node) {
            return None;
        }

        stack.push(node);
        for next in adjacency.get(node).into_iter().flatten() {
            if let Some(cycle) = dfs(*next, adjacency, visited, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        visited.insert(node);
        None
    }

    for t in tasks {
        if let Some(cycle) = dfs(t.id.as_str(), &adjacency, &mut visited, &mut stack) {
            return Some(cycle);
        }
    }
    None
}
