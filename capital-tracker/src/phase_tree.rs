//! Phase tree model: flattening, ID index and dependency analysis.
//!
//! A project's phases form a tree (sub-phases) with an overlaid dependency
//! graph (phase IDs that must precede a phase). Dependencies may point
//! anywhere in the same project's tree, at any depth.

use std::collections::HashMap;

use capital_tracker_sdk::{Phase, Project};

use crate::error::EngineError;

/// Pre-order traversal of a phase list: each phase before its sub-phases,
/// siblings in tree order.
pub fn preorder(phases: &[Phase]) -> Vec<&Phase> {
    fn walk<'a>(phases: &'a [Phase], out: &mut Vec<&'a Phase>) {
        for phase in phases {
            out.push(phase);
            walk(&phase.sub_phases, out);
        }
    }

    let mut out = Vec::new();
    walk(phases, &mut out);
    out
}

/// Top-level phases of a project, in order
pub fn top_level(project: &Project) -> Vec<&Phase> {
    project.phases.iter().collect()
}

/// Flatten a project into pre-order, failing if its dependencies contain a cycle
pub fn flatten(project: &Project) -> Result<Vec<&Phase>, EngineError> {
    let graph = PhaseGraph::build(project);
    if let Some(cycle) = graph.find_cycle() {
        return Err(EngineError::cyclic(&project.id, cycle));
    }
    Ok(graph.phases().to_vec())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// ID index and dependency graph over every phase of one project
pub struct PhaseGraph<'a> {
    project_id: &'a str,
    order: Vec<&'a Phase>,
    index: HashMap<&'a str, usize>,
    duplicates: Vec<&'a str>,
}

impl<'a> PhaseGraph<'a> {
    pub fn build(project: &'a Project) -> Self {
        let order = preorder(&project.phases);
        let mut index = HashMap::with_capacity(order.len());
        let mut duplicates = Vec::new();

        for (position, phase) in order.iter().enumerate() {
            // First occurrence wins; later ones are reported, not indexed
            if index.contains_key(phase.id.as_str()) {
                duplicates.push(phase.id.as_str());
            } else {
                index.insert(phase.id.as_str(), position);
            }
        }

        Self {
            project_id: &project.id,
            order,
            index,
            duplicates,
        }
    }

    /// All phases in pre-order
    pub fn phases(&self) -> &[&'a Phase] {
        &self.order
    }

    pub fn duplicate_ids(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// `(phase id, dependency id)` pairs whose dependency is not in the project
    pub fn unknown_dependencies(&self) -> Vec<(&'a str, &'a str)> {
        self.order
            .iter()
            .flat_map(|phase| {
                phase
                    .dependencies
                    .iter()
                    .filter(|dep| !self.index.contains_key(dep.as_str()))
                    .map(move |dep| (phase.id.as_str(), dep.as_str()))
            })
            .collect()
    }

    /// Warnings for duplicate IDs and dangling dependency references
    pub fn warnings(&self) -> Vec<EngineError> {
        let duplicates = self.duplicates.iter().map(|id| EngineError::DuplicatePhaseId {
            project_id: self.project_id.to_string(),
            phase_id: id.to_string(),
        });
        let unknown = self
            .unknown_dependencies()
            .into_iter()
            .map(|(phase, dep)| EngineError::UnknownDependency {
                project_id: self.project_id.to_string(),
                phase_id: phase.to_string(),
                dependency: dep.to_string(),
            });
        duplicates.chain(unknown).collect()
    }

    fn dependency_indices(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.order[node]
            .dependencies
            .iter()
            .filter_map(|dep| self.index.get(dep.as_str()).copied())
    }

    /// First dependency cycle found, as phase IDs in dependency order.
    ///
    /// Only indexed phases take part, so a duplicate ID never creates a
    /// phantom cycle.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.order.len()];
        let mut path = Vec::new();

        let mut roots: Vec<usize> = self.index.values().copied().collect();
        roots.sort_unstable();

        for root in roots {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            if let Some(cycle) = self.visit(root, &mut marks, &mut path) {
                return Some(
                    cycle
                        .into_iter()
                        .map(|i| self.order[i].id.clone())
                        .collect(),
                );
            }
        }
        None
    }

    fn visit(&self, node: usize, marks: &mut [Mark], path: &mut Vec<usize>) -> Option<Vec<usize>> {
        marks[node] = Mark::InProgress;
        path.push(node);

        for dep in self.dependency_indices(node) {
            match marks[dep] {
                Mark::InProgress => {
                    let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                    return Some(path[start..].to_vec());
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(dep, marks, path) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[node] = Mark::Done;
        None
    }

    /// Longest chain of dependency edges ending at each phase (0 with no dependencies).
    ///
    /// Meant for acyclic graphs; an edge back into a phase still being
    /// measured counts as 0 so a cyclic graph terminates.
    pub fn dependency_depths(&self) -> HashMap<&'a str, usize> {
        let mut memo: Vec<Option<usize>> = vec![None; self.order.len()];
        let mut marks = vec![Mark::Unvisited; self.order.len()];

        for &node in self.index.values() {
            self.depth_of(node, &mut memo, &mut marks);
        }

        self.index
            .iter()
            .map(|(&id, &node)| (id, memo[node].unwrap_or(0)))
            .collect()
    }

    fn depth_of(&self, node: usize, memo: &mut [Option<usize>], marks: &mut [Mark]) -> usize {
        if let Some(depth) = memo[node] {
            return depth;
        }
        if marks[node] == Mark::InProgress {
            return 0;
        }
        marks[node] = Mark::InProgress;

        let deps: Vec<usize> = self.dependency_indices(node).collect();
        let depth = deps
            .into_iter()
            .map(|dep| self.depth_of(dep, memo, marks) + 1)
            .max()
            .unwrap_or(0);

        marks[node] = Mark::Done;
        memo[node] = Some(depth);
        depth
    }
}
