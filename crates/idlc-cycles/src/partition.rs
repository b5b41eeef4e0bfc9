//! Merge-by-color partitioning of a DAG
//!
//! Greedily merges same-colored nodes of an acyclic graph into groups such
//! that the graph obtained by contracting every group is still acyclic.
//!
//! Every node owns a dense bit index. Per group leader the partitioner keeps
//! three bitsets:
//! - `dependencies`: every node reachable from the group, members included
//! - `group`: the members
//! - `disallowed`: nodes reachable from the group only through some other
//!   group; merging with any of them would close a cycle
//!
//! Nodes are visited in reverse topological order, and a node's state is
//! computed when it is visited. After a merge the state of the new group and
//! of every visited ancestor is recomputed before the next decision, found by
//! walking the reverse graph in which merged nodes are linked in both
//! directions. Ancestors not yet visited pick up the change when they are.

use crate::bitset::Bitset;
use crate::graph::Graph;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Result of partitioning: the groups of each color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    /// Groups per color; the first member of a group is its leader
    pub groups_by_color: BTreeMap<String, Vec<Vec<T>>>,
    /// Accepted merges in decision order, as (group leader, absorbed node)
    pub merges: Vec<(T, T)>,
}

impl<T: Clone + Eq + Hash> Partition<T> {
    /// Total number of groups
    pub fn group_count(&self) -> usize {
        self.groups_by_color.values().map(Vec::len).sum()
    }

    /// All groups, ordered by color then creation
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.groups_by_color.iter().flat_map(|(color, groups)| {
            groups
                .iter()
                .map(move |group| (color.as_str(), group.as_slice()))
        })
    }

    /// Contract every group of `graph` into a single node
    ///
    /// Quotient nodes are numbered in [`Partition::groups`] order. Edges
    /// between members of one group are dropped.
    pub fn quotient_graph(&self, graph: &Graph<T>) -> Graph<usize> {
        let mut group_of = FxHashMap::default();
        let mut quotient = Graph::new();
        for (i, (_, members)) in self.groups().enumerate() {
            quotient.add_node(i);
            for member in members {
                group_of.insert(member.clone(), i);
            }
        }

        let index = graph.node_index();
        for from in graph.nodes() {
            let Some(&source) = group_of.get(from) else {
                continue;
            };
            for to in graph.ordered_edges(from, &index) {
                if let Some(&target) = group_of.get(&to) {
                    if source != target {
                        quotient.add_edge(source, target);
                    }
                }
            }
        }
        quotient
    }
}

/// Partition an acyclic `graph` into same-colored groups without creating cycles
///
/// The result is greedy: safe and deterministic, not minimal.
pub fn partition<T, F>(graph: &Graph<T>, color: F) -> Partition<T>
where
    T: Clone + Eq + Hash,
    F: Fn(&T) -> String,
{
    let mut partitioner = Partitioner::new(graph, color);
    let finish_order = partitioner.finish_order();

    let mut leaders_by_color: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut merges = Vec::new();
    for node in finish_order {
        partitioner.visit(node);
        let candidates = leaders_by_color
            .entry(partitioner.colors[node].clone())
            .or_default();
        let target = candidates
            .iter()
            .copied()
            .find(|&leader| partitioner.can_merge(leader, node));
        match target {
            Some(leader) => {
                partitioner.merge(leader, node);
                merges.push((
                    partitioner.nodes[leader].clone(),
                    partitioner.nodes[node].clone(),
                ));
            }
            None => candidates.push(node),
        }
    }

    let groups_by_color = leaders_by_color
        .into_iter()
        .map(|(color, leaders)| {
            let groups = leaders
                .into_iter()
                .map(|leader| {
                    partitioner.members[leader]
                        .iter()
                        .map(|&i| partitioner.nodes[i].clone())
                        .collect()
                })
                .collect();
            (color, groups)
        })
        .collect();

    let result = Partition {
        groups_by_color,
        merges,
    };
    log::debug!(
        "partitioned {} nodes into {} groups",
        graph.len(),
        result.group_count()
    );
    result
}

/// Per-call algorithm state, indexed by bit index
struct Partitioner<T> {
    nodes: Vec<T>,
    colors: Vec<String>,
    /// Direct successors, in node order
    successors: Vec<Vec<usize>>,
    /// Reverse graph plus a bidirectional link per merge
    reverse: Graph<usize>,
    leader: Vec<usize>,
    /// Ordered members, meaningful at leaders only
    members: Vec<Vec<usize>>,
    group: Vec<Bitset>,
    dependencies: Vec<Bitset>,
    disallowed: Vec<Bitset>,
    /// Nodes reached by the merge loop; only their state is kept current
    visited: Bitset,
}

impl<T: Clone + Eq + Hash> Partitioner<T> {
    fn new<F: Fn(&T) -> String>(graph: &Graph<T>, color: F) -> Self {
        let n = graph.len();
        let index = graph.node_index();
        let nodes = graph.nodes().to_vec();
        let colors = nodes.iter().map(&color).collect();
        let successors: Vec<Vec<usize>> = nodes
            .iter()
            .map(|node| {
                graph
                    .ordered_edges(node, &index)
                    .iter()
                    .map(|target| index[target])
                    .collect()
            })
            .collect();

        let mut reverse = Graph::new();
        for i in 0..n {
            reverse.add_node(i);
        }
        for (from, targets) in successors.iter().enumerate() {
            for &to in targets {
                reverse.add_edge(to, from);
            }
        }

        Self {
            nodes,
            colors,
            successors,
            reverse,
            leader: (0..n).collect(),
            members: (0..n).map(|i| vec![i]).collect(),
            group: (0..n).map(|i| Bitset::singleton(n, i)).collect(),
            dependencies: (0..n).map(|i| Bitset::singleton(n, i)).collect(),
            disallowed: vec![Bitset::new(n); n],
            visited: Bitset::new(n),
        }
    }

    /// Nodes in reverse topological order (dependencies first)
    fn finish_order(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let mut visited = vec![false; n];
        let mut finish_order = Vec::with_capacity(n);

        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut stack = vec![(start, 0)];
            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                if let Some(&target) = self.successors[node].get(*next) {
                    *next += 1;
                    if !visited[target] {
                        visited[target] = true;
                        stack.push((target, 0));
                    }
                } else {
                    stack.pop();
                    finish_order.push(node);
                }
            }
        }

        finish_order
    }

    /// Compute the state of `node`, whose successors are all visited
    fn visit(&mut self, node: usize) {
        self.visited.insert(node);
        self.process_dependency(node);
    }

    /// Leaders of the groups directly depended on by group `leader`
    fn successor_groups(&self, leader: usize) -> Vec<usize> {
        let mut groups: Vec<usize> = self.members[leader]
            .iter()
            .flat_map(|&member| &self.successors[member])
            .map(|&target| self.leader[target])
            .filter(|&target| target != leader)
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// Recompute `dependencies` and `disallowed` of group `leader` from the
    /// current state of its successor groups
    fn process_dependency(&mut self, leader: usize) {
        let mut dependencies = self.group[leader].clone();
        let mut disallowed = Bitset::new(self.nodes.len());

        for successor in self.successor_groups(leader) {
            dependencies.union_with(&self.dependencies[successor]);
            if self.colors[successor] == self.colors[leader] {
                // The successor group itself may still be absorbed; anything
                // beyond it may not.
                disallowed.union_with(
                    &self.dependencies[successor].difference(&self.group[successor]),
                );
            } else {
                disallowed.union_with(&self.dependencies[successor]);
            }
        }

        self.dependencies[leader] = dependencies;
        self.disallowed[leader] = disallowed;
    }

    fn can_merge(&self, a: usize, b: usize) -> bool {
        let (a, b) = (self.leader[a], self.leader[b]);
        a != b
            && self.colors[a] == self.colors[b]
            && !self.group[a].intersects(&self.disallowed[b])
            && !self.group[b].intersects(&self.disallowed[a])
    }

    /// Merge group `b` into group `a` and refresh every affected group
    fn merge(&mut self, a: usize, b: usize) {
        let (a, b) = (self.leader[a], self.leader[b]);
        let moved = std::mem::take(&mut self.members[b]);
        for &member in &moved {
            self.leader[member] = a;
        }
        self.members[a].extend(moved);
        let absorbed = std::mem::replace(&mut self.group[b], Bitset::new(self.nodes.len()));
        self.group[a].union_with(&absorbed);

        self.reverse.add_edge(a, b);
        self.reverse.add_edge(b, a);

        let affected = self.ancestors(a);
        self.refresh(&affected);
    }

    /// Visited nodes that reach node `start` in the reverse graph, `start`
    /// included
    fn ancestors(&self, start: usize) -> Bitset {
        let mut seen = Bitset::singleton(self.nodes.len(), start);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for next in self.reverse.sorted_edges(&node, |x, y| x.cmp(y)) {
                if self.visited.has(next) && !seen.has(next) {
                    seen.insert(next);
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Recompute the affected groups, dependencies before dependents
    fn refresh(&mut self, affected: &Bitset) {
        let n = self.nodes.len();
        let mut leaders = Bitset::new(n);
        for node in affected.iter() {
            leaders.insert(self.leader[node]);
        }

        let mut visited = Bitset::new(n);
        for start in leaders.iter() {
            if visited.has(start) {
                continue;
            }
            visited.insert(start);
            let mut stack = vec![(start, self.successor_groups(start), 0)];
            while let Some((leader, successors, next)) = stack.last_mut() {
                let leader = *leader;
                if let Some(&successor) = successors.get(*next) {
                    *next += 1;
                    if leaders.has(successor) && !visited.has(successor) {
                        visited.insert(successor);
                        let successor_groups = self.successor_groups(successor);
                        stack.push((successor, successor_groups, 0));
                    }
                } else {
                    stack.pop();
                    self.process_dependency(leader);
                }
            }
        }
    }
}
