//! Generic directed graph
//!
//! Nodes are keyed by identifier and kept in insertion order so every
//! traversal is reproducible. Provides:
//! - Idempotent node and edge insertion
//! - Neighbor iteration under a caller-supplied total order
//! - Cycle detection

use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::hash::Hash;

/// A directed graph over comparable identifiers
///
/// Adjacency is a set, so duplicate edges collapse. Every edge target is
/// also a node of the graph.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    /// Outgoing edges per node
    nodes: FxHashMap<T, FxHashSet<T>>,
    /// Node insertion order
    order: Vec<T>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            nodes: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Graph<T> {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph. Returns `false` if it was already present.
    pub fn add_node(&mut self, id: T) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id.clone(), FxHashSet::default());
        self.order.push(id);
        true
    }

    /// Add an edge `from -> to`, adding either endpoint if missing
    pub fn add_edge(&mut self, from: T, to: T) {
        self.add_node(from.clone());
        self.add_node(to.clone());
        if let Some(edges) = self.nodes.get_mut(&from) {
            edges.insert(to);
        }
    }

    /// Add an edge from `from` to each of `targets`
    pub fn add_edges_by_id(&mut self, from: T, targets: impl IntoIterator<Item = T>) {
        self.add_node(from.clone());
        for to in targets {
            self.add_edge(from.clone(), to);
        }
    }

    /// Check whether `id` is a node of the graph
    pub fn contains(&self, id: &T) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check whether the edge `from -> to` exists
    pub fn has_edge(&self, from: &T, to: &T) -> bool {
        self.nodes
            .get(from)
            .map_or(false, |edges| edges.contains(to))
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[T] {
        &self.order
    }

    /// Get the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(FxHashSet::len).sum()
    }

    /// Outgoing edges of `id`, in no particular order
    pub fn edges(&self, id: &T) -> impl Iterator<Item = &T> {
        self.nodes.get(id).into_iter().flatten()
    }

    /// Outgoing edges of `id`, ordered by `compare`
    ///
    /// All algorithms traverse through this method instead of raw adjacency so
    /// their results do not depend on hash iteration order.
    pub fn sorted_edges<F>(&self, id: &T, mut compare: F) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut edges: Vec<T> = self.edges(id).cloned().collect();
        edges.sort_by(|a, b| compare(a, b));
        edges
    }

    /// Position of every node in insertion order
    pub fn node_index(&self) -> FxHashMap<T, usize> {
        self.order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect()
    }

    /// Outgoing edges of `id`, ordered by insertion position of the targets
    pub fn ordered_edges(&self, id: &T, index: &FxHashMap<T, usize>) -> Vec<T> {
        self.sorted_edges(id, |a, b| index[a].cmp(&index[b]))
    }

    /// The graph with every edge reversed, nodes in the same order
    pub fn reversed(&self) -> Graph<T> {
        let index = self.node_index();
        let mut reversed = Graph::new();
        for id in &self.order {
            reversed.add_node(id.clone());
        }
        for from in &self.order {
            for to in self.ordered_edges(from, &index) {
                reversed.add_edge(to, from.clone());
            }
        }
        reversed
    }

    /// Find a cycle in the graph
    ///
    /// Returns the cycle path with its first node repeated at the end, or
    /// `None` if the graph is acyclic. A self-loop counts as a cycle.
    pub fn find_cycle(&self) -> Option<Vec<T>> {
        let index = self.node_index();
        let mut visited = vec![false; self.order.len()];
        let mut on_stack = vec![false; self.order.len()];

        for start in &self.order {
            if visited[index[start]] {
                continue;
            }
            visited[index[start]] = true;
            on_stack[index[start]] = true;
            let mut stack = vec![(start.clone(), self.ordered_edges(start, &index), 0)];
            while let Some((node, edges, next)) = stack.last_mut() {
                if let Some(target) = edges.get(*next).cloned() {
                    *next += 1;
                    let i = index[&target];
                    if on_stack[i] {
                        // The open DFS path from `target` back to itself.
                        let from = stack.iter().position(|(n, _, _)| *n == target).unwrap_or(0);
                        let mut cycle: Vec<T> =
                            stack[from..].iter().map(|(n, _, _)| n.clone()).collect();
                        cycle.push(target);
                        return Some(cycle);
                    }
                    if !visited[i] {
                        visited[i] = true;
                        on_stack[i] = true;
                        let target_edges = self.ordered_edges(&target, &index);
                        stack.push((target, target_edges, 0));
                    }
                } else {
                    on_stack[index[&*node]] = false;
                    stack.pop();
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.add_node("a"));
        assert!(!graph.add_node("a"));

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.nodes(), &["a"]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(1, 2);
        graph.add_edges_by_id(1, [2, 3]);

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(&1, &2));
        assert!(graph.has_edge(&1, &3));
        assert!(!graph.has_edge(&2, &1));
        assert_eq!(graph.nodes(), &[1, 2, 3]);
    }

    #[test]
    fn test_sorted_edges() {
        let mut graph = Graph::new();
        graph.add_edges_by_id(0, [5, 3, 9, 1]);

        assert_eq!(graph.sorted_edges(&0, |a, b| a.cmp(b)), vec![1, 3, 5, 9]);
        assert_eq!(graph.sorted_edges(&0, |a, b| b.cmp(a)), vec![9, 5, 3, 1]);
    }

    #[test]
    fn test_ordered_edges_follow_insertion() {
        let mut graph = Graph::new();
        graph.add_node("z");
        graph.add_node("a");
        graph.add_edges_by_id("m", ["a", "z"]);

        let index = graph.node_index();
        assert_eq!(graph.ordered_edges(&"m", &index), vec!["z", "a"]);
    }

    #[test]
    fn test_reversed() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");

        let reversed = graph.reversed();
        assert_eq!(reversed.nodes(), graph.nodes());
        assert!(reversed.has_edge(&"b", &"a"));
        assert!(reversed.has_edge(&"c", &"b"));
        assert_eq!(reversed.edge_count(), 2);
    }

    #[test]
    fn test_no_cycle() {
        let mut graph = Graph::new();
        // a -> b -> c, a -> c
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("a", "c");

        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_simple_cycle() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        assert_eq!(graph.find_cycle(), Some(vec!["a", "b", "a"]));
    }

    #[test]
    fn test_longer_cycle() {
        let mut graph = Graph::new();
        graph.add_edge("x", "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "a");

        assert_eq!(graph.find_cycle(), Some(vec!["a", "b", "c", "a"]));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut graph = Graph::new();
        graph.add_edge(7, 7);

        assert_eq!(graph.find_cycle(), Some(vec![7, 7]));
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut graph = Graph::new();
        for i in 0..200_000u32 {
            graph.add_edge(i, i + 1);
        }
        assert!(graph.find_cycle().is_none());

        graph.add_edge(200_000, 199_998);
        assert_eq!(
            graph.find_cycle(),
            Some(vec![199_998, 199_999, 200_000, 199_998])
        );
    }
}
