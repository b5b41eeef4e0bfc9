//! Strongly connected components
//!
//! Kosaraju's two-pass algorithm with every traversal ordered by node
//! insertion position, so component numbering is reproducible across runs.
//! Components are numbered in discovery order, which lists dependencies
//! before their dependents.

use crate::graph::Graph;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;

/// Dense identifier of a strongly connected component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The SCC decomposition of a graph
#[derive(Debug, Clone)]
pub struct StronglyConnectedComponents<T> {
    /// Members of each component, indexed by `ComponentId`, in node order
    pub components: Vec<Vec<T>>,
    /// Component of every node
    pub component_by_item: FxHashMap<T, ComponentId>,
    /// Condensation of the input graph; always acyclic
    pub component_graph: Graph<ComponentId>,
}

impl<T: Clone + Eq + Hash> StronglyConnectedComponents<T> {
    /// Decompose `graph` into strongly connected components
    pub fn compute(graph: &Graph<T>) -> Self {
        let index = graph.node_index();
        let reversed = graph.reversed();

        // First pass: post-order over the reversed graph.
        let mut visited = vec![false; graph.len()];
        let mut finish_order = Vec::with_capacity(graph.len());
        for start in graph.nodes() {
            if visited[index[start]] {
                continue;
            }
            visited[index[start]] = true;
            let mut stack = vec![(start.clone(), reversed.ordered_edges(start, &index), 0)];
            while let Some((node, edges, next)) = stack.last_mut() {
                if let Some(target) = edges.get(*next).cloned() {
                    *next += 1;
                    if !visited[index[&target]] {
                        visited[index[&target]] = true;
                        let target_edges = reversed.ordered_edges(&target, &index);
                        stack.push((target, target_edges, 0));
                    }
                } else {
                    finish_order.push(node.clone());
                    stack.pop();
                }
            }
        }

        // Second pass: label components over the original graph, latest finish first.
        let mut labels: Vec<Option<ComponentId>> = vec![None; graph.len()];
        let mut count = 0;
        for root in finish_order.iter().rev() {
            if labels[index[root]].is_some() {
                continue;
            }
            let component = ComponentId(count);
            count += 1;
            labels[index[root]] = Some(component);
            let mut stack = vec![root.clone()];
            while let Some(node) = stack.pop() {
                for target in graph.ordered_edges(&node, &index) {
                    if labels[index[&target]].is_none() {
                        labels[index[&target]] = Some(component);
                        stack.push(target);
                    }
                }
            }
        }

        // Group members by label; node order keeps each member list stable.
        let mut components: Vec<Vec<T>> = vec![Vec::new(); count];
        let mut component_by_item = FxHashMap::default();
        for (node, label) in graph.nodes().iter().zip(&labels) {
            let component = label.unwrap_or_else(|| {
                unreachable!("every node is labelled by the second pass")
            });
            components[component.index()].push(node.clone());
            component_by_item.insert(node.clone(), component);
        }

        let mut component_graph = Graph::new();
        for i in 0..count {
            component_graph.add_node(ComponentId(i));
        }
        for from in graph.nodes() {
            let source = component_by_item[from];
            for to in graph.ordered_edges(from, &index) {
                let target = component_by_item[&to];
                if source != target {
                    component_graph.add_edge(source, target);
                }
            }
        }

        log::debug!(
            "found {} components over {} nodes ({} cyclic)",
            count,
            graph.len(),
            components.iter().filter(|c| c.len() > 1).count()
        );

        Self {
            components,
            component_by_item,
            component_graph,
        }
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Members of a component
    pub fn members(&self, component: ComponentId) -> &[T] {
        &self.components[component.index()]
    }

    /// Component containing `item`
    pub fn component_of(&self, item: &T) -> Option<ComponentId> {
        self.component_by_item.get(item).copied()
    }
}
