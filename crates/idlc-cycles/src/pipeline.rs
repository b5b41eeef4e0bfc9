//! End-to-end cycle resolution
//!
//! Type graph -> strongly connected components -> merge-by-color partition
//! -> naming -> projection, followed by acyclicity checks on every
//! intermediate result.

use crate::builder::{build_type_graph, package_graph};
use crate::config::{CompilerConfig, CycleMode};
use crate::error::CycleError;
use crate::model::{Definition, TypeName};
use crate::naming::{assign_names, PackageGroup, Renames};
use crate::partition::{partition, Partition};
use crate::projector::project;
use crate::scc::{ComponentId, StronglyConnectedComponents};
use std::collections::BTreeSet;

/// Separator between package names in a component color
const COLOR_SEPARATOR: &str = ";";

/// Outcome of cycle resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The rewritten definition
    pub definition: Definition,
    /// Every identifier whose package or name changed
    pub renames: Renames,
}

impl Resolution {
    /// Resolution that leaves `def` untouched
    fn unchanged(def: &Definition) -> Self {
        Self {
            definition: def.clone(),
            renames: Renames::new(),
        }
    }

    /// Number of distinct output packages
    pub fn package_count(&self) -> usize {
        self.definition
            .declared_names()
            .map(|name| name.package.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Run cycle handling as selected by `config`
pub fn compile(def: &Definition, config: &CompilerConfig) -> Result<Resolution, CycleError> {
    match config.cycles.mode {
        CycleMode::Resolve => remove_cycles(def),
        CycleMode::Reject => {
            check_cycles(def)?;
            Ok(Resolution::unchanged(def))
        }
    }
}

/// Fail with the first package cycle of `def`, if any
pub fn check_cycles(def: &Definition) -> Result<(), CycleError> {
    match package_graph(def)?.find_cycle() {
        Some(cycle) => Err(CycleError::CyclicPackages(cycle)),
        None => Ok(()),
    }
}

/// Reassign declarations to packages so the package graph is acyclic
///
/// Mutually dependent declarations always share a package; otherwise
/// declarations stay in their original package wherever that does not
/// close a cycle. Deterministic: equal inputs give equal outputs.
pub fn remove_cycles(def: &Definition) -> Result<Resolution, CycleError> {
    let types = build_type_graph(def)?;
    let scc = StronglyConnectedComponents::compute(&types.graph);
    if let Some(cycle) = scc.component_graph.find_cycle() {
        return Err(CycleError::Invariant(format!(
            "component graph contains cycle {}",
            join(&cycle)
        )));
    }

    let colors: Vec<String> = scc.components.iter().map(|c| component_color(c)).collect();
    let groups = partition(&scc.component_graph, |c: &ComponentId| colors[c.index()].clone());
    check_partition(&scc, &groups)?;

    let package_groups: Vec<PackageGroup> = groups
        .groups()
        .map(|(color, members)| PackageGroup {
            packages: color.split(COLOR_SEPARATOR).map(str::to_string).collect(),
            members: members
                .iter()
                .flat_map(|&c| scc.members(c).iter().cloned())
                .collect(),
        })
        .collect();
    let mapping = assign_names(&package_groups);
    let definition = project(def, &mapping);

    if let Some(cycle) = package_graph(&definition)?.find_cycle() {
        return Err(CycleError::CyclicPackages(cycle));
    }

    let renames: Renames = mapping
        .into_iter()
        .filter(|(original, target)| original != target)
        .collect();
    log::info!(
        "resolved {} declarations into {} groups, {} renamed",
        types.graph.len(),
        groups.group_count(),
        renames.len()
    );

    Ok(Resolution {
        definition,
        renames,
    })
}

/// Sorted, deduplicated packages of the members, joined
fn component_color(members: &[TypeName]) -> String {
    members
        .iter()
        .map(|m| m.package.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(COLOR_SEPARATOR)
}

fn check_partition(
    scc: &StronglyConnectedComponents<TypeName>,
    groups: &Partition<ComponentId>,
) -> Result<(), CycleError> {
    let mut seen = BTreeSet::new();
    for (_, members) in groups.groups() {
        for &component in members {
            if !seen.insert(component) {
                return Err(CycleError::Invariant(format!(
                    "component {} assigned to more than one group",
                    component
                )));
            }
        }
    }
    if seen.len() != scc.len() {
        return Err(CycleError::Invariant(format!(
            "{} of {} components assigned to a group",
            seen.len(),
            scc.len()
        )));
    }
    if let Some(cycle) = groups.quotient_graph(&scc.component_graph).find_cycle() {
        return Err(CycleError::Invariant(format!(
            "merge groups form cycle {}",
            join(&cycle)
        )));
    }
    Ok(())
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
