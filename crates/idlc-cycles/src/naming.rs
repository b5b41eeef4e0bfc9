//! Output package and type naming
//!
//! Chooses a unique package name for every merge group and renames types
//! whose bare names collide once several original packages share an output
//! package.

use crate::model::TypeName;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from original identifier to output identifier
pub type Renames = BTreeMap<TypeName, TypeName>;

/// A merge group ready for naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    /// Original packages of the members, sorted and deduplicated
    pub packages: Vec<String>,
    /// Declarations assigned to the group
    pub members: Vec<TypeName>,
}

/// Assign an output identifier to every member of every group
///
/// The first group of each single-package color keeps its original package
/// name; every other group gets a synthesized name, suffixed with a number
/// when already taken.
pub fn assign_names(groups: &[PackageGroup]) -> Renames {
    let mut used = BTreeSet::new();
    let mut package_names: Vec<Option<String>> = vec![None; groups.len()];

    for (slot, group) in package_names.iter_mut().zip(groups) {
        if let [package] = group.packages.as_slice() {
            if used.insert(package.clone()) {
                *slot = Some(package.clone());
            }
        }
    }
    for (slot, group) in package_names.iter_mut().zip(groups) {
        if slot.is_none() {
            let name = unique_name(&synthesize_package_name(&group.packages), &mut used);
            log::info!("members of {} placed in package {}", group.packages.join(", "), name);
            *slot = Some(name);
        }
    }

    let mut renames = Renames::new();
    for (package, group) in package_names.into_iter().flatten().zip(groups) {
        for (original, name) in assign_type_names(&group.members) {
            renames.insert(original.clone(), TypeName::new(package.clone(), name));
        }
    }
    renames
}

/// Synthesize a package name for a set of sorted original packages
///
/// Strips the longest shared leading path that leaves every package at least
/// one segment, then joins what remains with underscores:
/// `com.a` + `com.b` becomes `com.a_b`.
pub fn synthesize_package_name(packages: &[String]) -> String {
    if let [package] = packages {
        return package.clone();
    }
    let split: Vec<Vec<&str>> = packages.iter().map(|p| p.split('.').collect()).collect();
    let Some(first) = split.first() else {
        return String::new();
    };
    let shortest = split.iter().map(Vec::len).min().unwrap_or(0);

    let mut prefix = 0;
    while prefix + 1 < shortest && split.iter().all(|s| s[prefix] == first[prefix]) {
        prefix += 1;
    }

    let tail = split
        .iter()
        .map(|segments| segments[prefix..].join("_"))
        .collect::<Vec<_>>()
        .join("_");
    if prefix == 0 {
        tail
    } else {
        format!("{}.{}", first[..prefix].join("."), tail)
    }
}

/// Pick bare names for the members of one output package
///
/// Names shared by members of different original packages are prefixed
/// with the capitalized last segment of the original package.
fn assign_type_names(members: &[TypeName]) -> Vec<(&TypeName, String)> {
    let mut sorted: Vec<&TypeName> = members.iter().collect();
    sorted.sort_by(|a, b| (&a.name, &a.package).cmp(&(&b.name, &b.package)));

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in &sorted {
        *counts.entry(member.name.as_str()).or_default() += 1;
    }

    let mut taken = BTreeSet::new();
    let mut result = Vec::with_capacity(sorted.len());
    for member in sorted.iter().filter(|m| counts[m.name.as_str()] == 1) {
        taken.insert(member.name.clone());
        result.push((*member, member.name.clone()));
    }
    for member in sorted.iter().filter(|m| counts[m.name.as_str()] > 1) {
        let prefixed = format!("{}{}", capitalize(last_segment(&member.package)), member.name);
        let name = unique_name(&prefixed, &mut taken);
        log::info!("renamed {} to {} to avoid a name collision", member, name);
        result.push((*member, name));
    }
    result
}

fn last_segment(package: &str) -> &str {
    package.rsplit('.').next().unwrap_or(package)
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Claim `base`, or `base` followed by the smallest free positive number
fn unique_name(base: &str, used: &mut BTreeSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
