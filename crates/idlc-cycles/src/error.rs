//! Errors raised while resolving package cycles

use crate::model::TypeName;
use thiserror::Error;

/// Errors that can occur while building the type graph or resolving cycles
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Two declarations share the same identifier
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(TypeName),

    /// A declaration references a type that is never declared
    #[error("{from} references undeclared type {to}")]
    UndeclaredType { from: TypeName, to: TypeName },

    /// The package dependency graph contains a cycle
    #[error("Circular package dependency detected: {}", format_cycle(.0))]
    CyclicPackages(Vec<String>),

    /// An internal invariant of the resolution algorithm failed
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub(crate) fn format_cycle(cycle: &[String]) -> String {
    cycle.join(" -> ")
}
