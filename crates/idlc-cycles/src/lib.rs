//! Package cycle resolution for the idlc IDL compiler
//!
//! Target languages that forbid cyclic package imports cannot mirror IDL
//! packages one to one: IDL authors reference types across packages freely.
//! This crate rewrites a parsed definition so that its package graph is
//! acyclic while keeping as many declarations as possible in their original
//! package:
//! - Type dependency graph construction
//! - Strongly connected components (stable Kosaraju)
//! - Merge-by-color partitioning that never reintroduces a cycle
//! - Package naming and collision-free type renaming
//! - Projection of the new names onto every type reference
//!
//! Every stage is deterministic: identical input produces identical output.

pub mod bitset;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod naming;
pub mod partition;
pub mod pipeline;
pub mod projector;
pub mod scc;

pub use bitset::Bitset;
pub use builder::{build_type_graph, package_graph, TypeGraph};
pub use config::{CompilerConfig, ConfigError, CycleMode};
pub use error::CycleError;
pub use graph::Graph;
pub use model::{Definition, Type, TypeDefinition, TypeName};
pub use naming::{assign_names, synthesize_package_name, PackageGroup, Renames};
pub use partition::{partition, Partition};
pub use pipeline::{check_cycles, compile, remove_cycles, Resolution};
pub use projector::project;
pub use scc::{ComponentId, StronglyConnectedComponents};
