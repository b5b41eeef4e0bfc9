//! CLI command implementations

pub mod check;
pub mod resolve;

use anyhow::Context;
use idlc_cycles::Definition;
use std::path::Path;

/// Read and parse a JSON definition
pub fn read_definition(path: &Path) -> anyhow::Result<Definition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Definition::from_json(&content)
        .with_context(|| format!("Failed to parse definition {}", path.display()))
}
