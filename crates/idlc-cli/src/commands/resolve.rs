//! `idlc resolve`: Rewrite a definition into acyclic packages.

use super::read_definition;
use anyhow::Context;
use idlc_cycles::{compile, CompilerConfig, Resolution};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up next to the input
const CONFIG_FILE: &str = "idlc.toml";

pub fn execute(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    report: bool,
) -> anyhow::Result<()> {
    let config = load_config(input, config)?;
    let def = read_definition(input)?;

    let resolution = compile(&def, &config)
        .with_context(|| format!("Failed to resolve {}", input.display()))?;
    log::info!(
        "{}: {} declarations in {} packages, {} renamed",
        input.display(),
        resolution.definition.declared_names().count(),
        resolution.package_count(),
        resolution.renames.len()
    );

    let json = resolution
        .definition
        .to_json(config.output.pretty)
        .context("Failed to serialize definition")?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    if report {
        eprint!("{}", format_report(&resolution));
    }
    Ok(())
}

/// Explicit config must exist; the implicit one is optional
fn load_config(input: &Path, explicit: Option<&Path>) -> anyhow::Result<CompilerConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let implicit = default_config_path(input);
            if !implicit.exists() {
                return Ok(CompilerConfig::default());
            }
            implicit
        }
    };
    log::debug!("loading config from {}", path.display());
    CompilerConfig::from_file(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}

fn default_config_path(input: &Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

fn format_report(resolution: &Resolution) -> String {
    if resolution.renames.is_empty() {
        return "No declarations renamed\n".to_string();
    }
    let mut report = format!("Renamed {} declarations:\n", resolution.renames.len());
    for (original, renamed) in &resolution.renames {
        report.push_str(&format!("  {} -> {}\n", original, renamed));
    }
    report
}
