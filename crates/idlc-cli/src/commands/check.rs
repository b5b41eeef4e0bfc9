//! `idlc check`: Fail on package cycles.

use super::read_definition;
use anyhow::Context;
use idlc_cycles::check_cycles;
use std::path::Path;

pub fn execute(input: &Path) -> anyhow::Result<()> {
    let def = read_definition(input)?;
    check_cycles(&def).with_context(|| format!("{} has cyclic packages", input.display()))?;
    println!("{}: no package cycles", input.display());
    Ok(())
}
