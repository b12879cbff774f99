use anyhow::Result;
use clap::Args;

use super::replay::Scenario;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {}

pub fn run(_args: &SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(Scenario);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
