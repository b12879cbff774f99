use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use crate::normalize::clean_payload;

#[derive(Debug, Clone, Args)]
pub struct CleanArgs {
    /// JSON object to clean; stdin when omitted.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

pub fn run(args: &CleanArgs) -> Result<()> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read payload from stdin")?;
            buffer
        }
    };

    let cleaned = clean_json(&raw)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&cleaned)?
    } else {
        serde_json::to_string(&cleaned)?
    };
    println!("{rendered}");
    Ok(())
}

/// Parses `raw` as a JSON object and returns its cleaned form.
pub fn clean_json(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("payload is not valid json")?;
    let Value::Object(payload) = value else {
        bail!("payload must be a json object");
    };
    Ok(Value::Object(clean_payload(payload)))
}
