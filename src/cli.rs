use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

/// Formwright - drive a configuration-defined form from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "formwright", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "FORMWRIGHT_CONFIG", default_value = "formwright.toml")]
    pub config: PathBuf,

    /// Field assignment applied as one user edit, e.g. `--set qty=3`.
    /// The value is parsed as JSON and falls back to a plain string.
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, Value)>,

    /// Submit the form after all assignments are applied
    #[arg(long)]
    pub submit: bool,

    /// Settle every tick to a fixed point instead of a single pass
    #[arg(long, env = "FORMWRIGHT_FIXED_POINT")]
    pub fixed_point: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
