//! hatch CLI entry point.
//!
//! Prints the launch plan the sandbox would use for a program, without
//! spawning it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use hatch::telemetry::init_logging;
use hatch::{ConfigLayer, HatchConfig, HatchError, HatchOptions, LaunchPlan, LayeredConfig, Sandbox};

/// Plugin-driven bootstrapper
#[derive(Debug, Parser)]
#[command(name = "hatch", version, about, long_about = None)]
struct Cli {
    /// Settings environment (`config/<env>`)
    #[arg(short, long, default_value = "development")]
    env: String,

    /// Project working directory
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    /// Phase to prepare for
    #[arg(long, default_value = "default")]
    phase: String,

    /// Development mode
    #[arg(long)]
    dev: bool,

    /// JSON configuration layers, base first
    #[arg(short, long = "layer")]
    layers: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Program to launch
    program: String,

    /// Arguments for the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `KEY=VALUE` lines followed by the command line
    Text,
    /// JSON object
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match HatchConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    match plan(&cli, config).await {
        Ok(plan) => print_plan(&plan, cli.format),
        Err(e) => {
            tracing::error!(code = %e.kind, "Launch preparation failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn plan(cli: &Cli, config: HatchConfig) -> Result<LaunchPlan, HatchError> {
    let layers = load_layers(&cli.layers)?;
    let options = HatchOptions::new(&cli.cwd)
        .with_dev(cli.dev)
        .with_phase(&cli.phase);

    Sandbox::new(options, layers, config.sandbox)?
        .prepare(&cli.program, cli.args.clone())
        .await
}

/// Reads each layer file; with none given, a single empty layer is used.
fn load_layers(paths: &[PathBuf]) -> Result<LayeredConfig, HatchError> {
    if paths.is_empty() {
        return Ok(LayeredConfig::new(vec![ConfigLayer::empty("cli")]));
    }

    let mut layers = Vec::with_capacity(paths.len());
    for path in paths {
        let origin = path.display().to_string();
        let raw = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&raw)?;
        layers.push(ConfigLayer::from_json(origin, json)?);
    }

    tracing::debug!(layers = layers.len(), "Configuration layers loaded");
    Ok(LayeredConfig::new(layers))
}

fn print_plan(plan: &LaunchPlan, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for (key, value) in plan.env.iter() {
                println!("{}={}", key, value);
            }
            println!("cd {}", plan.cwd.display());
            println!("{} {}", plan.program, plan.args.join(" "));
        }
        OutputFormat::Json => {
            let env: serde_json::Map<String, serde_json::Value> = plan
                .env
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                .collect();
            let json = serde_json::json!({
                "program": plan.program,
                "args": plan.args,
                "cwd": plan.cwd.display().to_string(),
                "env": env,
                "stdio": format!("{:?}", plan.stdio).to_lowercase(),
            });
            let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
            println!("{}", rendered);
        }
    }
}
