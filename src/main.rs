use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use mapsketch::replay::{Replay, Script};
use mapsketch::{init_logging, Config, BUILD_DATE, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "mapsketch",
    version,
    about = "Replay a MapSketch interaction script and print the resulting GeoJSON"
)]
struct Cli {
    /// Script file: a JSON step list, or an object with `config` and `steps`
    script: PathBuf,

    /// Configuration file (.json or .toml); overrides any config in the script
    #[arg(long, env = "MAPSKETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Also print the outcome of every step
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn resolve_config(cli: &Cli, script: &Script) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    if let Some(config) = &script.config {
        config.validate().context("invalid config in script")?;
        return Ok(config.clone());
    }
    match Config::default_config_path() {
        Ok(path) => {
            debug!("Looking for config at {}", path.display());
            Config::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        Err(_) => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    info!("MapSketch {} (built {})", VERSION, BUILD_DATE);

    let script = Script::load(&cli.script)?;
    let config = resolve_config(&cli, &script)?;

    let mut replay = Replay::new(config);
    let failed = replay
        .run(&script.steps)
        .iter()
        .filter(|r| !r.is_ok())
        .count();
    info!(
        "Replayed {} steps ({} failed), {} shapes stored",
        script.steps.len(),
        failed,
        replay.session().store().len()
    );

    let output = if cli.report {
        replay.summary()
    } else {
        replay.features()
    };
    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);

    Ok(())
}
