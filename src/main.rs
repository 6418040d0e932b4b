use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gridlife::params::Parameters;
use gridlife::population::Simulation;
use gridlife::snapshot::Snapshot;
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gridlife",
    version,
    about = "Generational artificial-life simulator on a 2D grid"
)]
struct Cli {
    /// JSON object whose recognized keys override the default parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to run (overrides the config).
    #[arg(long)]
    generations: Option<usize>,

    /// Seed for the simulation's random stream (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Override a single parameter; the value is parsed as JSON, falling back
    /// to a plain string. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Directory that receives a JSON snapshot for every visualised generation.
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Print the Graphviz wiring of the first agent of the final population.
    #[arg(long)]
    dot: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let params = load_parameters(&cli)?;
    let generations = params.generations;
    let interval = params.visualise_interval;
    info!(?params, "starting simulation");

    if let Some(dir) = &cli.snapshots {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    let mut sim = Simulation::new(params).context("invalid simulation parameters")?;
    let mut snapshot_error = None;
    sim.run(generations, |world, report| {
        if report.generation % interval != 0 {
            return;
        }
        let snapshot = world.snapshot();
        info!(
            generation = report.generation,
            occupied = snapshot.occupied_cells(),
            total_signal = world.signals.total(),
            peak = snapshot.peak(),
            "snapshot"
        );
        if let Some(dir) = &cli.snapshots {
            if let Err(err) = write_snapshot(dir, &snapshot) {
                snapshot_error.get_or_insert(err);
            }
        }
    });
    if let Some(err) = snapshot_error {
        return Err(err);
    }

    if cli.dot {
        if let Some(agent) = sim.agents.first() {
            println!("{}", agent.genome.to_dot());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_parameters(cli: &Cli) -> Result<Parameters> {
    let mut params = Parameters::default();

    if let Some(path) = &cli.config {
        let document = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        params = Parameters::from_json_str(&document)
            .with_context(|| format!("loading config file {}", path.display()))?;
    }

    let mut overrides = Map::new();
    for raw in &cli.overrides {
        let (key, value) = parse_override(raw)?;
        overrides.insert(key, value);
    }
    if let Some(generations) = cli.generations {
        overrides.insert("generations".into(), generations.into());
    }
    if let Some(seed) = cli.seed {
        overrides.insert("seed".into(), seed.into());
    }
    params
        .apply_overrides(&overrides)
        .context("applying command line overrides")?;

    Ok(params)
}

fn parse_override(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("override {raw:?} is not of the form KEY=VALUE");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("override {raw:?} has an empty key");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn write_snapshot(dir: &Path, snapshot: &Snapshot) -> Result<()> {
    let path = dir.join(format!("generation_{:05}.json", snapshot.generation));
    let json = serde_json::to_string(snapshot)?;
    fs::write(&path, json).with_context(|| format!("writing snapshot {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse_json_then_fall_back_to_strings() {
        assert_eq!(
            parse_override("size_x=50").unwrap(),
            ("size_x".to_string(), Value::from(50))
        );
        assert_eq!(
            parse_override("boundary=wrap").unwrap(),
            ("boundary".to_string(), Value::from("wrap"))
        );
        assert!(parse_override("nonsense").is_err());
        assert!(parse_override("=3").is_err());
    }
}
