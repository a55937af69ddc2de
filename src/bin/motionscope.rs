use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use motionscope::{Orchestrator, PropValue, Property, StageConfig, ViewportMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "motionscope", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a stage JSON.
    Validate(ValidateArgs),
    /// Drive a stage with a simulated clock and print the final property values.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input stage JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input stage JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,

    /// Ticks per simulated second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Initial viewport width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Scroll linearly from 0 to this position over the run.
    #[arg(long)]
    scroll_to: Option<f64>,

    /// Resize to this width halfway through the run.
    #[arg(long)]
    resize_to: Option<f64>,

    /// Fire the named burst at the start (repeatable).
    #[arg(long = "fire")]
    fire: Vec<String>,
}

#[derive(serde::Serialize, Debug)]
struct Report {
    mode: ViewportMode,
    seconds: f64,
    ticks: u64,
    elements: BTreeMap<String, BTreeMap<Property, PropValue>>,
    carousels: BTreeMap<String, String>,
    emitted: BTreeMap<String, u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn load(path: &Path) -> anyhow::Result<StageConfig> {
    let config = StageConfig::from_path(path)
        .with_context(|| format!("load stage '{}'", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validate stage '{}'", path.display()))?;
    Ok(config)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load(&args.in_path)?;
    let timelines: usize = config.scopes.iter().map(|s| s.timelines.len()).sum();
    eprintln!(
        "ok: {} scopes, {timelines} timelines, {} marquees, {} carousels, {} bursts",
        config.scopes.len(),
        config.marquees.len(),
        config.carousels.len(),
        config.bursts.len()
    );
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be finite and >= 0"
    );
    anyhow::ensure!(args.fps.is_finite() && args.fps > 0.0, "--fps must be > 0");

    let config = load(&args.in_path)?;
    let mut tree = config.scene_tree();
    let (mut stage, handles) =
        Orchestrator::from_config(&config, args.width, args.viewport_height, &tree)
            .context("build stage")?;

    let burst_names: BTreeMap<_, _> = handles
        .bursts
        .iter()
        .map(|(name, id)| (*id, name.clone()))
        .collect();
    let mut emitted: BTreeMap<String, u64> =
        handles.bursts.keys().map(|n| (n.clone(), 0)).collect();

    let ticks = (args.seconds * args.fps).ceil() as u64;
    let mut resized = false;
    for i in 0..=ticks {
        let now = (i as f64 / args.fps).min(args.seconds);
        if let Some(y) = args.scroll_to {
            let frac = if args.seconds > 0.0 { now / args.seconds } else { 1.0 };
            stage.on_scroll(y * frac, &tree);
        }
        if let Some(w) = args.resize_to {
            if !resized && now >= args.seconds / 2.0 {
                stage.on_resize(w, args.viewport_height, &mut tree);
                resized = true;
            }
        }
        stage.tick(now, &mut tree);
        if i == 0 {
            for name in &args.fire {
                let id = handles
                    .bursts
                    .get(name)
                    .with_context(|| format!("unknown burst '{name}'"))?;
                stage.fire(*id);
            }
        }
        for (id, e) in stage.take_emissions() {
            if let Some(name) = burst_names.get(&id) {
                *emitted.entry(name.clone()).or_default() += u64::from(e.particles);
            }
        }
    }

    let carousels = handles
        .carousels
        .iter()
        .filter_map(|(name, id)| Some((name.clone(), stage.carousel(*id)?.current().clone())))
        .collect();
    let report = Report {
        mode: stage.mode(),
        seconds: args.seconds,
        ticks: ticks + 1,
        elements: tree.snapshot(),
        carousels,
        emitted,
    };
    stage.shutdown();

    let out = serde_json::to_string_pretty(&report).context("serialize report")?;
    println!("{out}");
    Ok(())
}
