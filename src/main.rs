use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use roguelike_lineage::config::LayoutConfig;
use roguelike_lineage::loader::{self, DirectorySource};
use roguelike_lineage::mapping::{CoordinateMapper, YearRange};
use roguelike_lineage::scheduler::{ImmediateTicks, IntervalTicks};
use roguelike_lineage::session::LayoutSession;
use roguelike_lineage::timeline::{SelectionMarker, Timeline, TimelineArc, YearLabel};

mod cli;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_output(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote layout");
        }
        None => println!("{json}"),
    }
    Ok(())
}

struct LayoutArgs {
    data: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    max_iterations: Option<usize>,
    immediate: bool,
}

async fn layout(args: LayoutArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => LayoutConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    let frame = Duration::from_millis(config.frame_interval_ms);

    let source = DirectorySource::new(&args.data);
    let session = LayoutSession::load(&source, config)
        .await
        .with_context(|| format!("failed to load data from {}", args.data.display()))?;

    // Stop between steps on Ctrl+C; the layout so far is still written
    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut progress = session.subscribe();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let step = progress.borrow_and_update().step;
            if step % 100 == 0 {
                tracing::debug!(step, "layout progress");
            }
        }
    });

    let report = if args.immediate {
        session.run(&mut ImmediateTicks).await
    } else {
        session.run(&mut IntervalTicks::new(frame)).await
    };
    if let Err(err) = watcher.await {
        tracing::warn!(error = %err, "progress watcher failed");
    }

    let json = serde_json::to_string_pretty(&report.document())?;
    write_output(&json, args.output.as_deref())
}

async fn load_mapper(data: &Path) -> anyhow::Result<(CoordinateMapper, loader::Dataset)> {
    let config = LayoutConfig {
        seed: Some(0),
        ..LayoutConfig::default()
    };
    let dataset = loader::load(&DirectorySource::new(data), &config)
        .await
        .with_context(|| format!("failed to load data from {}", data.display()))?;
    Ok((CoordinateMapper::new(dataset.range), dataset))
}

async fn years(data: &Path) -> anyhow::Result<()> {
    let (mapper, _) = load_mapper(data).await?;
    for year in mapper.range().years() {
        println!(
            "{year}\t{:.2}\t{:.1}",
            mapper.x_from_year(year),
            mapper.hue_from_year(year)
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct TimelineDocument {
    years: YearRange,
    year_width: f64,
    arcs: Vec<TimelineArc>,
    year_labels: Vec<YearLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selection: Option<SelectionMarker>,
}

async fn timeline(data: &Path, select: Option<&str>) -> anyhow::Result<()> {
    let (mapper, dataset) = load_mapper(data).await?;
    let timeline = Timeline::new(&mapper);

    let selection = match select {
        Some(title) => match dataset.graph.game(title) {
            Some(game) => Some(timeline.selection(game)),
            None => bail!("unknown game '{title}'"),
        },
        None => None,
    };

    let doc = TimelineDocument {
        years: mapper.range(),
        year_width: mapper.year_width(),
        arcs: timeline.arcs(&dataset.graph),
        year_labels: timeline.year_labels(),
        selection,
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Layout {
            data,
            output,
            config,
            seed,
            max_iterations,
            immediate,
        } => {
            layout(LayoutArgs {
                data,
                output,
                config,
                seed,
                max_iterations,
                immediate,
            })
            .await?;
        }
        Commands::Years { data } => years(&data).await?,
        Commands::Timeline { data, select } => timeline(&data, select.as_deref()).await?,
    }

    Ok(())
}
