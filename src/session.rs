//! A layout session: construct from loaded data, run, read the results
//!
//! The session owns everything the charts share: the year mapping, the
//! relation graph and the scheduler driving the layout. Renderers subscribe
//! before the run and receive a snapshot after every step.

use serde::Serialize;
use tokio::sync::watch;

use crate::config::LayoutConfig;
use crate::error::{MissingEntity, Result};
use crate::graph::RelationGraph;
use crate::layout::{ForceLayoutEngine, LayoutSnapshot};
use crate::loader::{self, DataSource, Dataset};
use crate::mapping::{CoordinateMapper, YearRange};
use crate::scheduler::{AnimationScheduler, CancelHandle, Outcome, TickSource};
use crate::timeline::{Timeline, TimelineArc, YearLabel};

pub struct LayoutSession {
    mapper: CoordinateMapper,
    scheduler: AnimationScheduler,
}

impl LayoutSession {
    /// Load every data stage from `source`, then set up the layout
    pub async fn load<S: DataSource>(source: &S, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let dataset = loader::load(source, &config).await?;
        Self::from_dataset(dataset, config)
    }

    pub fn from_dataset(dataset: Dataset, config: LayoutConfig) -> Result<Self> {
        Self::new(dataset.graph, dataset.range, config)
    }

    /// Fails with [`LineageError::Config`] if `config` does not validate
    ///
    /// [`LineageError::Config`]: crate::error::LineageError::Config
    pub fn new(graph: RelationGraph, range: YearRange, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let engine = ForceLayoutEngine::new(graph, config);
        Ok(Self {
            mapper: CoordinateMapper::new(range),
            scheduler: AnimationScheduler::new(engine),
        })
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn graph(&self) -> &RelationGraph {
        self.scheduler.engine().graph()
    }

    pub fn timeline(&self) -> Timeline<'_> {
        Timeline::new(&self.mapper)
    }

    pub fn subscribe(&self) -> watch::Receiver<LayoutSnapshot> {
        self.scheduler.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.scheduler.cancel_handle()
    }

    /// Register a callback for when the layout finishes
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        self.scheduler = self.scheduler.on_complete(callback);
        self
    }

    /// Step once per tick until the layout finishes
    pub async fn run<T: TickSource>(self, ticks: &mut T) -> LayoutReport {
        let (outcome, engine) = self.scheduler.run(ticks).await;
        LayoutReport {
            mapper: self.mapper,
            outcome,
            engine,
        }
    }

    /// Step in a plain loop, with no runtime or tick source
    pub fn run_to_completion(mut self) -> LayoutReport {
        let outcome = loop {
            if let Some(outcome) = self.scheduler.tick() {
                break outcome;
            }
        };
        LayoutReport {
            mapper: self.mapper,
            outcome,
            engine: self.scheduler.into_engine(),
        }
    }
}

/// Final state of a finished session
#[derive(Debug)]
pub struct LayoutReport {
    pub mapper: CoordinateMapper,
    pub outcome: Outcome,
    pub engine: ForceLayoutEngine,
}

/// Serializable summary of a finished layout for external renderers
#[derive(Debug, Clone, Serialize)]
pub struct LayoutDocument {
    pub years: YearRange,
    pub outcome: Outcome,
    pub nodes: Vec<NodeEntry>,
    pub links: Vec<LinkEntry>,
    pub arcs: Vec<TimelineArc>,
    pub year_labels: Vec<YearLabel>,
    pub diagnostics: Vec<MissingEntity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeEntry {
    pub title: String,
    pub year: i32,
    pub x: f64,
    pub y: f64,
    pub hue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkEntry {
    pub source: String,
    pub target: String,
}

impl LayoutReport {
    pub fn graph(&self) -> &RelationGraph {
        self.engine.graph()
    }

    pub fn document(&self) -> LayoutDocument {
        let graph = self.graph();
        let timeline = Timeline::new(&self.mapper);

        let nodes = graph
            .games()
            .iter()
            .zip(self.engine.positions())
            .map(|(game, p)| NodeEntry {
                title: game.title.clone(),
                year: game.year,
                x: p.x,
                y: p.y,
                hue: self.mapper.hue_from_year(game.year),
            })
            .collect();
        let links = graph
            .edges()
            .map(|(source, target)| LinkEntry {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect();

        LayoutDocument {
            years: self.mapper.range(),
            outcome: self.outcome.clone(),
            nodes,
            links,
            arcs: timeline.arcs(graph),
            year_labels: timeline.year_labels(),
            diagnostics: graph.diagnostics().to_vec(),
        }
    }
}
