//! Force-directed layout
//!
//! Every pair of nodes exerts a logarithmic force along the line between them.
//! Related pairs settle at `threshold` apart, unrelated pairs at four times
//! that, and each step moves every node by a damped fraction of its net force.
//!
//! Convergence is a heuristic: a step converges when no single pair
//! contribution has a component larger than `limit`. Oscillating
//! configurations can miss it forever, which is why the scheduler also caps
//! the number of steps.

use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::error::{LineageError, Result};
use crate::graph::{Position, RelationGraph};

/// Net force accumulated on one node during a single step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceSample {
    pub fx: f64,
    pub fy: f64,
}

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Largest absolute force component seen, floored at the limit
    pub max_force: f64,
    pub converged: bool,
}

/// A consistent copy of all node positions, taken between steps
#[derive(Debug, Clone)]
pub struct LayoutSnapshot {
    /// Number of steps applied when the snapshot was taken
    pub step: usize,
    pub converged: bool,
    titles: Arc<[String]>,
    positions: Vec<Position>,
}

impl LayoutSnapshot {
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, title: &str) -> Option<Position> {
        self.titles
            .iter()
            .position(|t| t == title)
            .map(|i| self.positions[i])
    }

    /// `(title, position)` pairs in node index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.titles
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }
}

/// Iterative force layout over a [`RelationGraph`]
///
/// The engine owns the live positions. Only `step` mutates them, and only
/// through `&mut self`, so a single stepping operation runs at a time.
#[derive(Debug)]
pub struct ForceLayoutEngine {
    graph: RelationGraph,
    config: LayoutConfig,
    titles: Arc<[String]>,
    positions: Vec<Position>,
    samples: Vec<ForceSample>,
    steps: usize,
    converged: bool,
}

impl ForceLayoutEngine {
    /// Start from the graph's initial positions
    pub fn new(graph: RelationGraph, config: LayoutConfig) -> Self {
        let titles: Arc<[String]> = graph.games().iter().map(|g| g.title.clone()).collect();
        let positions: Vec<Position> = graph.games().iter().map(|g| g.position).collect();
        let samples = vec![ForceSample::default(); positions.len()];

        Self {
            graph,
            config,
            titles,
            positions,
            samples,
            steps: 0,
            converged: false,
        }
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, title: &str) -> Option<Position> {
        self.graph.index_of(title).map(|i| self.positions[i])
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Whether the most recent step converged
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            step: self.steps,
            converged: self.converged,
            titles: Arc::clone(&self.titles),
            positions: self.positions.clone(),
        }
    }

    /// Signed force magnitude between two nodes `distance` apart.
    ///
    /// Positive values attract, negative values repel.
    pub fn force_magnitude(&self, related: bool, distance: f64) -> f64 {
        let threshold = self.config.threshold;
        if related {
            4.0 * (distance / threshold).ln()
        } else {
            (distance / (4.0 * threshold)).ln()
        }
    }

    /// Advance every node by one damped step.
    ///
    /// Fails without touching positions if the step would produce a
    /// non-finite coordinate.
    pub fn step(&mut self) -> Result<StepReport> {
        let n = self.positions.len();
        let eps = self.config.epsilon;
        let mut converge = self.config.limit;

        self.samples.fill(ForceSample::default());

        for i in 0..n {
            for j in (i + 1)..n {
                let point = self.positions[i];
                let other = self.positions[j];
                let dx = other.x - point.x;
                let dy = other.y - point.y;

                // Coincident nodes separate along +x from `point`
                let raw = dx.hypot(dy);
                let (distance, angle) = if raw < eps {
                    (eps, 0.0)
                } else {
                    (raw, dy.atan2(dx))
                };

                let force = self.force_magnitude(self.graph.is_related_index(i, j), distance);
                let fx = force * angle.cos();
                let fy = force * angle.sin();

                self.samples[i].fx += fx;
                self.samples[i].fy += fy;
                self.samples[j].fx -= fx;
                self.samples[j].fy -= fy;

                converge = converge.max(fx.abs()).max(fy.abs());
            }
        }

        let damping = self.config.damping;
        let next: Vec<Position> = self
            .positions
            .iter()
            .zip(&self.samples)
            .map(|(p, f)| Position::new(p.x + f.fx * damping, p.y + f.fy * damping))
            .collect();

        if let Some(bad) = next.iter().position(|p| !p.is_finite()) {
            return Err(LineageError::NumericDegeneracy {
                step: self.steps + 1,
                title: self.titles[bad].clone(),
            });
        }

        self.positions = next;
        self.steps += 1;
        self.converged = converge <= self.config.limit;
        tracing::trace!(step = self.steps, max_force = converge, "layout step");

        Ok(StepReport {
            max_force: converge,
            converged: self.converged,
        })
    }
}
