//! Drives the layout one step per frame tick
//!
//! The scheduler owns the engine, so it is the only writer of node positions.
//! After each step it publishes a [`LayoutSnapshot`] on a watch channel;
//! renderers read those copies and never touch the live positions.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

use crate::layout::{ForceLayoutEngine, LayoutSnapshot};

/// Source of refresh opportunities; one layout step is taken per tick
pub trait TickSource {
    /// Wait for the next tick
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Ticks on a fixed frame period
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// Must be called within a tokio runtime
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl TickSource for IntervalTicks {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            self.interval.tick().await;
        }
    }
}

/// Ticks as fast as the runtime allows, yielding between steps
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateTicks;

impl TickSource for ImmediateTicks {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}

/// Why the scheduler stopped
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The last step reported convergence
    Converged { steps: usize },
    /// `max_iterations` steps ran without converging
    IterationCap { steps: usize },
    /// Stopped from outside between steps
    Cancelled { steps: usize },
    /// A step would have produced non-finite positions; the layout stays
    /// where it was
    Degenerate { steps: usize, reason: String },
}

impl Outcome {
    pub fn steps(&self) -> usize {
        match self {
            Outcome::Converged { steps }
            | Outcome::IterationCap { steps }
            | Outcome::Cancelled { steps }
            | Outcome::Degenerate { steps, .. } => *steps,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Outcome::Converged { .. })
    }
}

/// Requests cancellation of a running scheduler from another task
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

type CompletionCallback = Box<dyn FnOnce(&Outcome) + Send>;

/// Steps a [`ForceLayoutEngine`] until it converges, hits the iteration cap,
/// or is cancelled
pub struct AnimationScheduler {
    engine: ForceLayoutEngine,
    max_iterations: usize,
    outcome: Option<Outcome>,
    snapshots: watch::Sender<LayoutSnapshot>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
    on_complete: Option<CompletionCallback>,
}

impl AnimationScheduler {
    pub fn new(engine: ForceLayoutEngine) -> Self {
        let max_iterations = engine.config().max_iterations;
        let (snapshots, _) = watch::channel(engine.snapshot());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        Self {
            engine,
            max_iterations,
            outcome: None,
            snapshots,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
            on_complete: None,
        }
    }

    /// Call `callback` once when the run finishes, whatever the outcome
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Receive a snapshot after every step
    pub fn subscribe(&self) -> watch::Receiver<LayoutSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    pub fn engine(&self) -> &ForceLayoutEngine {
        &self.engine
    }

    pub fn into_engine(self) -> ForceLayoutEngine {
        self.engine
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Stop before the next step
    pub fn cancel(&mut self) -> Option<Outcome> {
        if self.is_finished() {
            return None;
        }
        let steps = self.engine.steps_taken();
        Some(self.finish(Outcome::Cancelled { steps }))
    }

    /// Take one step. Returns the outcome on the tick that finishes the run
    /// and `None` otherwise; once finished, further ticks do nothing.
    pub fn tick(&mut self) -> Option<Outcome> {
        if self.is_finished() {
            return None;
        }
        if *self.cancel_rx.borrow() {
            return self.cancel();
        }

        match self.engine.step() {
            Ok(report) => {
                self.snapshots.send_replace(self.engine.snapshot());
                let steps = self.engine.steps_taken();
                if report.converged {
                    Some(self.finish(Outcome::Converged { steps }))
                } else if steps >= self.max_iterations {
                    Some(self.finish(Outcome::IterationCap { steps }))
                } else {
                    None
                }
            }
            Err(err) => {
                let steps = self.engine.steps_taken();
                Some(self.finish(Outcome::Degenerate {
                    steps,
                    reason: err.to_string(),
                }))
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Converged { steps } => {
                tracing::info!(steps, "force layout completed")
            }
            Outcome::IterationCap { steps } => {
                tracing::warn!(steps, "force layout stopped at iteration cap without converging")
            }
            Outcome::Cancelled { steps } => tracing::info!(steps, "force layout cancelled"),
            Outcome::Degenerate { steps, reason } => {
                tracing::warn!(steps, %reason, "force layout halted on degenerate step")
            }
        }
        self.outcome = Some(outcome.clone());
        if let Some(callback) = self.on_complete.take() {
            callback(&outcome);
        }
        outcome
    }

    /// Step once per tick from `ticks` until finished, then hand back the
    /// engine with its final positions
    pub async fn run<T: TickSource>(mut self, ticks: &mut T) -> (Outcome, ForceLayoutEngine) {
        let mut cancel = self.cancel_rx.clone();
        loop {
            if let Some(outcome) = self.outcome.clone() {
                return (outcome, self.engine);
            }
            tokio::select! {
                _ = ticks.tick() => {}
                Ok(()) = cancel.changed() => {}
            }
            self.tick();
        }
    }
}
