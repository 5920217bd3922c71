//! Geometry for the timeline arc chart
//!
//! Years run left to right along a baseline at half the chart height. Each
//! roguelike relation is a half-circle arc above the baseline joining the two
//! games' year slots; relations to games outside the genre hang below it.
//! Everything here is plain numbers for an external renderer to draw.

use std::f64::consts::PI;

use serde::Serialize;

use crate::graph::{Game, RelationGraph};
use crate::mapping::CoordinateMapper;

/// Height of the timeline chart in canvas units
pub const TIMELINE_HEIGHT: f64 = 80.0;

/// HSLA colour, hue in degrees and the rest in percent or `[0, 1]` alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsla {
    pub fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    /// CSS `hsla()` notation
    pub fn css(&self) -> String {
        format!("hsla({}, {}%, {}%, {})", self.h, self.s, self.l, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcSide {
    /// Roguelike to roguelike
    Above,
    /// Roguelike to a game outside the genre
    Below,
}

/// A half-circle joining two year slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineArc {
    pub from: String,
    pub to: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// Sweep in radians
    pub start_angle: f64,
    pub end_angle: f64,
    pub side: ArcSide,
    pub stroke: Hsla,
}

/// A year tick on the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearLabel {
    pub year: i32,
    pub x: f64,
    pub y: f64,
    pub fill: Hsla,
}

/// Highlight for a selected game: a bar in its year slot plus a rotated
/// title anchored next to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionMarker {
    pub title: String,
    pub x: f64,
    pub width: f64,
    pub baseline: f64,
    pub label_x: f64,
    pub fill: Hsla,
}

/// Timeline geometry for one year range
#[derive(Debug, Clone, Copy)]
pub struct Timeline<'a> {
    mapper: &'a CoordinateMapper,
    height: f64,
}

impl<'a> Timeline<'a> {
    pub fn new(mapper: &'a CoordinateMapper) -> Self {
        Self {
            mapper,
            height: TIMELINE_HEIGHT,
        }
    }

    fn baseline(&self) -> f64 {
        self.height / 2.0
    }

    /// One label per year in the range
    pub fn year_labels(&self) -> Vec<YearLabel> {
        self.mapper
            .range()
            .years()
            .map(|year| YearLabel {
                year,
                x: self.mapper.x_from_year(year),
                y: self.baseline() + 1.75,
                fill: Hsla::new(self.mapper.hue_from_year(year), 40.0, 60.0, 1.0),
            })
            .collect()
    }

    fn arc(&self, from: &Game, to: &str, to_year: i32, side: ArcSide) -> TimelineArc {
        let from_x = self.mapper.x_from_year(from.year);
        let to_x = self.mapper.x_from_year(to_year);
        let hue = self.mapper.hue_from_year(from.year);
        let (cy, start_angle, end_angle, alpha) = match side {
            ArcSide::Above => (self.baseline() + 0.5, PI, 2.0 * PI, 1.0),
            ArcSide::Below => (self.baseline() + 2.5, 0.0, PI, 0.2),
        };

        TimelineArc {
            from: from.title.clone(),
            to: to.to_string(),
            // Centred on the slot midpoints, not their left edges
            cx: (from_x + to_x) / 2.0 + self.mapper.year_width() * 0.9 / 2.0,
            cy,
            radius: (from_x - to_x).abs() / 2.0,
            start_angle,
            end_angle,
            side,
            stroke: Hsla::new(hue, 40.0, 70.0, alpha),
        }
    }

    /// Arcs for every declared relation, roguelike ones first
    pub fn arcs(&self, graph: &RelationGraph) -> Vec<TimelineArc> {
        let mut arcs = Vec::new();
        for game in graph.games() {
            for other in graph.neighbors(&game.title) {
                if let Some(target) = graph.game(other) {
                    arcs.push(self.arc(game, other, target.year, ArcSide::Above));
                }
            }
        }
        for game in graph.games() {
            for cross in graph.cross_neighbors(&game.title) {
                arcs.push(self.arc(game, &cross.title, cross.year, ArcSide::Below));
            }
        }
        arcs
    }

    pub fn selection(&self, game: &Game) -> SelectionMarker {
        let x = self.mapper.x_from_year(game.year);
        let width = self.mapper.year_width();
        SelectionMarker {
            title: game.title.clone(),
            x,
            width,
            baseline: self.baseline(),
            label_x: x + width / 2.0 + 0.3,
            fill: Hsla::new(self.mapper.hue_from_year(game.year), 40.0, 60.0, 1.0),
        }
    }
}
