//! Games and the relations between them
//!
//! The graph is built once from loaded data: games first, then same-category
//! relations, then cross-category relations. Games are stored sorted by title
//! so node indices are stable across runs on the same data.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MissingEntity, RelationKind};

/// A point in layout space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Descriptive metadata carried through from the sources file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A game node
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    /// Unique key
    pub title: String,
    pub year: i32,
    /// Initial position; the layout engine keeps the live copy
    pub position: Position,
    pub details: GameDetails,
}

impl Game {
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            year,
            position: Position::default(),
            details: GameDetails::default(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

/// A relation to a game outside the roguelike set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossRelation {
    pub title: String,
    pub year: i32,
}

/// Games plus their undirected same-category edges and cross-category links
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    games: Vec<Game>,
    index: HashMap<String, usize>,
    /// Declared neighbours per node, de-duplicated, first-seen order
    neighbors: Vec<Vec<usize>>,
    /// Undirected edges as `(low, high)` index pairs
    edges: BTreeSet<(usize, usize)>,
    cross: Vec<Vec<CrossRelation>>,
    diagnostics: Vec<MissingEntity>,
}

impl RelationGraph {
    /// Create a graph with no relations. Later duplicates of a title replace
    /// earlier ones.
    pub fn new(games: impl IntoIterator<Item = Game>) -> Self {
        let mut by_title: BTreeMap<String, Game> = BTreeMap::new();
        for game in games {
            by_title.insert(game.title.clone(), game);
        }
        let games: Vec<Game> = by_title.into_values().collect();
        let index = games
            .iter()
            .enumerate()
            .map(|(i, g)| (g.title.clone(), i))
            .collect();
        let n = games.len();

        Self {
            games,
            index,
            neighbors: vec![Vec::new(); n],
            edges: BTreeSet::new(),
            cross: vec![Vec::new(); n],
            diagnostics: Vec::new(),
        }
    }

    /// Add same-category relations: title -> related titles
    pub fn with_relations<'a, I, R>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, R)>,
        R: IntoIterator<Item = &'a String>,
    {
        for (title, related) in relations {
            let Some(&from) = self.index.get(title) else {
                self.report(title, title, RelationKind::SameCategory);
                continue;
            };
            for other in related {
                let Some(&to) = self.index.get(other) else {
                    self.report(title, other, RelationKind::SameCategory);
                    continue;
                };
                if from == to {
                    tracing::debug!(title = %title, "ignoring self-relation");
                    continue;
                }
                if !self.neighbors[from].contains(&to) {
                    self.neighbors[from].push(to);
                }
                self.edges.insert((from.min(to), from.max(to)));
            }
        }
        self
    }

    /// Add cross-category relations. Targets are resolved against `years`,
    /// which covers games outside the roguelike set.
    pub fn with_cross_relations<'a, I, R>(mut self, relations: I, years: &HashMap<String, i32>) -> Self
    where
        I: IntoIterator<Item = (&'a String, R)>,
        R: IntoIterator<Item = &'a String>,
    {
        for (title, related) in relations {
            let Some(&from) = self.index.get(title) else {
                self.report(title, title, RelationKind::CrossCategory);
                continue;
            };
            for other in related {
                let Some(&year) = years.get(other) else {
                    self.report(title, other, RelationKind::CrossCategory);
                    continue;
                };
                if self.cross[from].iter().any(|c| &c.title == other) {
                    continue;
                }
                self.cross[from].push(CrossRelation {
                    title: other.clone(),
                    year,
                });
            }
        }
        self
    }

    fn report(&mut self, from: &str, to: &str, kind: RelationKind) {
        let missing = MissingEntity {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        };
        tracing::warn!("{missing}");
        self.diagnostics.push(missing);
    }

    /// Scatter every game uniformly over `[0, size) × [0, size)`
    pub fn scramble_positions<R: Rng>(&mut self, rng: &mut R, size: f64) {
        for game in &mut self.games {
            game.position = Position::new(rng.random::<f64>() * size, rng.random::<f64>() * size);
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in index order
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, title: &str) -> Option<&Game> {
        self.index_of(title).map(|i| &self.games[i])
    }

    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.index.get(title).copied()
    }

    /// Same-category relations declared by `title`, without duplicates or
    /// self-references. Unknown titles have no neighbours.
    pub fn neighbors(&self, title: &str) -> Vec<&str> {
        self.index_of(title)
            .map(|i| {
                self.neighbors[i]
                    .iter()
                    .map(|&j| self.games[j].title.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cross-category relations declared by `title`
    pub fn cross_neighbors(&self, title: &str) -> &[CrossRelation] {
        self.index_of(title)
            .map(|i| self.cross[i].as_slice())
            .unwrap_or_default()
    }

    /// Whether either game lists the other as a same-category relation
    pub fn is_related(&self, a: &str, b: &str) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.is_related_index(i, j),
            _ => false,
        }
    }

    /// Index form of [`is_related`](Self::is_related)
    pub fn is_related_index(&self, i: usize, j: usize) -> bool {
        i != j && self.edges.contains(&(i.min(j), i.max(j)))
    }

    /// Every same-category edge once, as title pairs in index order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|&(i, j)| (self.games[i].title.as_str(), self.games[j].title.as_str()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Relations that referenced unknown games and were skipped
    pub fn diagnostics(&self) -> &[MissingEntity] {
        &self.diagnostics
    }
}
