//! Sequential load pipeline for the generated lineage data
//!
//! Stages run strictly in order and each can fail on its own: years (which
//! fix the year range), game sources (which become graph nodes with scrambled
//! positions), roguelike relations, then relations to games outside the genre.
//! The layout never starts from a partially loaded graph.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::LayoutConfig;
use crate::error::{LineageError, Result};
use crate::graph::{Game, GameDetails, RelationGraph};
use crate::mapping::{MAX_YEAR_SLOTS, YearRange};

/// Title -> release year, for every known game
pub const YEARS_FILE: &str = "games-years.json";
/// Title -> year and metadata, for every roguelike
pub const SOURCES_FILE: &str = "game-sources.json";
/// Title -> related roguelike titles
pub const RELATIONS_FILE: &str = "roguelike-relations.json";
/// Title -> related titles outside the genre
pub const OTHER_RELATIONS_FILE: &str = "other-relations.json";

/// Where the data files come from
pub trait DataSource {
    /// Name of `file` as shown in errors
    fn locate(&self, file: &str) -> PathBuf;

    /// Read the full contents of `file`
    fn fetch(&self, file: &str) -> impl Future<Output = std::io::Result<String>> + Send;
}

/// Data files in a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DataSource for DirectorySource {
    fn locate(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn fetch(&self, file: &str) -> impl Future<Output = std::io::Result<String>> + Send {
        tokio::fs::read_to_string(self.locate(file))
    }
}

/// Years appear both as numbers and as numeric strings in the generated data
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearValue {
    Number(i32),
    Text(String),
}

impl YearValue {
    fn resolve(&self, title: &str, path: &Path) -> Result<i32> {
        match self {
            YearValue::Number(year) => Ok(*year),
            YearValue::Text(text) => text.trim().parse().map_err(|_| LineageError::Parse {
                path: path.to_path_buf(),
                message: format!("invalid year '{text}' for '{title}'"),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GameSource {
    #[serde(rename = "Year")]
    year: YearValue,
    #[serde(flatten)]
    details: GameDetails,
}

/// Relation lists keyed by owning title
pub type Relations = BTreeMap<String, Vec<String>>;

/// Everything the layout needs, fully loaded
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Years of every known game, including those outside the graph
    pub years: HashMap<String, i32>,
    pub range: YearRange,
    pub graph: RelationGraph,
}

async fn read_json<S, T>(source: &S, file: &str) -> Result<T>
where
    S: DataSource,
    T: DeserializeOwned,
{
    let path = source.locate(file);
    tracing::debug!(path = %path.display(), "loading");
    let text = source.fetch(file).await.map_err(|err| {
        tracing::error!(path = %path.display(), "failed to load");
        LineageError::Io {
            path: path.clone(),
            source: err,
        }
    })?;
    serde_json::from_str(&text).map_err(|err| LineageError::Parse {
        path,
        message: err.to_string(),
    })
}

/// Stage 1: every known game's year
pub async fn load_years<S: DataSource>(source: &S) -> Result<HashMap<String, i32>> {
    let path = source.locate(YEARS_FILE);
    let raw: BTreeMap<String, YearValue> = read_json(source, YEARS_FILE).await?;
    if raw.is_empty() {
        return Err(LineageError::EmptyDataset(path));
    }
    raw.iter()
        .map(|(title, year)| -> Result<(String, i32)> {
            Ok((title.clone(), year.resolve(title, &path)?))
        })
        .collect()
}

/// Stage 2: roguelikes, which become graph nodes
pub async fn load_sources<S: DataSource>(source: &S) -> Result<Vec<Game>> {
    let path = source.locate(SOURCES_FILE);
    let raw: BTreeMap<String, GameSource> = read_json(source, SOURCES_FILE).await?;
    raw.into_iter()
        .map(|(title, entry)| -> Result<Game> {
            let year = entry.year.resolve(&title, &path)?;
            let mut game = Game::new(title, year);
            game.details = entry.details;
            Ok(game)
        })
        .collect()
}

/// Stage 3 and 4: a relation file
pub async fn load_relations<S: DataSource>(source: &S, file: &str) -> Result<Relations> {
    read_json(source, file).await
}

/// Run every stage in order and assemble the graph
pub async fn load<S: DataSource>(source: &S, config: &LayoutConfig) -> Result<Dataset> {
    let years = load_years(source).await?;
    let games = load_sources(source).await?;
    let range = YearRange::from_years(years.values().copied().chain(games.iter().map(|g| g.year)))
        .ok_or_else(|| LineageError::EmptyDataset(source.locate(YEARS_FILE)))?;
    if range.slots() > MAX_YEAR_SLOTS {
        return Err(LineageError::Parse {
            path: source.locate(YEARS_FILE),
            message: format!(
                "year range {}..={} spans more than {MAX_YEAR_SLOTS} years",
                range.min, range.max
            ),
        });
    }
    tracing::debug!(min = range.min, max = range.max, "year range");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut graph = RelationGraph::new(games);
    graph.scramble_positions(&mut rng, config.canvas_size);

    let relations = load_relations(source, RELATIONS_FILE).await?;
    let other = load_relations(source, OTHER_RELATIONS_FILE).await?;
    let graph = graph
        .with_relations(&relations)
        .with_cross_relations(&other, &years);

    tracing::info!(
        games = graph.len(),
        edges = graph.edge_count(),
        missing = graph.diagnostics().len(),
        "loaded lineage data"
    );

    Ok(Dataset {
        years,
        range,
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Data files held in memory
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, String>,
    }

    impl MemorySource {
        fn with(mut self, file: &str, contents: &str) -> Self {
            self.files.insert(file.to_string(), contents.to_string());
            self
        }
    }

    impl DataSource for MemorySource {
        fn locate(&self, file: &str) -> PathBuf {
            PathBuf::from("memory").join(file)
        }

        fn fetch(&self, file: &str) -> impl Future<Output = std::io::Result<String>> + Send {
            let found = self.files.get(file).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file")
            });
            async move { found }
        }
    }

    fn complete_source() -> MemorySource {
        MemorySource::default()
            .with(
                YEARS_FILE,
                r#"{"Rogue": 1980, "Hack": "1982", "Angband": 1990, "Adventure": 1976}"#,
            )
            .with(
                SOURCES_FILE,
                r#"{
                    "Rogue": {"Year": 1980, "Developer": "Toy, Wichman", "Platform": "Unix"},
                    "Hack": {"Year": "1982", "Title": "Hack"},
                    "Angband": {"Year": 1990}
                }"#,
            )
            .with(
                RELATIONS_FILE,
                r#"{"Hack": ["Rogue", "Rogue", "Hack"], "Angband": ["Moria"]}"#,
            )
            .with(OTHER_RELATIONS_FILE, r#"{"Rogue": ["Adventure", "Zork"]}"#)
    }

    fn seeded() -> LayoutConfig {
        LayoutConfig {
            seed: Some(1),
            ..LayoutConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_complete_dataset() {
        let dataset = load(&complete_source(), &seeded()).await.unwrap();

        assert_eq!(dataset.range, YearRange::new(1976, 1990));
        assert_eq!(dataset.graph.len(), 3);
        assert!(dataset.graph.is_related("Rogue", "Hack"));
        assert_eq!(dataset.graph.edge_count(), 1);
        assert_eq!(dataset.graph.cross_neighbors("Rogue").len(), 1);

        let rogue = dataset.graph.game("Rogue").unwrap();
        assert_eq!(rogue.details.developer.as_deref(), Some("Toy, Wichman"));
        assert_eq!(rogue.details.platform.as_deref(), Some("Unix"));
    }

    #[tokio::test]
    async fn missing_entities_are_diagnostics() {
        let dataset = load(&complete_source(), &seeded()).await.unwrap();
        let missing: Vec<(&str, &str)> = dataset
            .graph
            .diagnostics()
            .iter()
            .map(|m| (m.from.as_str(), m.to.as_str()))
            .collect();
        assert_eq!(missing, [("Angband", "Moria"), ("Rogue", "Zork")]);
    }

    #[tokio::test]
    async fn same_seed_scrambles_identically() {
        let a = load(&complete_source(), &seeded()).await.unwrap();
        let b = load(&complete_source(), &seeded()).await.unwrap();
        let positions = |d: &Dataset| d.graph.games().iter().map(|g| g.position).collect::<Vec<_>>();

        assert_eq!(positions(&a), positions(&b));
        for p in positions(&a) {
            assert!((0.0..100.0).contains(&p.x) && (0.0..100.0).contains(&p.y));
        }
    }

    #[tokio::test]
    async fn missing_file_stops_the_pipeline() {
        let source = MemorySource::default()
            .with(YEARS_FILE, r#"{"Rogue": 1980}"#)
            .with(SOURCES_FILE, r#"{"Rogue": {"Year": 1980}}"#);
        let err = load(&source, &seeded()).await.unwrap_err();

        match err {
            LineageError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("memory").join(RELATIONS_FILE))
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_years_is_an_error() {
        let source = complete_source().with(YEARS_FILE, "{}");
        let err = load(&source, &seeded()).await.unwrap_err();
        assert!(matches!(err, LineageError::EmptyDataset(_)));
    }

    #[tokio::test]
    async fn malformed_year_is_a_parse_error() {
        let source = complete_source().with(YEARS_FILE, r#"{"Rogue": "nineteen eighty"}"#);
        let err = load(&source, &seeded()).await.unwrap_err();
        assert!(err.to_string().contains("invalid year 'nineteen eighty' for 'Rogue'"));
    }

    #[tokio::test]
    async fn implausible_year_span_is_a_parse_error() {
        let source = complete_source().with(
            YEARS_FILE,
            r#"{"Rogue": 1980, "Hack": 1982, "Typo": -2000000000}"#,
        );
        let err = load(&source, &seeded()).await.unwrap_err();
        match err {
            LineageError::Parse { path, message } => {
                assert_eq!(path, PathBuf::from("memory").join(YEARS_FILE));
                assert!(message.contains("spans more than 1000 years"), "{message}");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let source = complete_source().with(RELATIONS_FILE, "[1, 2");
        let err = load(&source, &seeded()).await.unwrap_err();
        assert!(matches!(err, LineageError::Parse { .. }));
    }

    #[tokio::test]
    async fn reads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(YEARS_FILE), r#"{"Rogue": 1980}"#).unwrap();

        let years = load_years(&DirectorySource::new(dir.path())).await.unwrap();
        assert_eq!(years.get("Rogue"), Some(&1980));
    }
}
