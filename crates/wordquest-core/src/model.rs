//! Core data model types for wordquest.
//!
//! These are the records shared by the word bank, the two session state
//! machines, and the progress aggregator.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of distinct learned words needed to gain one level.
pub const WORDS_PER_LEVEL: usize = 10;

/// Identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub u32);

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single source/target vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// Unique identifier within the catalog.
    pub id: WordId,
    /// Text in the language being learned.
    pub source: String,
    /// Text in the player's own language.
    pub target: String,
    /// Thematic category (e.g. "animals").
    pub category: String,
    /// Difficulty tier, starting at 1.
    pub difficulty: u32,
}

/// Which language a match card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Kind of game a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Quiz,
    Match,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Quiz => write!(f, "quiz"),
            GameType::Match => write!(f, "match"),
        }
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quiz" | "vocabulary" => Ok(GameType::Quiz),
            "match" | "memory" => Ok(GameType::Match),
            other => Err(format!("unknown game type: {other}")),
        }
    }
}

/// Immutable summary of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Unique identifier, used as the history document id.
    pub id: Uuid,
    pub game_type: GameType,
    pub score: u32,
    pub correct_count: u32,
    pub total_count: u32,
    /// Every word the session presented.
    pub learned_word_ids: BTreeSet<WordId>,
    pub completed_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn new(
        game_type: GameType,
        score: u32,
        correct_count: u32,
        total_count: u32,
        learned_word_ids: BTreeSet<WordId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_type,
            score,
            correct_count,
            total_count,
            learned_word_ids,
            completed_at: Utc::now(),
        }
    }

    pub fn incorrect_count(&self) -> u32 {
        self.total_count.saturating_sub(self.correct_count)
    }
}

/// Opaque player handle supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A named milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Achievement {
    FirstGame,
    GettingStarted,
    WordCollector,
    StarCollector,
    GameMaster,
    LevelUp,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstGame,
        Achievement::GettingStarted,
        Achievement::WordCollector,
        Achievement::StarCollector,
        Achievement::GameMaster,
        Achievement::LevelUp,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Achievement::FirstGame => "first-game",
            Achievement::GettingStarted => "getting-started",
            Achievement::WordCollector => "word-collector",
            Achievement::StarCollector => "star-collector",
            Achievement::GameMaster => "game-master",
            Achievement::LevelUp => "level-up",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstGame => "First Game",
            Achievement::GettingStarted => "Getting Started",
            Achievement::WordCollector => "Word Collector",
            Achievement::StarCollector => "Star Collector",
            Achievement::GameMaster => "Game Master",
            Achievement::LevelUp => "Level Up",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Achievement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Achievement::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| format!("unknown achievement: {s}"))
    }
}

/// Cumulative per-player record.
///
/// `level` is not a field; it is derived from `words_learned`
/// every time it is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Document id in the progress collection.
    pub id: Uuid,
    pub player_id: PlayerId,
    pub total_score: u64,
    pub words_learned: BTreeSet<WordId>,
    #[serde(default)]
    pub achievements: BTreeSet<Achievement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    /// A zero-valued record for a player seen for the first time.
    pub fn new(player_id: PlayerId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            player_id,
            total_score: 0,
            words_learned: BTreeSet::new(),
            achievements: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn level(&self) -> u32 {
        1 + (self.words_learned.len() / WORDS_PER_LEVEL) as u32
    }

    /// Display value: how far the player is into the current level, 0-90.
    pub fn level_progress_percent(&self) -> u32 {
        ((self.words_learned.len() % WORDS_PER_LEVEL) * 100 / WORDS_PER_LEVEL) as u32
    }

    pub fn words_to_next_level(&self) -> usize {
        WORDS_PER_LEVEL - self.words_learned.len() % WORDS_PER_LEVEL
    }

    /// Merge one session into the record. Not idempotent.
    pub(crate) fn absorb(&mut self, result: &SessionResult) {
        self.total_score += u64::from(result.score);
        self.words_learned
            .extend(result.learned_word_ids.iter().copied());
        self.updated_at = Utc::now();
    }
}
