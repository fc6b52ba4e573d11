//! Achievement evaluation.
//!
//! Achievements are derived from progress and session history on demand.
//! The set stored on a progress record is only a cache of what this module
//! has already unlocked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Achievement, GameType, Progress, SessionResult};

/// Unlock thresholds for each rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementThresholds {
    #[serde(default = "default_first_game")]
    pub first_game_sessions: usize,
    #[serde(default = "default_getting_started")]
    pub getting_started_sessions: usize,
    #[serde(default = "default_word_collector")]
    pub word_collector_words: usize,
    #[serde(default = "default_star_collector")]
    pub star_collector_score: u64,
    /// Sessions of *each* game type needed for game-master.
    #[serde(default = "default_game_master")]
    pub game_master_per_type: usize,
    #[serde(default = "default_level_up")]
    pub level_up_level: u32,
}

fn default_first_game() -> usize {
    1
}
fn default_getting_started() -> usize {
    5
}
fn default_word_collector() -> usize {
    10
}
fn default_star_collector() -> u64 {
    100
}
fn default_game_master() -> usize {
    3
}
fn default_level_up() -> u32 {
    3
}

impl Default for AchievementThresholds {
    fn default() -> Self {
        Self {
            first_game_sessions: default_first_game(),
            getting_started_sessions: default_getting_started(),
            word_collector_words: default_word_collector(),
            star_collector_score: default_star_collector(),
            game_master_per_type: default_game_master(),
            level_up_level: default_level_up(),
        }
    }
}

impl AchievementThresholds {
    /// Short player-facing description of a rule.
    pub fn describe(&self, achievement: Achievement) -> String {
        match achievement {
            Achievement::FirstGame => "Play your first game".to_string(),
            Achievement::GettingStarted => {
                format!("Play {} games", self.getting_started_sessions)
            }
            Achievement::WordCollector => format!("Learn {} words", self.word_collector_words),
            Achievement::StarCollector => format!("Earn {} stars", self.star_collector_score),
            Achievement::GameMaster => format!(
                "Play {} games of every type",
                self.game_master_per_type
            ),
            Achievement::LevelUp => format!("Reach level {}", self.level_up_level),
        }
    }
}

/// Unlocked achievements under the default thresholds.
pub fn evaluate(progress: &Progress, history: &[SessionResult]) -> BTreeSet<Achievement> {
    evaluate_with(progress, history, &AchievementThresholds::default())
}

/// Unlocked achievements under custom thresholds.
pub fn evaluate_with(
    progress: &Progress,
    history: &[SessionResult],
    thresholds: &AchievementThresholds,
) -> BTreeSet<Achievement> {
    let games_of = |game_type: GameType| {
        history
            .iter()
            .filter(|s| s.game_type == game_type)
            .count()
    };

    Achievement::ALL
        .into_iter()
        .filter(|&achievement| match achievement {
            Achievement::FirstGame => history.len() >= thresholds.first_game_sessions,
            Achievement::GettingStarted => history.len() >= thresholds.getting_started_sessions,
            Achievement::WordCollector => {
                progress.words_learned.len() >= thresholds.word_collector_words
            }
            Achievement::StarCollector => progress.total_score >= thresholds.star_collector_score,
            Achievement::GameMaster => {
                games_of(GameType::Quiz) >= thresholds.game_master_per_type
                    && games_of(GameType::Match) >= thresholds.game_master_per_type
            }
            Achievement::LevelUp => progress.level() >= thresholds.level_up_level,
        })
        .collect()
}
