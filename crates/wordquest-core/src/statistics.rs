//! Aggregate statistics over a player's session history.

use serde::{Deserialize, Serialize};

use crate::model::{GameType, SessionResult};

/// Summary figures for the progress screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_games: usize,
    pub total_score: u64,
    /// Mean score per session, rounded to the nearest integer.
    pub average_score: u64,
    pub quiz_games: usize,
    pub match_games: usize,
    pub best_quiz_score: Option<u32>,
    pub best_match_score: Option<u32>,
    /// Σcorrect / Σtotal over every session, in `[0, 1]`.
    pub accuracy: f64,
}

/// Compute summary statistics for a list of completed sessions.
pub fn compute_history_stats(history: &[SessionResult]) -> HistoryStats {
    if history.is_empty() {
        return HistoryStats::default();
    }

    let total_games = history.len();
    let total_score: u64 = history.iter().map(|s| u64::from(s.score)).sum();
    let average_score = (total_score as f64 / total_games as f64).round() as u64;

    let of_type = |game_type: GameType| history.iter().filter(move |s| s.game_type == game_type);
    let best = |game_type: GameType| of_type(game_type).map(|s| s.score).max();

    let correct: u64 = history.iter().map(|s| u64::from(s.correct_count)).sum();
    let total: u64 = history.iter().map(|s| u64::from(s.total_count)).sum();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    HistoryStats {
        total_games,
        total_score,
        average_score,
        quiz_games: of_type(GameType::Quiz).count(),
        match_games: of_type(GameType::Match).count(),
        best_quiz_score: best(GameType::Quiz),
        best_match_score: best(GameType::Match),
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn session(game_type: GameType, score: u32, correct: u32, total: u32) -> SessionResult {
        SessionResult::new(game_type, score, correct, total, BTreeSet::new())
    }

    #[test]
    fn empty_history() {
        let stats = compute_history_stats(&[]);
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.best_quiz_score, None);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn mixed_history() {
        let history = vec![
            session(GameType::Quiz, 7, 7, 10),
            session(GameType::Quiz, 4, 4, 10),
            session(GameType::Match, 70, 6, 6),
        ];
        let stats = compute_history_stats(&history);
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_score, 81);
        assert_eq!(stats.average_score, 27);
        assert_eq!(stats.quiz_games, 2);
        assert_eq!(stats.match_games, 1);
        assert_eq!(stats.best_quiz_score, Some(7));
        assert_eq!(stats.best_match_score, Some(70));
        assert!((stats.accuracy - 17.0 / 26.0).abs() < 1e-9);
    }

    #[test]
    fn average_rounds_to_nearest() {
        let history = vec![
            session(GameType::Quiz, 1, 1, 10),
            session(GameType::Quiz, 2, 2, 10),
        ];
        assert_eq!(compute_history_stats(&history).average_score, 2);
    }
}
