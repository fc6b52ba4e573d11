//! Memory-match session.
//!
//! Every sampled word contributes one source-side and one target-side card.
//! The player flips two cards per move; a move matches when both cards
//! belong to the same word and show opposite sides. A mismatch stays face
//! up until the caller invokes [`MatchSession::resolve_pending_mismatch`].

use std::collections::BTreeSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{GameType, SessionResult, Side, WordId, WordPair};
use crate::word_bank::WordBank;

/// Settings for a match session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_pair_count")]
    pub pair_count: usize,
    #[serde(default = "default_tier")]
    pub difficulty_tier: Option<u32>,
    #[serde(default = "default_points")]
    pub points_per_match: u32,
    /// Added to the score once every pair is matched.
    #[serde(default = "default_points")]
    pub completion_bonus: u32,
}

fn default_pair_count() -> usize {
    6
}
fn default_tier() -> Option<u32> {
    Some(1)
}
fn default_points() -> u32 {
    10
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            pair_count: default_pair_count(),
            difficulty_tier: default_tier(),
            points_per_match: default_points(),
            completion_bonus: default_points(),
        }
    }
}

/// Identifies one card: the word it belongs to and the side it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId {
    pub pair: WordId,
    pub side: Side,
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.pair, self.side)
    }
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub text: String,
    pub matched: bool,
}

impl Card {
    pub fn pair_id(&self) -> WordId {
        self.id.pair
    }

    pub fn side(&self) -> Side {
        self.id.side
    }
}

/// Where a match session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Initializing,
    AwaitingFirstFlip,
    AwaitingSecondFlip,
    /// Two mismatched cards are face up, waiting to be cleared.
    Evaluating,
    Complete,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPhase::Initializing => write!(f, "initializing"),
            MatchPhase::AwaitingFirstFlip => write!(f, "awaiting the first flip"),
            MatchPhase::AwaitingSecondFlip => write!(f, "awaiting the second flip"),
            MatchPhase::Evaluating => write!(f, "a mismatch is pending"),
            MatchPhase::Complete => write!(f, "complete"),
        }
    }
}

/// What a flip did.
#[derive(Debug, Clone, PartialEq)]
pub enum FlipOutcome {
    /// First card of a move; waiting for the second.
    Revealed,
    /// The two cards matched.
    Matched(WordId),
    /// The two cards did not match and stay up until resolved.
    Mismatched,
    /// The last pair matched; the session is over.
    Completed(SessionResult),
}

/// One memory-match play-through.
pub struct MatchSession {
    config: MatchConfig,
    cards: Vec<Card>,
    words: Vec<WordPair>,
    flipped: Vec<CardId>,
    matched_pairs: BTreeSet<WordId>,
    move_count: u32,
    score: u32,
    phase: MatchPhase,
    result: Option<SessionResult>,
}

impl MatchSession {
    /// Sample the words, deal two cards per word, and shuffle the board.
    ///
    /// The random source is only needed while dealing.
    pub fn start<R: Rng + ?Sized>(
        bank: &WordBank,
        config: MatchConfig,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let words = bank.sample(config.pair_count, config.difficulty_tier, rng);
        if words.is_empty() {
            return Err(EngineError::EmptyPool(format!(
                "start a match game at tier {:?}",
                config.difficulty_tier
            )));
        }

        let mut cards: Vec<Card> = words
            .iter()
            .flat_map(|w| {
                [
                    Card {
                        id: CardId {
                            pair: w.id,
                            side: Side::Source,
                        },
                        text: w.source.clone(),
                        matched: false,
                    },
                    Card {
                        id: CardId {
                            pair: w.id,
                            side: Side::Target,
                        },
                        text: w.target.clone(),
                        matched: false,
                    },
                ]
            })
            .collect();
        cards.shuffle(rng);

        tracing::debug!(pairs = words.len(), "match game started");
        Ok(Self {
            config,
            cards,
            words,
            flipped: Vec::with_capacity(2),
            matched_pairs: BTreeSet::new(),
            move_count: 0,
            score: 0,
            phase: MatchPhase::AwaitingFirstFlip,
            result: None,
        })
    }

    /// Turn a card face up.
    ///
    /// Flipping while two cards are already up, flipping a matched card, or
    /// flipping the same card twice is rejected rather than ignored.
    pub fn flip(&mut self, card_id: CardId) -> Result<FlipOutcome, EngineError> {
        match self.phase {
            MatchPhase::AwaitingFirstFlip | MatchPhase::AwaitingSecondFlip => {}
            phase => return Err(EngineError::invalid_state("flip a card", phase)),
        }
        let card = self
            .card(card_id)
            .ok_or(EngineError::UnknownCard(card_id))?;
        if card.matched {
            return Err(EngineError::invalid_state(
                "flip a card",
                format!("card {card_id} is already matched"),
            ));
        }
        if self.flipped.contains(&card_id) {
            return Err(EngineError::invalid_state(
                "flip a card",
                format!("card {card_id} is already face up"),
            ));
        }

        self.flipped.push(card_id);
        if self.flipped.len() == 1 {
            self.phase = MatchPhase::AwaitingSecondFlip;
            return Ok(FlipOutcome::Revealed);
        }

        self.phase = MatchPhase::Evaluating;
        Ok(self.evaluate())
    }

    fn evaluate(&mut self) -> FlipOutcome {
        self.move_count += 1;
        let (first, second) = (self.flipped[0], self.flipped[1]);
        let is_match = first.pair == second.pair && first.side != second.side;

        if !is_match {
            tracing::debug!(%first, %second, moves = self.move_count, "mismatch");
            return FlipOutcome::Mismatched;
        }

        let pair = first.pair;
        for card in self.cards.iter_mut().filter(|c| c.id.pair == pair) {
            card.matched = true;
        }
        self.matched_pairs.insert(pair);
        self.score += self.config.points_per_match;
        self.flipped.clear();
        tracing::debug!(%pair, moves = self.move_count, "pair matched");

        if self.matched_pairs.len() < self.words.len() {
            self.phase = MatchPhase::AwaitingFirstFlip;
            return FlipOutcome::Matched(pair);
        }

        self.score += self.config.completion_bonus;
        let result = SessionResult::new(
            GameType::Match,
            self.score,
            self.matched_pairs.len() as u32,
            self.words.len() as u32,
            self.words.iter().map(|w| w.id).collect(),
        );
        self.phase = MatchPhase::Complete;
        self.result = Some(result.clone());
        tracing::info!(
            score = result.score,
            moves = self.move_count,
            "match game complete"
        );
        FlipOutcome::Completed(result)
    }

    /// Turn a mismatched pair face down again.
    pub fn resolve_pending_mismatch(&mut self) -> Result<(), EngineError> {
        if self.phase != MatchPhase::Evaluating {
            return Err(EngineError::invalid_state(
                "resolve a mismatch",
                self.phase,
            ));
        }
        self.flipped.clear();
        self.phase = MatchPhase::AwaitingFirstFlip;
        Ok(())
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == MatchPhase::Complete
    }

    /// The board, in dealt order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Cards currently face up and not yet matched.
    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    /// Whether the card should be shown: flipped this move or already matched.
    pub fn is_face_up(&self, id: CardId) -> bool {
        self.flipped.contains(&id) || self.is_matched(id)
    }

    pub fn is_matched(&self, id: CardId) -> bool {
        self.matched_pairs.contains(&id.pair)
    }

    pub fn pending_mismatch(&self) -> bool {
        self.phase == MatchPhase::Evaluating
    }

    pub fn matched_pairs(&self) -> &BTreeSet<WordId> {
        &self.matched_pairs
    }

    pub fn pair_count(&self) -> usize {
        self.words.len()
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(pairs: usize, seed: u64) -> MatchSession {
        let config = MatchConfig {
            pair_count: pairs,
            ..MatchConfig::default()
        };
        MatchSession::start(
            &WordBank::builtin(),
            config,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn source(pair: WordId) -> CardId {
        CardId {
            pair,
            side: Side::Source,
        }
    }

    fn target(pair: WordId) -> CardId {
        CardId {
            pair,
            side: Side::Target,
        }
    }

    #[test]
    fn deals_two_cards_per_pair() {
        let game = session(6, 1);
        assert_eq!(game.cards().len(), 12);
        for word in game.words() {
            assert!(game.card(source(word.id)).is_some());
            assert!(game.card(target(word.id)).is_some());
        }
        assert_eq!(game.phase(), MatchPhase::AwaitingFirstFlip);
    }

    #[test]
    fn perfect_game_scores_seventy() {
        let mut game = session(6, 4);
        let pairs: Vec<WordId> = game.words().iter().map(|w| w.id).collect();
        let mut last = None;
        for pair in pairs {
            assert_eq!(game.flip(source(pair)).unwrap(), FlipOutcome::Revealed);
            last = Some(game.flip(target(pair)).unwrap());
        }

        let Some(FlipOutcome::Completed(result)) = last else {
            panic!("expected completion, got {last:?}");
        };
        assert_eq!(game.matched_pairs().len(), 6);
        assert_eq!(game.move_count(), 6);
        assert_eq!(game.score(), 70);
        assert_eq!(result.score, 70);
        assert_eq!(result.correct_count, 6);
        assert_eq!(result.total_count, 6);
        assert_eq!(result.game_type, GameType::Match);
        assert!(game.is_complete());
    }

    #[test]
    fn mismatch_waits_for_resolution() {
        let mut game = session(3, 2);
        let ids: Vec<WordId> = game.words().iter().map(|w| w.id).collect();

        game.flip(source(ids[0])).unwrap();
        assert_eq!(
            game.flip(target(ids[1])).unwrap(),
            FlipOutcome::Mismatched
        );
        assert!(game.pending_mismatch());
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.is_face_up(source(ids[0])));

        let err = game.flip(source(ids[2])).unwrap_err();
        assert!(err.is_caller_bug());

        game.resolve_pending_mismatch().unwrap();
        assert!(game.flipped().is_empty());
        assert!(!game.is_face_up(source(ids[0])));
        assert_eq!(game.phase(), MatchPhase::AwaitingFirstFlip);
    }

    #[test]
    fn score_tracks_matches_before_completion() {
        let mut game = session(4, 8);
        let ids: Vec<WordId> = game.words().iter().map(|w| w.id).collect();

        game.flip(target(ids[0])).unwrap();
        assert_eq!(
            game.flip(source(ids[0])).unwrap(),
            FlipOutcome::Matched(ids[0])
        );
        game.flip(source(ids[1])).unwrap();
        game.flip(source(ids[2])).unwrap();
        game.resolve_pending_mismatch().unwrap();
        game.flip(source(ids[1])).unwrap();
        game.flip(target(ids[1])).unwrap();

        assert_eq!(game.score(), 20);
        assert_eq!(game.move_count(), 3);
        assert!(game.result().is_none());
    }

    #[test]
    fn same_card_twice_is_rejected() {
        let mut game = session(2, 3);
        let id = source(game.words()[0].id);
        game.flip(id).unwrap();
        assert!(matches!(
            game.flip(id),
            Err(EngineError::InvalidState { .. })
        ));
        assert_eq!(game.flipped(), &[id]);
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn matched_card_cannot_be_reflipped() {
        let mut game = session(2, 3);
        let pair = game.words()[0].id;
        game.flip(source(pair)).unwrap();
        game.flip(target(pair)).unwrap();
        assert!(game.is_matched(source(pair)));
        assert!(game.is_face_up(target(pair)));
        assert!(game.flip(source(pair)).is_err());
    }

    #[test]
    fn unknown_card_is_reported() {
        let mut game = session(2, 3);
        let err = game.flip(source(WordId(999))).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCard(_)));
    }

    #[test]
    fn resolve_without_mismatch_is_rejected() {
        let mut game = session(2, 3);
        assert!(game.resolve_pending_mismatch().is_err());
    }

    #[test]
    fn card_ids_display_pair_and_side() {
        assert_eq!(source(WordId(4)).to_string(), "4-source");
        assert_eq!(target(WordId(12)).to_string(), "12-target");
    }
}
