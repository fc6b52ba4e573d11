//! Multiple-choice quiz session.
//!
//! The session walks through a fixed list of sampled words. For each word
//! it offers four options, exactly one of which is the word's target text.
//! Feedback pacing belongs to the caller: after `submit_answer` the session
//! sits in `Revealing` until `advance` is called.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{GameType, SessionResult, WordPair};
use crate::word_bank::WordBank;

/// Options shown per question.
pub const OPTION_COUNT: usize = 4;

/// Settings for a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions per session.
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    /// Restrict sampling to this tier. `None` samples the whole catalog.
    #[serde(default = "default_tier")]
    pub difficulty_tier: Option<u32>,
    /// Size of the random sample wrong options are drawn from.
    #[serde(default = "default_distractor_pool")]
    pub distractor_pool: usize,
}

fn default_total_questions() -> usize {
    10
}
fn default_tier() -> Option<u32> {
    Some(1)
}
fn default_distractor_pool() -> usize {
    20
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            difficulty_tier: default_tier(),
            distractor_pool: default_distractor_pool(),
        }
    }
}

/// Where a quiz session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Initializing,
    AwaitingAnswer,
    Revealing,
    Complete,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizPhase::Initializing => write!(f, "initializing"),
            QuizPhase::AwaitingAnswer => write!(f, "awaiting an answer"),
            QuizPhase::Revealing => write!(f, "revealing an answer"),
            QuizPhase::Complete => write!(f, "complete"),
        }
    }
}

/// Read-only view of the current question.
#[derive(Debug, Clone, Copy)]
pub struct Question<'a> {
    /// 1-based question number.
    pub number: usize,
    pub total: usize,
    pub word: &'a WordPair,
    pub options: &'a [String],
}

/// What the player picked for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// One quiz play-through.
pub struct QuizSession<R = StdRng> {
    bank: Arc<WordBank>,
    rng: R,
    config: QuizConfig,
    words: Vec<WordPair>,
    index: usize,
    options: Vec<String>,
    answer: Option<AnswerFeedback>,
    score: u32,
    phase: QuizPhase,
    result: Option<SessionResult>,
}

impl<R: Rng> QuizSession<R> {
    /// Sample the questions and prepare the first option set.
    ///
    /// If the tier holds fewer words than requested the session is shorter;
    /// an empty tier is an error.
    pub fn start(bank: Arc<WordBank>, config: QuizConfig, mut rng: R) -> Result<Self, EngineError> {
        let words = bank.sample(config.total_questions, config.difficulty_tier, &mut rng);
        if words.is_empty() {
            return Err(EngineError::EmptyPool(format!(
                "start a quiz at tier {:?}",
                config.difficulty_tier
            )));
        }

        let mut session = Self {
            bank,
            rng,
            config,
            words,
            index: 0,
            options: Vec::new(),
            answer: None,
            score: 0,
            phase: QuizPhase::Initializing,
            result: None,
        };
        session.options = build_options(
            &session.bank,
            &session.words[0],
            session.config.distractor_pool,
            &mut session.rng,
        )?;
        session.phase = QuizPhase::AwaitingAnswer;
        tracing::debug!(questions = session.words.len(), "quiz started");
        Ok(session)
    }

    /// Record the player's answer for the current question.
    ///
    /// Returns whether the answer was correct. Any text is accepted; only
    /// an exact match with the target text scores.
    pub fn submit_answer(&mut self, option: &str) -> Result<bool, EngineError> {
        if self.phase != QuizPhase::AwaitingAnswer || self.answer.is_some() {
            return Err(EngineError::invalid_state("submit an answer", self.phase));
        }

        let word = &self.words[self.index];
        let is_correct = option == word.target;
        if is_correct {
            self.score += 1;
        }
        self.answer = Some(AnswerFeedback {
            selected: option.to_string(),
            correct_answer: word.target.clone(),
            is_correct,
        });
        self.phase = QuizPhase::Revealing;
        tracing::debug!(question = self.index + 1, is_correct, "answer recorded");
        Ok(is_correct)
    }

    /// Move past the revealed answer.
    ///
    /// Returns the session result when the last question has been answered,
    /// `None` otherwise.
    pub fn advance(&mut self) -> Result<Option<SessionResult>, EngineError> {
        if self.phase != QuizPhase::Revealing {
            return Err(EngineError::invalid_state("advance", self.phase));
        }

        let next = self.index + 1;
        if next < self.words.len() {
            let options = build_options(
                &self.bank,
                &self.words[next],
                self.config.distractor_pool,
                &mut self.rng,
            )?;
            self.index = next;
            self.options = options;
            self.answer = None;
            self.phase = QuizPhase::AwaitingAnswer;
            return Ok(None);
        }

        let result = SessionResult::new(
            GameType::Quiz,
            self.score,
            self.score,
            self.words.len() as u32,
            self.words.iter().map(|w| w.id).collect::<BTreeSet<_>>(),
        );
        self.phase = QuizPhase::Complete;
        self.result = Some(result.clone());
        tracing::info!(
            score = result.score,
            total = result.total_count,
            "quiz complete"
        );
        Ok(Some(result))
    }
}

impl<R> QuizSession<R> {
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Complete
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of questions actually sampled.
    pub fn total_questions(&self) -> usize {
        self.words.len()
    }

    /// The sampled words, in question order.
    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    /// The question on screen, or `None` once complete.
    pub fn current_question(&self) -> Option<Question<'_>> {
        if self.is_complete() {
            return None;
        }
        Some(Question {
            number: self.index + 1,
            total: self.words.len(),
            word: &self.words[self.index],
            options: &self.options,
        })
    }

    /// Feedback for the current question, once answered.
    pub fn last_answer(&self) -> Option<&AnswerFeedback> {
        self.answer.as_ref()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}

/// Correct target text plus three distinct wrong ones, shuffled.
///
/// Wrong options come from a random sample of the word's own tier. Small
/// tiers fall back to the full tier, then to the whole catalog.
fn build_options<R: Rng + ?Sized>(
    bank: &WordBank,
    word: &WordPair,
    pool_size: usize,
    rng: &mut R,
) -> Result<Vec<String>, EngineError> {
    let wanted = OPTION_COUNT - 1;
    let mut wrong: Vec<String> = Vec::with_capacity(wanted);

    let pools = [
        (pool_size, Some(word.difficulty)),
        (bank.len(), Some(word.difficulty)),
        (bank.len(), None),
    ];
    for (count, tier) in pools {
        if wrong.len() == wanted {
            break;
        }
        for candidate in bank.sample(count, tier, rng) {
            if candidate.id == word.id
                || candidate.target == word.target
                || wrong.contains(&candidate.target)
            {
                continue;
            }
            wrong.push(candidate.target);
            if wrong.len() == wanted {
                break;
            }
        }
    }

    if wrong.len() < wanted {
        return Err(EngineError::EmptyPool(format!(
            "build {OPTION_COUNT} distinct options for word {}",
            word.id
        )));
    }

    let mut options = wrong;
    options.push(word.target.clone());
    options.shuffle(rng);
    Ok(options)
}
