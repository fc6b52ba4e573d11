//! The word bank: an immutable catalog of word pairs with pure sampling.

use std::collections::{BTreeSet, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::EngineError;
use crate::model::{WordId, WordPair};

/// Immutable catalog of word pairs, indexed by id.
///
/// Load it once at startup and share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<WordPair>,
    index: HashMap<WordId, usize>,
}

impl WordBank {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(words: Vec<WordPair>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if index.insert(word.id, i).is_some() {
                return Err(EngineError::DuplicateWordId(word.id));
            }
        }
        Ok(Self { words, index })
    }

    /// The French/English starter catalog.
    pub fn builtin() -> Self {
        let words: Vec<WordPair> = BUILTIN_WORDS
            .iter()
            .map(|&(id, source, target, category, difficulty)| WordPair {
                id: WordId(id),
                source: source.to_string(),
                target: target.to_string(),
                category: category.to_string(),
                difficulty,
            })
            .collect();
        let index = words.iter().enumerate().map(|(i, w)| (w.id, i)).collect();
        Self { words, index }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All entries in catalog order.
    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    pub fn by_id(&self, id: WordId) -> Result<&WordPair, EngineError> {
        self.index
            .get(&id)
            .map(|&i| &self.words[i])
            .ok_or(EngineError::NotFound(id))
    }

    pub fn by_difficulty(&self, tier: u32) -> Vec<&WordPair> {
        self.words.iter().filter(|w| w.difficulty == tier).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&WordPair> {
        self.words
            .iter()
            .filter(|w| w.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct difficulty tiers, ascending.
    pub fn tiers(&self) -> Vec<u32> {
        self.words
            .iter()
            .map(|w| w.difficulty)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// A uniformly random permutation of the eligible pool, truncated to
    /// `min(count, pool size)`.
    ///
    /// With a `tier`, only entries of that tier are eligible. Asking for more
    /// words than exist is not an error: the whole pool is returned.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        tier: Option<u32>,
        rng: &mut R,
    ) -> Vec<WordPair> {
        let mut pool: Vec<&WordPair> = match tier {
            Some(t) => self.by_difficulty(t),
            None => self.words.iter().collect(),
        };
        if count > pool.len() {
            tracing::debug!(
                requested = count,
                available = pool.len(),
                ?tier,
                "word pool smaller than requested sample"
            );
        }
        pool.shuffle(rng);
        pool.into_iter().take(count).cloned().collect()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_WORDS: &[(u32, &str, &str, &str, u32)] = &[
    (1, "chat", "cat", "animals", 1),
    (2, "chien", "dog", "animals", 1),
    (3, "oiseau", "bird", "animals", 1),
    (4, "poisson", "fish", "animals", 1),
    (5, "lapin", "rabbit", "animals", 1),
    (6, "rouge", "red", "colors", 1),
    (7, "bleu", "blue", "colors", 1),
    (8, "vert", "green", "colors", 1),
    (9, "jaune", "yellow", "colors", 1),
    (10, "noir", "black", "colors", 1),
    (11, "un", "one", "numbers", 1),
    (12, "deux", "two", "numbers", 1),
    (13, "trois", "three", "numbers", 1),
    (14, "quatre", "four", "numbers", 1),
    (15, "cinq", "five", "numbers", 1),
    (16, "pomme", "apple", "food", 2),
    (17, "pain", "bread", "food", 2),
    (18, "eau", "water", "food", 2),
    (19, "lait", "milk", "food", 2),
    (20, "fromage", "cheese", "food", 2),
    (21, "maman", "mom", "family", 2),
    (22, "papa", "dad", "family", 2),
    (23, "frère", "brother", "family", 2),
    (24, "sœur", "sister", "family", 2),
    (25, "grand-mère", "grandmother", "family", 2),
];
