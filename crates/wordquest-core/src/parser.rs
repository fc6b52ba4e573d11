//! TOML word-bank parser.
//!
//! Loads word catalogs from TOML files and directories, and validates them.
//!
//! ```toml
//! [word_bank]
//! name = "French basics"
//!
//! [[words]]
//! id = 1
//! source = "chat"
//! target = "cat"
//! category = "animals"
//! difficulty = 1
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{WordId, WordPair};
use crate::quiz::OPTION_COUNT;
use crate::word_bank::WordBank;

#[derive(Debug, Deserialize)]
struct TomlWordBankFile {
    #[serde(default)]
    word_bank: Option<TomlWordBankHeader>,
    #[serde(default)]
    words: Vec<TomlWord>,
}

#[derive(Debug, Deserialize)]
struct TomlWordBankHeader {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source_language: Option<String>,
    #[serde(default)]
    target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlWord {
    id: u32,
    source: String,
    target: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default = "default_difficulty")]
    difficulty: u32,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_difficulty() -> u32 {
    1
}

/// A parsed catalog file, before it is checked and turned into a [`WordBank`].
#[derive(Debug, Clone)]
pub struct WordBankFile {
    pub name: String,
    pub description: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub words: Vec<WordPair>,
}

impl WordBankFile {
    /// Build the catalog. Fails on duplicate ids.
    pub fn into_word_bank(self) -> Result<WordBank> {
        let name = self.name;
        WordBank::new(self.words).with_context(|| format!("invalid word bank '{name}'"))
    }
}

/// Parse a single TOML file.
pub fn parse_word_bank(path: &Path) -> Result<WordBankFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read word bank file: {}", path.display()))?;

    parse_word_bank_str(&content, path)
}

/// Parse a TOML string (useful for testing).
pub fn parse_word_bank_str(content: &str, source_path: &Path) -> Result<WordBankFile> {
    let parsed: TomlWordBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let (name, description, source_language, target_language) = match parsed.word_bank {
        Some(h) => (h.name, h.description, h.source_language, h.target_language),
        None => (
            source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            String::new(),
            None,
            None,
        ),
    };

    let words = parsed
        .words
        .into_iter()
        .map(|w| WordPair {
            id: WordId(w.id),
            source: w.source,
            target: w.target,
            category: w.category,
            difficulty: w.difficulty,
        })
        .collect();

    Ok(WordBankFile {
        name,
        description,
        source_language,
        target_language,
        words,
    })
}

/// Recursively load all `.toml` word-bank files from a directory.
pub fn load_word_bank_directory(dir: &Path) -> Result<Vec<WordBankFile>> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            files.extend(load_word_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_word_bank(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(files)
}

/// Load the catalog at `path` (a file or a directory of files), or the
/// built-in catalog when no path is given.
pub fn load_word_bank(path: Option<&Path>) -> Result<WordBank> {
    let Some(path) = path else {
        return Ok(WordBank::builtin());
    };

    if path.is_dir() {
        let words: Vec<WordPair> = load_word_bank_directory(path)?
            .into_iter()
            .flat_map(|f| f.words)
            .collect();
        if words.is_empty() {
            anyhow::bail!("no words found under {}", path.display());
        }
        WordBank::new(words).with_context(|| format!("invalid word banks in {}", path.display()))
    } else {
        parse_word_bank(path)?.into_word_bank()
    }
}

/// A warning from word-bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The word ID (if applicable).
    pub word_id: Option<WordId>,
    /// Warning message.
    pub message: String,
}

/// Validate a word-bank file for common issues.
pub fn validate_word_bank(file: &WordBankFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if file.words.is_empty() {
        warnings.push(ValidationWarning {
            word_id: None,
            message: "word bank has no words".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for word in &file.words {
        if !seen_ids.insert(word.id) {
            warnings.push(ValidationWarning {
                word_id: Some(word.id),
                message: format!("duplicate word ID: {}", word.id),
            });
        }
    }

    for word in &file.words {
        if word.source.trim().is_empty() || word.target.trim().is_empty() {
            warnings.push(ValidationWarning {
                word_id: Some(word.id),
                message: "source or target text is empty".into(),
            });
        }
        if word.difficulty == 0 {
            warnings.push(ValidationWarning {
                word_id: Some(word.id),
                message: "difficulty must be at least 1".into(),
            });
        }
    }

    // Identical targets in one tier make two quiz options indistinguishable.
    let mut targets_by_tier: HashMap<u32, HashSet<String>> = HashMap::new();
    for word in &file.words {
        let target = word.target.trim().to_lowercase();
        if !targets_by_tier
            .entry(word.difficulty)
            .or_default()
            .insert(target)
        {
            warnings.push(ValidationWarning {
                word_id: Some(word.id),
                message: format!(
                    "target '{}' appears more than once in tier {}",
                    word.target, word.difficulty
                ),
            });
        }
    }

    let mut tiers: Vec<_> = targets_by_tier.into_iter().collect();
    tiers.sort_by_key(|(tier, _)| *tier);
    for (tier, targets) in tiers {
        if targets.len() < OPTION_COUNT {
            warnings.push(ValidationWarning {
                word_id: None,
                message: format!(
                    "tier {tier} has {} distinct targets; quizzes will borrow options from other tiers",
                    targets.len()
                ),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[word_bank]
name = "Kitchen"
description = "Things in the kitchen"
source_language = "fr"
target_language = "en"

[[words]]
id = 101
source = "couteau"
target = "knife"
category = "kitchen"
difficulty = 1

[[words]]
id = 102
source = "fourchette"
target = "fork"
category = "kitchen"

[[words]]
id = 103
source = "cuillère"
target = "spoon"
category = "kitchen"

[[words]]
id = 104
source = "assiette"
target = "plate"
"#;

    #[test]
    fn parse_valid_toml() {
        let file = parse_word_bank_str(VALID_TOML, &PathBuf::from("kitchen.toml")).unwrap();
        assert_eq!(file.name, "Kitchen");
        assert_eq!(file.source_language.as_deref(), Some("fr"));
        assert_eq!(file.words.len(), 4);
        assert_eq!(file.words[0].id, WordId(101));
        assert_eq!(file.words[3].category, "general");
        assert_eq!(file.words[3].difficulty, 1);
        assert!(validate_word_bank(&file).is_empty());
    }

    #[test]
    fn header_is_optional() {
        let toml = r#"
[[words]]
id = 1
source = "un"
target = "one"
"#;
        let file = parse_word_bank_str(toml, &PathBuf::from("numbers.toml")).unwrap();
        assert_eq!(file.name, "numbers");
        assert_eq!(file.words.len(), 1);
    }

    #[test]
    fn validate_reports_common_issues() {
        let toml = r#"
[[words]]
id = 1
source = "chat"
target = "cat"

[[words]]
id = 1
source = "chatte"
target = "Cat"

[[words]]
id = 2
source = ""
target = "dog"
difficulty = 0
"#;
        let file = parse_word_bank_str(toml, &PathBuf::from("bad.toml")).unwrap();
        let warnings = validate_word_bank(&file);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("duplicate word ID"));
        assert!(has("empty"));
        assert!(has("at least 1"));
        assert!(has("more than once in tier 1"));
        assert!(has("tier 1 has 1 distinct targets"));
    }

    #[test]
    fn duplicate_ids_fail_to_build() {
        let toml = r#"
[[words]]
id = 7
source = "a"
target = "b"

[[words]]
id = 7
source = "c"
target = "d"
"#;
        let file = parse_word_bank_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        assert!(file.into_word_bank().is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_word_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kitchen.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "[[words]\nid =").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = load_word_bank_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Kitchen");

        let bank = load_word_bank(Some(dir.path())).unwrap();
        assert_eq!(bank.len(), 4);
    }

    #[test]
    fn no_path_means_builtin() {
        assert_eq!(load_word_bank(None).unwrap().len(), 25);
    }
}
