//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementThresholds;
use crate::matching::MatchConfig;
use crate::quiz::QuizConfig;

/// Top-level wordquest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordquestConfig {
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default, rename = "match")]
    pub match_: MatchConfig,
    #[serde(default)]
    pub achievements: AchievementThresholds,
    /// Where progress and session history are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// A word-bank file or directory. The built-in catalog is used when unset.
    #[serde(default)]
    pub word_bank: Option<PathBuf>,
    /// How many recent sessions `history` shows by default.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./wordquest-data")
}
fn default_history_limit() -> usize {
    10
}

impl Default for WordquestConfig {
    fn default() -> Self {
        Self {
            quiz: QuizConfig::default(),
            match_: MatchConfig::default(),
            achievements: AchievementThresholds::default(),
            data_dir: default_data_dir(),
            word_bank: None,
            history_limit: default_history_limit(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordquest.toml` in the current directory
/// 2. `~/.config/wordquest/config.toml`
///
/// Environment variable overrides: `WORDQUEST_DATA_DIR`, `WORDQUEST_WORD_BANK`.
pub fn load_config() -> Result<WordquestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordquestConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("wordquest.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordquestConfig::default(),
    };

    Ok(finish(config, |name| std::env::var(name).ok()))
}

/// Parse a TOML config document. Missing keys take their defaults.
pub fn parse_config_str(content: &str) -> Result<WordquestConfig> {
    Ok(toml::from_str(content)?)
}

fn finish(
    mut config: WordquestConfig,
    env: impl Fn(&str) -> Option<String>,
) -> WordquestConfig {
    if let Some(dir) = env("WORDQUEST_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(bank) = env("WORDQUEST_WORD_BANK") {
        config.word_bank = Some(PathBuf::from(bank));
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.word_bank = config.word_bank.as_deref().map(resolve_path);
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordquest"))
}
