pub mod achievements;
pub mod history;
pub mod init;
pub mod matching;
pub mod progress;
pub mod quiz;
pub mod validate;
pub mod words;

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use wordquest_core::config::WordquestConfig;
use wordquest_core::model::{PlayerId, SessionResult};
use wordquest_core::progress::ProgressAggregator;
use wordquest_store::JsonFileStore;

/// Aggregator over the file store in the configured data directory.
pub(crate) fn open_aggregator(config: &WordquestConfig) -> Result<ProgressAggregator> {
    tracing::debug!(data_dir = %config.data_dir.display(), "opening store");
    let store = JsonFileStore::open(&config.data_dir).with_context(|| {
        format!("failed to open data directory {}", config.data_dir.display())
    })?;
    Ok(ProgressAggregator::with_thresholds(
        Arc::new(store),
        config.achievements.clone(),
    ))
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Next non-empty input line, or `None` on EOF or `q`.
pub(crate) fn read_command(input: &mut impl BufRead) -> Result<Option<String>> {
    loop {
        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        return Ok(Some(line.to_string()));
    }
}

/// Fold a finished session and report what changed.
pub(crate) async fn record_result(
    config: &WordquestConfig,
    player: &PlayerId,
    result: &SessionResult,
) -> Result<()> {
    let aggregator = open_aggregator(config)?;
    let outcome = aggregator
        .fold(player, result)
        .await
        .with_context(|| format!("failed to record session for {player}"))?;

    let progress = &outcome.progress;
    println!(
        "Level {} | {} words learned | total score {}",
        progress.level(),
        progress.words_learned.len(),
        progress.total_score
    );
    for achievement in &outcome.newly_unlocked {
        println!(
            "Achievement unlocked: {} ({})",
            achievement.title(),
            aggregator.thresholds().describe(*achievement)
        );
    }
    if let Some(e) = &outcome.persistence_error {
        eprintln!("Warning: progress could not be saved: {e}");
    }
    Ok(())
}
