//! The `wordquest progress` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquest_core::config::load_config_from;
use wordquest_core::model::PlayerId;
use wordquest_core::statistics::compute_history_stats;

use super::open_aggregator;

pub async fn execute(player: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let aggregator = open_aggregator(&config)?;
    let player = PlayerId::new(player);

    let progress = aggregator.get_progress(&player).await?;
    let history = aggregator.history(&player, None).await?;
    let stats = compute_history_stats(&history);

    let best = |score: Option<u32>| score.map_or_else(|| "-".to_string(), |s| s.to_string());

    let mut table = Table::new();
    table.set_header(vec!["Player", player.as_str()]);
    let rows = [
        ("Level", progress.level().to_string()),
        (
            "Next level",
            format!(
                "{}% ({} words to go)",
                progress.level_progress_percent(),
                progress.words_to_next_level()
            ),
        ),
        ("Words learned", progress.words_learned.len().to_string()),
        ("Total score", progress.total_score.to_string()),
        ("Achievements", progress.achievements.len().to_string()),
        ("Games played", stats.total_games.to_string()),
        ("Quiz games", stats.quiz_games.to_string()),
        ("Match games", stats.match_games.to_string()),
        ("Average score", stats.average_score.to_string()),
        ("Best quiz score", best(stats.best_quiz_score)),
        ("Best match score", best(stats.best_match_score)),
        ("Accuracy", format!("{:.1}%", stats.accuracy * 100.0)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }

    println!("{table}");
    Ok(())
}
