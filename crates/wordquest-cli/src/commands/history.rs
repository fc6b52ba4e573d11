//! The `wordquest history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquest_core::config::load_config_from;
use wordquest_core::model::PlayerId;

use super::open_aggregator;

pub async fn execute(
    player: String,
    limit: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let aggregator = open_aggregator(&config)?;
    let player = PlayerId::new(player);

    let limit = limit.unwrap_or(config.history_limit);
    let history = aggregator.history(&player, Some(limit)).await?;

    if history.is_empty() {
        println!("No sessions recorded for {player} yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Completed", "Game", "Score", "Correct", "Words"]);
    for session in &history {
        table.add_row(vec![
            Cell::new(session.completed_at.format("%Y-%m-%d %H:%M")),
            Cell::new(session.game_type),
            Cell::new(session.score),
            Cell::new(format!("{}/{}", session.correct_count, session.total_count)),
            Cell::new(session.learned_word_ids.len()),
        ]);
    }

    println!("{table}");
    Ok(())
}
