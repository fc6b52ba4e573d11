//! The `wordquest achievements` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquest_core::config::load_config_from;
use wordquest_core::model::{Achievement, PlayerId};

use super::open_aggregator;

pub async fn execute(player: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let aggregator = open_aggregator(&config)?;
    let player = PlayerId::new(player);

    let unlocked = aggregator.achievements(&player).await?;

    let mut table = Table::new();
    table.set_header(vec!["Achievement", "Goal", "Status"]);
    for achievement in Achievement::ALL {
        let status = if unlocked.contains(&achievement) {
            "unlocked"
        } else {
            "locked"
        };
        table.add_row(vec![
            Cell::new(achievement.title()),
            Cell::new(aggregator.thresholds().describe(achievement)),
            Cell::new(status),
        ]);
    }

    println!("{table}");
    println!("{}/{} unlocked", unlocked.len(), Achievement::ALL.len());
    Ok(())
}
