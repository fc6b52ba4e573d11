//! The `wordquest words` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquest_core::config::load_config_from;
use wordquest_core::parser::load_word_bank;

pub fn execute(
    tier: Option<u32>,
    category: Option<String>,
    word_bank: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_word_bank(word_bank.as_deref().or(config.word_bank.as_deref()))?;

    let words: Vec<_> = bank
        .words()
        .iter()
        .filter(|w| tier.map_or(true, |t| w.difficulty == t))
        .filter(|w| {
            category
                .as_deref()
                .map_or(true, |c| w.category.eq_ignore_ascii_case(c))
        })
        .collect();

    if words.is_empty() {
        println!("No words match.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Word", "Translation", "Category", "Tier"]);
    for word in &words {
        table.add_row(vec![
            Cell::new(word.id),
            Cell::new(&word.source),
            Cell::new(&word.target),
            Cell::new(&word.category),
            Cell::new(word.difficulty),
        ]);
    }

    println!("{table}");
    println!(
        "{} of {} words ({} categories)",
        words.len(),
        bank.len(),
        bank.categories().len()
    );
    Ok(())
}
