//! The `wordquest init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("wordquest.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("word-banks").context("failed to create word-banks directory")?;
    write_if_missing(Path::new("word-banks/example.toml"), EXAMPLE_WORD_BANK)?;

    println!("\nNext steps:");
    println!("  1. Run: wordquest validate --word-bank word-banks/example.toml");
    println!("  2. Point `word_bank` in wordquest.toml at word-banks/ to drill your own words");
    println!("  3. Run: wordquest quiz");

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordquest configuration

data_dir = "./wordquest-data"
history_limit = 10
# word_bank = "./word-banks"

[quiz]
total_questions = 10
difficulty_tier = 1
distractor_pool = 20

[match]
pair_count = 6
difficulty_tier = 1
points_per_match = 10
completion_bonus = 10

[achievements]
first_game_sessions = 1
getting_started_sessions = 5
word_collector_words = 10
star_collector_score = 100
game_master_per_type = 3
level_up_level = 3
"#;

const EXAMPLE_WORD_BANK: &str = r#"[word_bank]
name = "Around the house"
description = "Everyday objects at home"
source_language = "fr"
target_language = "en"

[[words]]
id = 1001
source = "maison"
target = "house"
category = "home"
difficulty = 1

[[words]]
id = 1002
source = "porte"
target = "door"
category = "home"
difficulty = 1

[[words]]
id = 1003
source = "fenêtre"
target = "window"
category = "home"
difficulty = 1

[[words]]
id = 1004
source = "table"
target = "table"
category = "home"
difficulty = 1

[[words]]
id = 1005
source = "chaise"
target = "chair"
category = "home"
difficulty = 1

[[words]]
id = 1006
source = "lit"
target = "bed"
category = "home"
difficulty = 1
"#;
