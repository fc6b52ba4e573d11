//! The `wordquest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use wordquest_core::parser::{load_word_bank_directory, parse_word_bank, validate_word_bank};

pub fn execute(word_bank_path: PathBuf) -> Result<()> {
    let files = if word_bank_path.is_dir() {
        load_word_bank_directory(&word_bank_path)?
    } else {
        vec![parse_word_bank(&word_bank_path)?]
    };

    let mut total_warnings = 0;

    for file in &files {
        println!("Word bank: {} ({} words)", file.name, file.words.len());

        let warnings = validate_word_bank(file);
        for w in &warnings {
            let prefix = w
                .word_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All word banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
