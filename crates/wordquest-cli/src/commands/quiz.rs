//! The `wordquest quiz` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;

use wordquest_core::config::load_config_from;
use wordquest_core::model::{PlayerId, SessionResult};
use wordquest_core::parser::load_word_bank;
use wordquest_core::quiz::QuizSession;

use super::{make_rng, read_command, record_result};

pub async fn execute(
    player: String,
    questions: Option<usize>,
    tier: Option<u32>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    anyhow::ensure!(questions != Some(0), "questions must be at least 1");

    let bank = Arc::new(load_word_bank(config.word_bank.as_deref())?);
    let mut quiz_config = config.quiz.clone();
    if let Some(n) = questions {
        quiz_config.total_questions = n;
    }
    if tier.is_some() {
        quiz_config.difficulty_tier = tier;
    }

    let mut session = QuizSession::start(bank, quiz_config, make_rng(seed))?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = play(&mut session, &mut stdin.lock(), &mut stdout.lock())?;

    match result {
        Some(result) => record_result(&config, &PlayerId::new(player), &result).await,
        None => {
            println!("Quiz abandoned. Progress was not changed.");
            Ok(())
        }
    }
}

/// Drive a session from line input. Returns `None` if the player quit.
pub(crate) fn play<R: Rng>(
    session: &mut QuizSession<R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<SessionResult>> {
    loop {
        let Some(question) = session.current_question() else {
            return Ok(session.result().cloned());
        };

        writeln!(
            out,
            "\nQuestion {}/{}: what does \"{}\" mean?",
            question.number, question.total, question.word.source
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = read_command(input)? else {
            return Ok(None);
        };
        let answer = match line.parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => question.options[n - 1].clone(),
            _ => line,
        };

        session.submit_answer(&answer)?;
        if let Some(feedback) = session.last_answer() {
            if feedback.is_correct {
                writeln!(out, "Correct!")?;
            } else {
                writeln!(out, "Not quite. The answer was \"{}\".", feedback.correct_answer)?;
            }
        }

        if let Some(result) = session.advance()? {
            writeln!(
                out,
                "\nQuiz complete: {}/{} correct.",
                result.correct_count, result.total_count
            )?;
            return Ok(Some(result));
        }
    }
}
