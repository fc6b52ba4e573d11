//! The `wordquest match` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use wordquest_core::config::load_config_from;
use wordquest_core::matching::{FlipOutcome, MatchSession};
use wordquest_core::model::{PlayerId, SessionResult};
use wordquest_core::parser::load_word_bank;

use super::{make_rng, read_command, record_result};

pub async fn execute(
    player: String,
    pairs: Option<usize>,
    tier: Option<u32>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    anyhow::ensure!(pairs != Some(0), "pairs must be at least 1");

    let bank = load_word_bank(config.word_bank.as_deref())?;
    let mut match_config = config.match_.clone();
    if let Some(n) = pairs {
        match_config.pair_count = n;
    }
    if tier.is_some() {
        match_config.difficulty_tier = tier;
    }

    let mut rng = make_rng(seed);
    let mut session = MatchSession::start(&bank, match_config, &mut rng)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = play(&mut session, &mut stdin.lock(), &mut stdout.lock())?;

    match result {
        Some(result) => record_result(&config, &PlayerId::new(player), &result).await,
        None => {
            println!("Game abandoned. Progress was not changed.");
            Ok(())
        }
    }
}

fn print_board(session: &MatchSession, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "\nPairs {}/{} | moves {} | score {}",
        session.matched_pairs().len(),
        session.pair_count(),
        session.move_count(),
        session.score()
    )?;
    for (i, card) in session.cards().iter().enumerate() {
        let face = if card.matched {
            format!("[{}] ✓", card.text)
        } else if session.is_face_up(card.id) {
            format!("[{}]", card.text)
        } else {
            "[ ? ]".to_string()
        };
        writeln!(out, "  {:>2}) {}", i + 1, face)?;
    }
    Ok(())
}

/// Drive a session from line input. Returns `None` if the player quit.
pub(crate) fn play(
    session: &mut MatchSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<SessionResult>> {
    print_board(session, out)?;
    loop {
        write!(out, "Flip a card (1-{}): ", session.cards().len())?;
        out.flush()?;

        let Some(line) = read_command(input)? else {
            return Ok(None);
        };
        let card_id = match line.parse::<usize>() {
            Ok(n) if (1..=session.cards().len()).contains(&n) => session.cards()[n - 1].id,
            _ => {
                writeln!(out, "Pick a card between 1 and {}.", session.cards().len())?;
                continue;
            }
        };

        let outcome = match session.flip(card_id) {
            Ok(outcome) => outcome,
            Err(e) if e.is_caller_bug() => {
                writeln!(out, "Can't flip that card: {e}")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match outcome {
            FlipOutcome::Revealed => print_board(session, out)?,
            FlipOutcome::Matched(_) => {
                print_board(session, out)?;
                writeln!(out, "Match!")?;
            }
            FlipOutcome::Mismatched => {
                print_board(session, out)?;
                writeln!(out, "No match.")?;
                session.resolve_pending_mismatch()?;
            }
            FlipOutcome::Completed(result) => {
                writeln!(
                    out,
                    "\nAll {} pairs matched in {} moves. Score: {}",
                    session.pair_count(),
                    session.move_count(),
                    result.score
                )?;
                return Ok(Some(result));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;
    use wordquest_core::matching::MatchConfig;
    use wordquest_core::model::{Side, WordId};
    use wordquest_core::word_bank::WordBank;

    fn session(pairs: usize) -> MatchSession {
        let config = MatchConfig {
            pair_count: pairs,
            ..MatchConfig::default()
        };
        MatchSession::start(&WordBank::builtin(), config, &mut StdRng::seed_from_u64(3)).unwrap()
    }

    /// Card numbers that match every pair on the first try.
    fn perfect_input(session: &MatchSession) -> String {
        let position = |pair: WordId, side: Side| {
            session
                .cards()
                .iter()
                .position(|c| c.pair_id() == pair && c.side() == side)
                .unwrap()
                + 1
        };
        session
            .words()
            .iter()
            .map(|w| {
                format!(
                    "{}\n{}\n",
                    position(w.id, Side::Source),
                    position(w.id, Side::Target)
                )
            })
            .collect()
    }

    #[test]
    fn perfect_game_completes() {
        let mut game = session(3);
        let input = perfect_input(&game);
        let mut out = Vec::new();
        let result = play(&mut game, &mut Cursor::new(input), &mut out)
            .unwrap()
            .unwrap();
        assert_eq!(result.score, 40);
        assert_eq!(game.move_count(), 3);
        assert!(String::from_utf8(out).unwrap().contains("All 3 pairs matched"));
    }

    #[test]
    fn bad_input_is_reported_and_play_continues() {
        let mut game = session(2);
        let perfect = perfect_input(&game);
        let first = perfect.lines().next().unwrap();
        let input = format!("banana\n99\n{first}\n{perfect}");
        let mut out = Vec::new();
        let result = play(&mut game, &mut Cursor::new(input), &mut out).unwrap();
        assert!(result.is_some());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Pick a card between 1 and 4"));
        assert!(text.contains("Can't flip that card"));
    }

    #[test]
    fn eof_abandons() {
        let mut game = session(2);
        let mut out = Vec::new();
        assert!(play(&mut game, &mut Cursor::new("1\n"), &mut out)
            .unwrap()
            .is_none());
        assert!(!game.is_complete());
    }
}
