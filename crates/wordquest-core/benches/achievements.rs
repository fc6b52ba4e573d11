use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wordquest_core::achievements::evaluate;
use wordquest_core::model::{GameType, PlayerId, Progress, SessionResult, WordId};
use wordquest_core::statistics::compute_history_stats;

fn make_history(sessions: usize) -> Vec<SessionResult> {
    (0..sessions)
        .map(|i| {
            let game_type = if i % 2 == 0 { GameType::Quiz } else { GameType::Match };
            let words: BTreeSet<WordId> = (0..6).map(|w| WordId((i * 6 + w) as u32)).collect();
            SessionResult::new(game_type, 7, 6, 10, words)
        })
        .collect()
}

fn make_progress(history: &[SessionResult]) -> Progress {
    let mut progress = Progress::new(PlayerId::new("bench"));
    for session in history {
        progress.total_score += u64::from(session.score);
        progress.words_learned.extend(session.learned_word_ids.iter().copied());
    }
    progress
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for sessions in [0usize, 10, 1_000] {
        let history = make_history(sessions);
        let progress = make_progress(&history);
        group.bench_function(format!("sessions={sessions}"), |b| {
            b.iter(|| evaluate(black_box(&progress), black_box(&history)))
        });
    }

    group.finish();
}

fn bench_history_stats(c: &mut Criterion) {
    let history = make_history(1_000);
    c.bench_function("history_stats/1000", |b| {
        b.iter(|| compute_history_stats(black_box(&history)))
    });
}

criterion_group!(benches, bench_evaluate, bench_history_stats);
criterion_main!(benches);
