//! wordquest CLI — vocabulary drills in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wordquest", version, about = "Vocabulary quizzes and memory-match drills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a multiple-choice quiz
    Quiz {
        /// Player whose progress the session counts towards
        #[arg(long, default_value = "default")]
        player: String,

        /// Number of questions
        #[arg(long)]
        questions: Option<usize>,

        /// Difficulty tier to draw words from
        #[arg(long)]
        tier: Option<u32>,

        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Play a memory-match game
    Match {
        /// Player whose progress the session counts towards
        #[arg(long, default_value = "default")]
        player: String,

        /// Number of word pairs on the board
        #[arg(long)]
        pairs: Option<usize>,

        /// Difficulty tier to draw words from
        #[arg(long)]
        tier: Option<u32>,

        /// Seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a player's level and totals
    Progress {
        #[arg(long, default_value = "default")]
        player: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recent sessions, most recent first
    History {
        #[arg(long, default_value = "default")]
        player: String,

        /// Max sessions to show (default: history_limit from config)
        #[arg(long)]
        limit: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show unlocked and locked achievements
    Achievements {
        #[arg(long, default_value = "default")]
        player: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the words in the catalog
    Words {
        /// Only words of this difficulty tier
        #[arg(long)]
        tier: Option<u32>,

        /// Only words of this category
        #[arg(long)]
        category: Option<String>,

        /// Word-bank file or directory (default: built-in catalog)
        #[arg(long)]
        word_bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate word-bank TOML files
    Validate {
        /// Path to word-bank file or directory
        #[arg(long)]
        word_bank: PathBuf,
    },

    /// Create starter config and example word bank
    Init,
}

#[tokio::main]
async fn main() {
    let directive: tracing_subscriber::filter::Directive = match "wordquest=info".parse() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Error: invalid log directive: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quiz {
            player,
            questions,
            tier,
            seed,
            config,
        } => commands::quiz::execute(player, questions, tier, seed, config).await,
        Commands::Match {
            player,
            pairs,
            tier,
            seed,
            config,
        } => commands::matching::execute(player, pairs, tier, seed, config).await,
        Commands::Progress { player, config } => commands::progress::execute(player, config).await,
        Commands::History {
            player,
            limit,
            config,
        } => commands::history::execute(player, limit, config).await,
        Commands::Achievements { player, config } => {
            commands::achievements::execute(player, config).await
        }
        Commands::Words {
            tier,
            category,
            word_bank,
            config,
        } => commands::words::execute(tier, category, word_bank, config),
        Commands::Validate { word_bank } => commands::validate::execute(word_bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
