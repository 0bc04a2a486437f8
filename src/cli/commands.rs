use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `twentyq` - two language models playing 20 Questions.
#[derive(Parser, Debug)]
#[command(name = "twentyq")]
#[command(version = "0.1.0")]
#[command(about = "Two language-model roles playing 20 Questions.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one or more games and stream the conversation
    Play {
        /// Identifier for the game (generated when omitted)
        #[arg(long)]
        game_id: Option<String>,

        /// Number of isolated games to run concurrently
        #[arg(short = 'n', long, default_value_t = 1)]
        games: usize,

        /// Reference topics CSV (overrides game.topics_path)
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Provider for both roles (openai, openrouter, ollama, custom:<url>)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model for both roles
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the resolved configuration
    Config,
}
