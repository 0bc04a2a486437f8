use anyhow::{Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::play::{PlayContext, game_ids, run_games};
use crate::app::status::render_config;
use crate::cli::{Cli, Commands};
use crate::config::Config;

/// Fold `play` flags into the loaded config. Provider and model apply to
/// both roles, so per-role overrides are cleared.
fn apply_play_overrides(
    config: &mut Config,
    topics: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
) {
    if let Some(path) = topics {
        config.game.topics_path = path;
    }
    if let Some(provider) = provider {
        config.default_provider = Some(provider);
        config.host.provider = None;
        config.player.provider = None;
    }
    if let Some(model) = model {
        config.default_model = Some(model);
        config.host.model = None;
        config.player.model = None;
    }
}

/// Cancel every game when the user hits Ctrl-C. Games stop at their next
/// node boundary.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping games");
            token.cancel();
        }
    });
    cancel
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Play {
            game_id,
            games,
            topics,
            provider,
            model,
        } => {
            if games == 0 {
                bail!("--games must be at least 1");
            }
            apply_play_overrides(&mut config, topics, provider, model);
            config.validate()?;

            let ctx = PlayContext::from_config(Arc::new(config))?;
            let cancel = cancel_on_ctrl_c();
            let summaries = run_games(&ctx, game_ids(game_id.as_deref(), games), &cancel).await?;

            let won = summaries.iter().filter(|s| s.guessed_correctly()).count();
            info!(games = summaries.len(), won, "all games finished");
            Ok(())
        }
        Commands::Config => {
            println!("{}", render_config(&config));
            Ok(())
        }
    }
}
