use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::agents::{LlmActionBackend, LlmProposer, RoleModels};
use crate::core::game::{
    ActionBackend, ActionProposer, Author, GameSession, GameSummary, SessionLimits, TurnUpdate,
    new_game_id, spawn_game,
};
use crate::core::topics::ReferenceTopics;
use crate::prompt::PromptBook;
use crate::runtime::observability::create_observer;

/// Everything the games of one run share. Each game still gets its own
/// state and observer.
pub struct PlayContext {
    pub config: Arc<Config>,
    pub proposer: Arc<dyn ActionProposer>,
    pub backend: Arc<dyn ActionBackend>,
    pub topics: Arc<ReferenceTopics>,
}

impl PlayContext {
    /// Load the topic list and resolve both role models. Any failure here is
    /// fatal before a game starts.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let topics = ReferenceTopics::load(&config.game.topics_path)?;
        topics.ensure_at_least(config.game.topic_sample_size)?;
        info!(
            path = %config.game.topics_path.display(),
            count = topics.len(),
            "reference topics loaded"
        );

        let prompts = Arc::new(PromptBook::new()?);
        let models = RoleModels::from_config(&config)?;
        Ok(Self {
            proposer: Arc::new(LlmProposer::new(models.clone(), Arc::clone(&prompts))),
            backend: Arc::new(LlmActionBackend::new(models, prompts)),
            topics: Arc::new(topics),
            config,
        })
    }
}

/// Ids for `count` games: the requested id (suffixed when there are several)
/// or fresh ones.
pub fn game_ids(requested: Option<&str>, count: usize) -> Vec<String> {
    match requested {
        Some(id) if count == 1 => vec![id.to_string()],
        Some(id) => (1..=count).map(|i| format!("{id}-{i}")).collect(),
        None => (0..count).map(|_| new_game_id()).collect(),
    }
}

/// The printable line for an update, if it carries a role's message.
pub fn render_update(update: &TurnUpdate, with_game_id: bool) -> Option<String> {
    let message = update.message.as_ref()?;
    let speaker = match message.author {
        Author::Host => "Host",
        Author::Player => "Player",
        Author::System | Author::Tool(_) => return None,
    };
    if with_game_id {
        Some(format!("[{}] {speaker}: {}", update.game_id, message.content))
    } else {
        Some(format!("{speaker}: {}", message.content))
    }
}

fn render_summary(summary: &GameSummary) -> String {
    format!(
        "Game {} ended ({}) after {} questions and {} transitions",
        summary.game_id,
        summary.end_reason,
        summary.snapshot.questions_asked,
        summary.transitions
    )
}

/// Run `ids.len()` isolated games concurrently and print their conversations.
pub async fn run_games(
    ctx: &PlayContext,
    ids: Vec<String>,
    cancel: &CancellationToken,
) -> Result<Vec<GameSummary>> {
    let total = ids.len();
    let tag_lines = total > 1;
    let limits = SessionLimits::from(&ctx.config.game);
    let mut games = JoinSet::new();

    for game_id in ids {
        let observer = create_observer(&ctx.config.observability, &game_id);
        let session = GameSession::new(
            game_id,
            Arc::clone(&ctx.proposer),
            Arc::clone(&ctx.backend),
            Arc::clone(&ctx.topics),
            observer,
            limits,
        )
        .with_cancellation(cancel.child_token());

        let (handle, mut updates) = spawn_game(session);
        games.spawn(async move {
            while let Some(update) = updates.next().await {
                if let Some(line) = render_update(&update, tag_lines) {
                    println!("{line}");
                }
            }
            handle.await.context("game task panicked")
        });
    }

    let mut summaries = Vec::with_capacity(total);
    let mut failures = 0usize;
    while let Some(joined) = games.join_next().await {
        match joined.context("game printer panicked")? {
            Ok(Ok(summary)) => {
                println!("{}", render_summary(&summary));
                if !summary.anomalies.is_empty() {
                    warn!(
                        game_id = %summary.game_id,
                        anomalies = summary.anomalies.len(),
                        "node order deviated from the expected cycle"
                    );
                }
                summaries.push(summary);
            }
            Ok(Err(e)) => {
                failures += 1;
                error!(error = %e, "game failed");
            }
            Err(e) => {
                failures += 1;
                error!(error = %e, "game task failed");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {total} games failed");
    }
    Ok(summaries)
}
