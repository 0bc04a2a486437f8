use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use twentyq::core::game::{
    ActionProposer, EXPECTED_NODE_CYCLE, Proposal, ProposalRequest, Role, SessionLimits,
    TurnUpdate, spawn_game,
};
use twentyq::runtime::observability::ObserverEvent;
use twentyq::GameError;

use super::scripted::{RuleProposer, ScriptedBackend, session};

/// Cancels the game's token the first time the player is asked to move.
struct CancelOnPlayer {
    inner: RuleProposer,
    cancel: CancellationToken,
}

#[async_trait]
impl ActionProposer for CancelOnPlayer {
    async fn propose(&self, request: &ProposalRequest) -> anyhow::Result<Proposal> {
        if request.role == Role::Player {
            self.cancel.cancel();
        }
        self.inner.propose(request).await
    }
}

#[tokio::test]
async fn concurrent_games_keep_their_own_state() {
    let topics = ["kitten", "eagle", "violin", "lighthouse"];
    let mut games = JoinSet::new();

    for (i, topic) in topics.into_iter().enumerate() {
        let (session, observer) = session(
            &format!("game-{i}"),
            Arc::new(RuleProposer::new(i + 1)),
            Arc::new(ScriptedBackend::new(topic, &[topic])),
            SessionLimits::default(),
        );
        let (handle, updates) = spawn_game(session);
        games.spawn(async move {
            let updates: Vec<TurnUpdate> = updates.collect().await;
            let summary = handle.await.unwrap().unwrap();
            (topic, i, summary, updates, observer)
        });
    }

    let mut finished = 0;
    while let Some(joined) = games.join_next().await {
        let (topic, i, summary, updates, observer) = joined.unwrap();
        finished += 1;

        assert_eq!(summary.game_id, format!("game-{i}"));
        assert_eq!(summary.snapshot.topic, topic);
        assert_eq!(summary.snapshot.guess, topic);
        assert_eq!(summary.snapshot.questions_asked as usize, i + 1);
        assert!(summary.anomalies.is_empty());
        assert!(updates.iter().all(|u| u.game_id == summary.game_id));

        let events = observer.events();
        let starts: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::GameStart { game_id } => Some(game_id),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![&summary.game_id]);

        // Nothing from another game reaches this game's observer.
        for other in topics.iter().filter(|t| **t != topic) {
            assert!(events.iter().all(|e| match e {
                ObserverEvent::MessageEmitted { content, .. } => !content.contains(other),
                _ => true,
            }));
        }
    }
    assert_eq!(finished, topics.len());
}

#[tokio::test]
async fn streamed_updates_follow_the_node_cycle() {
    let (session, _) = session(
        "stream",
        Arc::new(RuleProposer::new(2)),
        Arc::new(ScriptedBackend::new("eagle", &["eagle"])),
        SessionLimits::default(),
    );
    let (handle, updates) = spawn_game(session);
    let updates: Vec<TurnUpdate> = updates.collect().await;
    let summary = handle.await.unwrap().unwrap();

    assert_eq!(updates.len() as u32, summary.transitions);
    for (i, update) in updates.iter().enumerate() {
        assert_eq!(update.step as usize, i + 1);
        assert_eq!(update.node, EXPECTED_NODE_CYCLE[i % EXPECTED_NODE_CYCLE.len()]);
        assert!(update.message.is_some());
    }
    assert_eq!(
        updates.last().map(|u| &u.snapshot),
        Some(&summary.snapshot)
    );
}

#[tokio::test]
async fn dropped_stream_does_not_stall_the_game() {
    let (session, _) = session(
        "unobserved",
        Arc::new(RuleProposer::never_guessing()),
        Arc::new(ScriptedBackend::new("violin", &[])),
        SessionLimits::default(),
    );
    let (handle, updates) = spawn_game(session);
    drop(updates);

    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.snapshot.questions_answered, 20);
}

#[tokio::test]
async fn cancellation_stops_at_the_next_node_boundary() {
    let cancel = CancellationToken::new();
    let proposer = Arc::new(CancelOnPlayer {
        inner: RuleProposer::new(3),
        cancel: cancel.clone(),
    });
    let (session, observer) = session(
        "cancelled",
        proposer,
        Arc::new(ScriptedBackend::new("kitten", &[])),
        SessionLimits::default(),
    );

    let err = session.with_cancellation(cancel).run().await.unwrap_err();
    assert!(matches!(err, GameError::Cancelled));

    // Host proposes, tool runs, host speaks, then the player's turn finishes
    // before the token is seen.
    assert!(matches!(
        observer.events().last(),
        Some(ObserverEvent::GameEnd { outcome, transitions: 4, .. }) if outcome == "aborted"
    ));
}
