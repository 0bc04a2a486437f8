use std::sync::Arc;

use twentyq::core::game::executor::WRONG_GUESS_REPLY;
use twentyq::core::game::session::REDACTED_TOPIC;
use twentyq::core::game::{
    ActionKind, Author, EndReason, Message, Proposal, Role, SessionLimits, TOPIC_HANDSHAKE,
};
use twentyq::runtime::observability::{ObserverEvent, ObserverMetric};
use twentyq::GameError;

use super::scripted::{RuleProposer, ScriptedBackend, ScriptedProposer, session};

#[tokio::test]
async fn full_game_ends_when_player_names_the_topic() {
    let proposer = Arc::new(RuleProposer::new(3));
    let backend = Arc::new(ScriptedBackend::new("kitten", &["Kitten"]));
    let (session, observer) = session(
        "full-game",
        proposer.clone(),
        backend.clone(),
        SessionLimits::default(),
    );

    let summary = session.run().await.unwrap();

    assert_eq!(summary.end_reason, EndReason::GuessedCorrectly);
    assert!(summary.guessed_correctly());
    assert_eq!(summary.snapshot.topic, "kitten");
    assert_eq!(summary.snapshot.guess, "Kitten");
    assert_eq!(summary.snapshot.questions_asked, 3);
    assert_eq!(summary.snapshot.questions_answered, 3);
    assert_eq!(summary.transitions, 24);
    assert!(summary.anomalies.is_empty());
    assert_eq!(backend.answered().len(), 3);

    let events = observer.events();
    assert!(matches!(
        events.first(),
        Some(ObserverEvent::GameStart { game_id }) if game_id == "full-game"
    ));
    assert!(matches!(
        events.last(),
        Some(ObserverEvent::GameEnd { outcome, transitions: 24, .. }) if outcome == "guessed_correctly"
    ));
    assert!(
        observer
            .metrics()
            .iter()
            .any(|m| matches!(m, ObserverMetric::TokensUsed { role: Role::Player, tokens: 10 }))
    );
}

#[tokio::test]
async fn topic_stays_out_of_the_shared_conversation() {
    let proposer = Arc::new(RuleProposer::new(4));
    let backend = Arc::new(ScriptedBackend::new("kitten", &["kitten"]));
    let (session, _) = session(
        "secret",
        proposer.clone(),
        backend,
        SessionLimits::default(),
    );

    let summary = session.run().await.unwrap();
    let (guess, earlier) = summary.transcript.split_last().unwrap();
    assert_eq!(guess, &Message::from_role(Role::Player, "kitten"));
    // The guess itself is the only place the topic may appear.
    for message in earlier
        .iter()
        .filter(|m| m.author != Author::Tool(ActionKind::MakeGuess))
    {
        assert!(
            !message.content.to_lowercase().contains("kitten"),
            "topic leaked in {message:?}"
        );
    }

    let topic_result = summary
        .transcript
        .iter()
        .find(|m| m.author == Author::Tool(ActionKind::GenerateTopic))
        .unwrap();
    assert_eq!(topic_result.content, REDACTED_TOPIC);
    assert!(
        summary
            .transcript
            .iter()
            .any(|m| m.author == Author::Host && m.content == TOPIC_HANDSHAKE)
    );

    for request in proposer.requests() {
        match request.role {
            Role::Player => {
                assert!(request.host_context.is_none());
                assert!(
                    request
                        .history
                        .iter()
                        .all(|entry| !entry.content.contains("kitten"))
                );
            }
            Role::Host => assert!(request.host_context.is_some()),
        }
    }
}

#[tokio::test]
async fn wrong_guess_is_rejected_and_play_resumes() {
    let proposer = Arc::new(RuleProposer::new(1));
    let backend = Arc::new(ScriptedBackend::new("kitten", &["puppy", "kitten"]));
    let (session, _) = session("retry", proposer, backend, SessionLimits::default());

    let summary = session.run().await.unwrap();

    assert_eq!(summary.end_reason, EndReason::GuessedCorrectly);
    assert_eq!(summary.snapshot.questions_asked, 2);
    assert_eq!(summary.transitions, 24);
    assert!(summary.anomalies.is_empty());
    assert!(
        summary
            .transcript
            .iter()
            .any(|m| m.author == Author::Host && m.content == WRONG_GUESS_REPLY)
    );
}

#[tokio::test]
async fn twenty_answered_questions_end_the_game() {
    let proposer = Arc::new(RuleProposer::never_guessing());
    let backend = Arc::new(ScriptedBackend::new("violin", &[]));
    let (session, _) = session(
        "quota",
        proposer,
        backend.clone(),
        SessionLimits::default(),
    );

    let summary = session.run().await.unwrap();

    assert_eq!(summary.end_reason, EndReason::QuotaReached);
    assert!(!summary.guessed_correctly());
    assert_eq!(summary.snapshot.questions_asked, 20);
    assert_eq!(summary.snapshot.questions_answered, 20);
    assert_eq!(summary.transitions, 123);
    assert!(summary.anomalies.is_empty());
    assert_eq!(backend.answered().len(), 20);
    // Every answer is normalized.
    let last = summary.transcript.last().unwrap();
    assert_eq!(last, &Message::from_role(Role::Host, "YES"));
}

#[tokio::test]
async fn configured_quota_is_honored() {
    let (session, _) = session(
        "short-quota",
        Arc::new(RuleProposer::never_guessing()),
        Arc::new(ScriptedBackend::new("violin", &[])),
        SessionLimits {
            question_quota: 2,
            ..SessionLimits::default()
        },
    );

    let summary = session.run().await.unwrap();
    assert_eq!(summary.end_reason, EndReason::QuotaReached);
    assert_eq!(summary.snapshot.questions_asked, 2);
    assert_eq!(summary.snapshot.questions_answered, 2);
}

#[tokio::test]
async fn endless_chatter_hits_the_transition_ceiling() {
    let chatter = (0..50).map(|_| Proposal::text("Let me think.")).collect();
    let (session, observer) = session(
        "runaway",
        Arc::new(ScriptedProposer::new(chatter)),
        Arc::new(ScriptedBackend::new("violin", &[])),
        SessionLimits {
            max_transitions: 6,
            ..SessionLimits::default()
        },
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, GameError::Runaway { limit: 6 }));

    let events = observer.events();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ObserverEvent::NodeOrderAnomaly { .. }))
    );
    assert!(matches!(
        events.last(),
        Some(ObserverEvent::GameEnd { outcome, transitions: 6, .. }) if outcome == "aborted"
    ));
}
