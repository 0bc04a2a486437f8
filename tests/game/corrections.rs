use std::sync::Arc;

use serde_json::json;

use twentyq::core::game::executor::CORRECT_GUESS_REPLY;
use twentyq::core::game::{
    ActionKind, Author, Correction, EndReason, GAME_OPENER, GameState, GameStateSnapshot, HostTask,
    Message, Proposal, Role, SessionLimits,
};
use twentyq::runtime::observability::{MemoryObserver, ObserverEvent};
use twentyq::GameError;

use super::scripted::{ScriptedBackend, ScriptedProposer, call, session};

/// Host to move, one question asked and not yet answered.
fn awaiting_answer() -> GameState {
    GameState::restore(
        GameStateSnapshot {
            active_role: Role::Host,
            topic: "kitten".into(),
            task_for_host: HostTask::AnswerQuestion,
            most_recent_question: "Is it small?".into(),
            questions_asked: 1,
            questions_answered: 0,
            ..GameStateSnapshot::default()
        },
        vec![
            Message::system(GAME_OPENER),
            Message::from_role(Role::Player, "Is it small?"),
        ],
    )
    .unwrap()
}

fn corrections(observer: &MemoryObserver) -> Vec<Correction> {
    observer
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ObserverEvent::Correction { correction, .. } => Some(correction),
            _ => None,
        })
        .collect()
}

/// One question of quota, so a single answer ends the game.
fn one_question() -> SessionLimits {
    SessionLimits {
        question_quota: 1,
        ..SessionLimits::default()
    }
}

#[tokio::test]
async fn check_guess_while_answer_is_owed_is_rerouted() {
    let backend = Arc::new(ScriptedBackend::new("kitten", &[]));
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "c1",
        "check_guess",
        json!({"topic": "kitten", "guess": "", "task_for_host": "check_guess"}),
    ))]));
    let (session, observer) = session("reroute", proposer, backend.clone(), one_question());

    let summary = session.with_state(awaiting_answer()).run().await.unwrap();

    assert_eq!(summary.end_reason, EndReason::QuotaReached);
    assert_eq!(summary.snapshot.questions_answered, 1);
    assert_eq!(
        backend.answered(),
        vec![("kitten".to_string(), "Is it small?".to_string())]
    );
    assert_eq!(
        corrections(&observer),
        vec![Correction::Rerouted {
            from: ActionKind::CheckGuess,
            to: ActionKind::AnswerQuestion,
            question: "Is it small?".into(),
        }]
    );
    assert!(
        summary
            .transcript
            .iter()
            .any(|m| m.author == Author::Tool(ActionKind::AnswerQuestion))
    );
}

#[tokio::test]
async fn stale_topic_in_answer_is_overwritten() {
    let backend = Arc::new(ScriptedBackend::new("kitten", &[]));
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "a1",
        "answer_question",
        json!({"topic": "puppy", "question": "Is it small?", "task_for_host": "answer_question"}),
    ))]));
    let (session, observer) = session("stale-topic", proposer, backend.clone(), one_question());

    session.with_state(awaiting_answer()).run().await.unwrap();

    assert_eq!(backend.answered()[0].0, "kitten");
    assert_eq!(
        corrections(&observer),
        vec![Correction::OverwroteArgument {
            action: ActionKind::AnswerQuestion,
            argument: "topic".into(),
            supplied: Some("puppy".into()),
            authoritative: "kitten".into(),
        }]
    );
}

#[tokio::test]
async fn only_the_first_of_several_requests_runs() {
    let backend = Arc::new(ScriptedBackend::new("kitten", &[]));
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal {
        actions: vec![
            call(
                "a1",
                "answer_question",
                json!({"topic": "kitten", "question": "Is it small?", "task_for_host": "answer_question"}),
            ),
            call("t1", "generate_topic", json!({"task_for_host": "generate_topic"})),
        ],
        ..Proposal::default()
    }]));
    let (session, observer) = session("duplicates", proposer, backend.clone(), one_question());

    let summary = session.with_state(awaiting_answer()).run().await.unwrap();

    assert_eq!(summary.snapshot.topic, "kitten");
    assert_eq!(backend.answered().len(), 1);
    assert_eq!(
        corrections(&observer),
        vec![Correction::DroppedExtraRequests {
            kept: "answer_question".into(),
            dropped: vec!["generate_topic".into()],
        }]
    );
}

#[tokio::test]
async fn check_guess_only_ever_sees_authoritative_values() {
    let state = GameState::restore(
        GameStateSnapshot {
            active_role: Role::Host,
            topic: "kitten".into(),
            guess: "kitten".into(),
            task_for_host: HostTask::CheckGuess,
            most_recent_question: "Is it a pet?".into(),
            questions_asked: 4,
            questions_answered: 4,
            ..GameStateSnapshot::default()
        },
        vec![
            Message::system(GAME_OPENER),
            Message::from_role(Role::Player, "kitten"),
        ],
    )
    .unwrap();
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "g1",
        "check_guess",
        json!({"topic": "dog", "guess": "cat", "task_for_host": "check_guess"}),
    ))]));
    let (session, observer) = session(
        "check",
        proposer,
        Arc::new(ScriptedBackend::new("kitten", &[])),
        SessionLimits::default(),
    );

    let summary = session.with_state(state).run().await.unwrap();

    assert_eq!(summary.end_reason, EndReason::GuessedCorrectly);
    assert!(summary.snapshot.questions_asked < 20);
    assert!(
        summary
            .transcript
            .contains(&Message::tool(ActionKind::CheckGuess, CORRECT_GUESS_REPLY))
    );
    assert_eq!(
        summary.transcript.last(),
        Some(&Message::from_role(Role::Host, CORRECT_GUESS_REPLY))
    );

    let overwritten: Vec<String> = corrections(&observer)
        .into_iter()
        .map(|c| match c {
            Correction::OverwroteArgument { argument, .. } => argument,
            other => panic!("unexpected correction {other:?}"),
        })
        .collect();
    assert_eq!(overwritten, vec!["topic", "guess"]);
}

#[tokio::test]
async fn player_requesting_a_host_action_is_fatal() {
    let state = GameState::restore(
        GameStateSnapshot {
            active_role: Role::Player,
            topic: "kitten".into(),
            task_for_host: HostTask::AnswerQuestion,
            ..GameStateSnapshot::default()
        },
        vec![Message::system(GAME_OPENER)],
    )
    .unwrap();
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "p1",
        "answer_question",
        json!({"topic": "kitten", "question": "?", "task_for_host": "answer_question"}),
    ))]));
    let (session, _) = session(
        "scope",
        proposer,
        Arc::new(ScriptedBackend::new("kitten", &[])),
        SessionLimits::default(),
    );

    let err = session.with_state(state).run().await.unwrap_err();
    assert!(matches!(
        err,
        GameError::ScopeViolation {
            role: Role::Player,
            action: ActionKind::AnswerQuestion,
        }
    ));
}

#[tokio::test]
async fn second_topic_generation_violates_the_precondition() {
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "t2",
        "generate_topic",
        json!({"task_for_host": "generate_topic"}),
    ))]));
    let (session, _) = session(
        "regenerate",
        proposer,
        Arc::new(ScriptedBackend::new("kitten", &[])),
        SessionLimits::default(),
    );

    let err = session.with_state(awaiting_answer()).run().await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Precondition {
            action: ActionKind::GenerateTopic,
            expected: HostTask::GenerateTopic,
            actual: HostTask::AnswerQuestion,
        }
    ));
}

#[tokio::test]
async fn unknown_action_is_fatal() {
    let proposer = Arc::new(ScriptedProposer::new(vec![Proposal::action(call(
        "x1",
        "reveal_topic",
        json!({}),
    ))]));
    let (session, _) = session(
        "unknown",
        proposer,
        Arc::new(ScriptedBackend::new("kitten", &[])),
        SessionLimits::default(),
    );

    let err = session.with_state(awaiting_answer()).run().await.unwrap_err();
    assert!(matches!(err, GameError::UnknownAction(name) if name == "reveal_topic"));
}
