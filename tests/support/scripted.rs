#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use twentyq::core::game::{
    ActionBackend, ActionProposer, ActionRequest, GameSession, HostTask, Proposal,
    ProposalRequest, Role, SessionLimits, Speaker,
};
use twentyq::core::topics::ReferenceTopics;
use twentyq::runtime::observability::MemoryObserver;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn call(id: &str, name: &str, args: serde_json::Value) -> ActionRequest {
    ActionRequest::new(id, name, args)
}

/// Plays both roles by the rules: the host always calls the tool for its
/// current task with the arguments it was shown, and the player asks
/// `questions_before_guess` questions before every guess.
pub struct RuleProposer {
    questions_before_guess: usize,
    player_turns: AtomicUsize,
    requests: Mutex<Vec<ProposalRequest>>,
}

impl RuleProposer {
    pub fn new(questions_before_guess: usize) -> Self {
        Self {
            questions_before_guess,
            player_turns: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A player that never guesses.
    pub fn never_guessing() -> Self {
        Self::new(usize::MAX)
    }

    pub fn requests(&self) -> Vec<ProposalRequest> {
        lock(&self.requests).clone()
    }

    fn host_move(request: &ProposalRequest) -> ActionRequest {
        let ctx = request
            .host_context
            .as_ref()
            .expect("host requests carry host context");
        match ctx.task_for_host {
            HostTask::GenerateTopic => call(
                "topic",
                "generate_topic",
                json!({"task_for_host": "generate_topic"}),
            ),
            HostTask::AnswerQuestion => {
                let question = request
                    .history
                    .iter()
                    .rev()
                    .find(|entry| entry.speaker == Speaker::Human)
                    .map(|entry| entry.content.clone())
                    .unwrap_or_default();
                call(
                    "answer",
                    "answer_question",
                    json!({
                        "topic": ctx.topic,
                        "question": question,
                        "task_for_host": "answer_question",
                    }),
                )
            }
            HostTask::CheckGuess => call(
                "check",
                "check_guess",
                json!({
                    "topic": ctx.topic,
                    "guess": ctx.guess,
                    "task_for_host": "check_guess",
                }),
            ),
        }
    }
}

#[async_trait]
impl ActionProposer for RuleProposer {
    async fn propose(&self, request: &ProposalRequest) -> anyhow::Result<Proposal> {
        lock(&self.requests).push(request.clone());
        let action = match request.role {
            Role::Host => Self::host_move(request),
            Role::Player => {
                let turn = self.player_turns.fetch_add(1, Ordering::SeqCst);
                let cycle = self.questions_before_guess.saturating_add(1);
                if turn % cycle < self.questions_before_guess {
                    call("question", "generate_question", json!({}))
                } else {
                    call("guess", "make_guess", json!({}))
                }
            }
        };
        Ok(Proposal {
            tokens_used: Some(10),
            ..Proposal::action(action)
        })
    }
}

/// Replays a fixed list of proposals, whatever the role.
pub struct ScriptedProposer {
    moves: Mutex<VecDeque<Proposal>>,
    requests: Mutex<Vec<ProposalRequest>>,
}

impl ScriptedProposer {
    pub fn new(moves: Vec<Proposal>) -> Self {
        Self {
            moves: Mutex::new(moves.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProposalRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ActionProposer for ScriptedProposer {
    async fn propose(&self, request: &ProposalRequest) -> anyhow::Result<Proposal> {
        lock(&self.requests).push(request.clone());
        lock(&self.moves)
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted at {} turn", request.role))
    }
}

/// Deterministic model stand-in: a fixed topic, YES to everything,
/// numbered questions and a queue of guesses.
pub struct ScriptedBackend {
    topic: String,
    guesses: Mutex<VecDeque<String>>,
    questions: AtomicUsize,
    answered: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new(topic: &str, guesses: &[&str]) -> Self {
        Self {
            topic: topic.to_string(),
            guesses: Mutex::new(guesses.iter().map(|g| (*g).to_string()).collect()),
            questions: AtomicUsize::new(0),
            answered: Mutex::new(Vec::new()),
        }
    }

    /// Every `(topic, question)` pair `answer_question` was called with.
    pub fn answered(&self) -> Vec<(String, String)> {
        lock(&self.answered).clone()
    }
}

#[async_trait]
impl ActionBackend for ScriptedBackend {
    async fn generate_topic(&self, samples: &[String]) -> anyhow::Result<String> {
        anyhow::ensure!(!samples.is_empty(), "expected reference samples");
        Ok(self.topic.clone())
    }

    async fn answer_question(&self, topic: &str, question: &str) -> anyhow::Result<String> {
        lock(&self.answered).push((topic.to_string(), question.to_string()));
        Ok("Yes.".into())
    }

    async fn generate_question(&self, _transcript: &str) -> anyhow::Result<String> {
        let n = self.questions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("Question number {n}?"))
    }

    async fn make_guess(&self, _transcript: &str) -> anyhow::Result<String> {
        lock(&self.guesses)
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no guesses left"))
    }
}

pub fn topics() -> Arc<ReferenceTopics> {
    Arc::new(
        ReferenceTopics::from_names(["apple", "eagle", "Eiffel Tower", "violin", "Sherlock Holmes"])
            .expect("non-empty topic list"),
    )
}

pub fn session(
    game_id: &str,
    proposer: Arc<dyn ActionProposer>,
    backend: Arc<dyn ActionBackend>,
    limits: SessionLimits,
) -> (GameSession, Arc<MemoryObserver>) {
    let observer = Arc::new(MemoryObserver::new());
    let session = GameSession::new(
        game_id,
        proposer,
        backend,
        topics(),
        observer.clone(),
        limits,
    );
    (session, observer)
}
