use serde_json::json;

use super::traits::ToolSpec;
use crate::core::game::action::ActionKind;
use crate::core::game::state::Role;

/// The tool definition offered to a model for `kind`.
pub fn tool_spec(kind: ActionKind) -> ToolSpec {
    let (description, parameters) = match kind {
        ActionKind::GenerateTopic => (
            "Host only. Come up with the secret topic for the game. Use this only while \
             task_for_host is \"generate_topic\" and no topic exists yet.",
            json!({
                "type": "object",
                "properties": {
                    "task_for_host": task_property()
                },
                "required": ["task_for_host"]
            }),
        ),
        ActionKind::AnswerQuestion => (
            "Host only. Answer the player's YES-or-NO question about the secret topic. \
             Use this only while task_for_host is \"answer_question\".",
            json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "description": "The secret topic"},
                    "question": {"type": "string", "description": "The player's question"},
                    "task_for_host": task_property()
                },
                "required": ["topic", "question", "task_for_host"]
            }),
        ),
        ActionKind::CheckGuess => (
            "Host only. Check whether the player's declared guess names the secret topic. \
             Use this only while task_for_host is \"check_guess\".",
            json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "description": "The secret topic"},
                    "guess": {"type": "string", "description": "The player's guess"},
                    "task_for_host": task_property()
                },
                "required": ["topic", "guess", "task_for_host"]
            }),
        ),
        ActionKind::GenerateQuestion => (
            "Player only. Ask the host one new YES-or-NO question that narrows down the topic.",
            transcript_schema(),
        ),
        ActionKind::MakeGuess => (
            "Player only. Name the topic once you are confident enough to guess.",
            transcript_schema(),
        ),
    };

    ToolSpec {
        name: kind.as_str().to_string(),
        description: description.to_string(),
        parameters,
    }
}

pub fn host_tool_specs() -> Vec<ToolSpec> {
    ActionKind::HOST.iter().copied().map(tool_spec).collect()
}

pub fn player_tool_specs() -> Vec<ToolSpec> {
    ActionKind::PLAYER.iter().copied().map(tool_spec).collect()
}

pub fn tool_specs_for(role: Role) -> Vec<ToolSpec> {
    match role {
        Role::Host => host_tool_specs(),
        Role::Player => player_tool_specs(),
    }
}

fn task_property() -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ["generate_topic", "answer_question", "check_guess"],
        "description": "The host's current task"
    })
}

fn transcript_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "transcript": {
                "type": "string",
                "description": "The conversation so far"
            }
        }
    })
}
