use serde::{Deserialize, Serialize};

use super::state::{Author, Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// Written by the role being prompted.
    Ai,
    /// Written by anyone else, including the system opener.
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub content: String,
}

/// The transcript as seen from `role`: tool results and empty messages are
/// dropped, and every remaining message is tagged relative to `role`.
pub fn chat_history(transcript: &[Message], role: Role) -> Vec<HistoryEntry> {
    transcript
        .iter()
        .filter(|message| !message.is_tool() && !message.content.trim().is_empty())
        .map(|message| HistoryEntry {
            speaker: if message.author == Author::from(role) {
                Speaker::Ai
            } else {
                Speaker::Human
            },
            content: message.content.clone(),
        })
        .collect()
}

/// Flatten history into `speaker: content` lines for prompts that take the
/// conversation as plain text.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let label = match entry.speaker {
                Speaker::Ai => "ai",
                Speaker::Human => "human",
            };
            format!("{label}: {}", entry.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
