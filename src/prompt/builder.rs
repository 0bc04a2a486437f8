use super::engine::TeraEngine;
use crate::core::game::{HostContext, Role};
use tera::Context;

const ROLE_SYSTEM_TEMPLATE: &str = "\
You are part of a game of 20 questions. Your role is {{ role }}.
You MUST ALWAYS use the provided tools for EVERY action no matter what.
Available tools: {{ tool_names | join(sep=\", \") }}.
Role-specific instructions: {{ instructions }}
{% if host_context %}
## Game State
Secret topic: {% if host_context.topic %}{{ host_context.topic }}{% else %}(not chosen yet){% endif %}
Current task: {{ host_context.task_for_host }}
{% if host_context.guess %}Player's latest guess: {{ host_context.guess }}
{% endif %}{% endif %}";

const HOST_INSTRUCTIONS: &str = "\
You are the host. Look at the current task and call exactly one tool. \
When the task is generate_topic, call generate_topic. \
When the task is answer_question, call answer_question with the secret topic and the player's latest question. \
When the task is check_guess, call check_guess with the secret topic and the player's guess. \
Never reveal the secret topic in the conversation.";

const PLAYER_INSTRUCTIONS: &str = "\
You are the player. Try to find the host's secret topic. \
Call generate_question to ask one YES-or-NO question, \
or call make_guess when you are confident about the topic. \
Pass the conversation so far as the transcript argument.";

const GENERATE_TOPIC_TEMPLATE: &str = "\
Generate a unique and commonly recognized name for a game of 20 questions.
The topic should be a single object or living thing from one of these categories: \
animals, plants, places, daily-life items, or famous individuals or characters from movies, TV shows, books, or history.
Reply with just the name, without any additional text or explanation.
{% if samples %}
You may take inspiration from these reference topics:
{% for sample in samples %}- {{ sample }}
{% endfor %}{% endif %}";

const ANSWER_QUESTION_TEMPLATE: &str = "\
You are the host of a game of 20 questions. Your secret topic is: {{ topic }}.
The player asked: {{ question }}
Answer with \"YES\" or \"NO\" with respect to the topic. Reply with only YES or NO.";

const GENERATE_QUESTION_TEMPLATE: &str = "\
You are the player in a game of 20 questions. The host has chosen a secret topic.
Ask ONE YES-or-NO question that helps you narrow the topic down.
Reply with only the question. Do not repeat a question that already appears in the conversation.

Conversation so far:
{{ transcript }}";

const MAKE_GUESS_TEMPLATE: &str = "\
You are the player in a game of 20 questions. The host has chosen a secret topic.
Based on the conversation and the host's answers, name the topic you think it is.
Reply with only the name, for example \"apple\", not a sentence or a question.
Do not repeat a guess you already made.

Conversation so far:
{{ transcript }}";

const ROLE_SYSTEM_NAME: &str = "role_system";
const GENERATE_TOPIC_NAME: &str = "generate_topic";
const ANSWER_QUESTION_NAME: &str = "answer_question";
const GENERATE_QUESTION_NAME: &str = "generate_question";
const MAKE_GUESS_NAME: &str = "make_guess";

/// The game's prompt templates, registered once and rendered per call.
pub struct PromptBook {
    engine: TeraEngine,
}

impl PromptBook {
    pub fn new() -> anyhow::Result<Self> {
        let mut engine = TeraEngine::new();
        engine.add_template(ROLE_SYSTEM_NAME, ROLE_SYSTEM_TEMPLATE)?;
        engine.add_template(GENERATE_TOPIC_NAME, GENERATE_TOPIC_TEMPLATE)?;
        engine.add_template(ANSWER_QUESTION_NAME, ANSWER_QUESTION_TEMPLATE)?;
        engine.add_template(GENERATE_QUESTION_NAME, GENERATE_QUESTION_TEMPLATE)?;
        engine.add_template(MAKE_GUESS_NAME, MAKE_GUESS_TEMPLATE)?;
        Ok(Self { engine })
    }

    /// System prompt for a role's turn. The host also sees the game state.
    pub fn role_system(
        &self,
        role: Role,
        tool_names: &[&str],
        host_context: Option<&HostContext>,
    ) -> anyhow::Result<String> {
        let instructions = match role {
            Role::Host => HOST_INSTRUCTIONS,
            Role::Player => PLAYER_INSTRUCTIONS,
        };

        let mut ctx = Context::new();
        ctx.insert("role", &role);
        ctx.insert("tool_names", tool_names);
        ctx.insert("instructions", instructions);
        ctx.insert("host_context", &host_context);
        self.engine.render(ROLE_SYSTEM_NAME, &ctx)
    }

    pub fn generate_topic(&self, samples: &[String]) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("samples", samples);
        self.engine.render(GENERATE_TOPIC_NAME, &ctx)
    }

    pub fn answer_question(&self, topic: &str, question: &str) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("topic", topic);
        ctx.insert("question", question);
        self.engine.render(ANSWER_QUESTION_NAME, &ctx)
    }

    pub fn generate_question(&self, transcript: &str) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("transcript", transcript);
        self.engine.render(GENERATE_QUESTION_NAME, &ctx)
    }

    pub fn make_guess(&self, transcript: &str) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("transcript", transcript);
        self.engine.render(MAKE_GUESS_NAME, &ctx)
    }
}
