use crate::chat::ChatMessage;

pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

pub const CONTEXT_HEADER: &str = "Recent conversation context:";

pub const CLARIFY_INSTRUCTION: &str = "Use this context to understand the user's intent, especially if they use short phrases or refer to previous messages. If the user's request is unclear or ambiguous, ask clarifying questions instead of making assumptions.";

pub const CLARIFICATION_REQUEST: &str = "Could you provide more details about what you'd like me to do? Your request seems brief, and I want to make sure I understand correctly.";

const MIN_REQUEST_CHARS: usize = 5;
const MIN_REQUEST_WORDS: usize = 2;

/// Builds the user turn actually sent to the model: the last few turns of the
/// chat, then the new request, then a standing instruction to ask rather than guess.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    window: usize,
    welcome_marker: String,
}

impl ContextBuilder {
    pub fn new(window: usize, welcome_marker: impl Into<String>) -> Self {
        Self {
            window,
            welcome_marker: welcome_marker.into(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// `history` must not yet contain `user_message`.
    pub fn build(&self, history: &[ChatMessage], user_message: &str) -> String {
        let relevant: Vec<&ChatMessage> = history
            .iter()
            .filter(|msg| !msg.content.contains(&self.welcome_marker))
            .collect();
        let start = relevant.len().saturating_sub(self.window);

        let mut context = String::from(CONTEXT_HEADER);
        context.push('\n');
        for msg in &relevant[start..] {
            context.push_str(&format!("{}: {}\n", msg.sender.label(), msg.content));
        }
        context.push_str(&format!("User: {}\n\n{}", user_message, CLARIFY_INSTRUCTION));
        context
    }
}

/// Too short to act on: under 5 characters or a single word.
pub fn needs_clarification(message: &str) -> bool {
    let trimmed = message.trim();
    trimmed.chars().count() < MIN_REQUEST_CHARS
        || trimmed.split_whitespace().count() < MIN_REQUEST_WORDS
}
