use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, Sender};
use crate::error::SessionError;
use crate::project::{AppProject, ElementDesign};
use crate::surface::Surface;

/// Messages and state as they were right after one assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub messages: Vec<ChatMessage>,
    pub state: S,
}

/// Live chat history and state for one surface, plus the checkpoint index.
///
/// Checkpoints are owned copies keyed by assistant message id. Later edits to
/// the live state never reach them.
#[derive(Debug, Clone)]
pub struct Session<S: Surface> {
    messages: Vec<ChatMessage>,
    state: S,
    checkpoints: HashMap<String, Checkpoint<S>>,
    checkpoint_order: Vec<String>,
    placeholder: Option<String>,
    loading: bool,
}

pub type DesignStore = Session<ElementDesign>;
pub type ProjectStore = Session<AppProject>;

impl<S: Surface> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Surface> Session<S> {
    /// Fresh session: the welcome message and the surface's starting state.
    pub fn new() -> Self {
        let mut session = Self {
            messages: Vec::new(),
            state: S::initial(),
            checkpoints: HashMap::new(),
            checkpoint_order: Vec::new(),
            placeholder: None,
            loading: false,
        };
        session.add_message(S::WELCOME, Sender::Assistant);
        session
    }

    /// Rebuild a session from persisted history.
    ///
    /// Only the latest state survives a reload, so every recreated checkpoint
    /// carries that state. Empty history starts a fresh session instead.
    pub fn hydrate(messages: Vec<ChatMessage>, state: Option<S>) -> Self {
        if messages.is_empty() {
            let mut session = Self::new();
            if let Some(state) = state {
                session.state = state;
            }
            return session;
        }

        let state = state.unwrap_or_else(S::initial);
        let mut checkpoints = HashMap::new();
        let mut checkpoint_order = Vec::new();
        for (idx, msg) in messages.iter().enumerate() {
            if msg.is_assistant() {
                checkpoints.insert(
                    msg.id.clone(),
                    Checkpoint {
                        messages: messages[..=idx].to_vec(),
                        state: state.clone(),
                    },
                );
                checkpoint_order.push(msg.id.clone());
            }
        }

        log::debug!(
            "hydrated session with {} messages and {} checkpoints",
            messages.len(),
            checkpoint_order.len()
        );

        Self {
            messages,
            state,
            checkpoints,
            checkpoint_order,
            placeholder: None,
            loading: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Replace the live state. Does not create a checkpoint.
    pub fn set_state(&mut self, state: S) {
        self.state = state;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Enter the loading state. Returns false if a request is already in flight.
    pub fn begin_request(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_request(&mut self) {
        self.loading = false;
    }

    /// Append a message. Assistant messages are checkpointed together with a
    /// copy of the current state.
    pub fn add_message(&mut self, content: impl Into<String>, sender: Sender) -> ChatMessage {
        let message = ChatMessage::new(sender, content);
        self.messages.push(message.clone());
        if sender == Sender::Assistant {
            self.record_checkpoint(&message.id);
        }
        message
    }

    fn record_checkpoint(&mut self, id: &str) {
        let checkpoint = Checkpoint {
            messages: self.messages.clone(),
            state: self.state.clone(),
        };
        if self.checkpoints.insert(id.to_string(), checkpoint).is_none() {
            self.checkpoint_order.push(id.to_string());
        }
    }

    /// Show a transient assistant message while a request runs. It is never
    /// checkpointed.
    pub fn push_placeholder(&mut self, content: impl Into<String>) -> ChatMessage {
        self.discard_placeholder();
        let message = ChatMessage::assistant(content);
        self.placeholder = Some(message.id.clone());
        self.messages.push(message.clone());
        message
    }

    /// Remove the pending placeholder, if it is still the last message.
    pub fn discard_placeholder(&mut self) {
        if let Some(id) = self.placeholder.take() {
            if self.messages.last().map(|m| m.id == id).unwrap_or(false) {
                self.messages.pop();
            }
        }
    }

    /// Swap the placeholder for the final assistant message.
    pub fn replace_placeholder(&mut self, content: impl Into<String>) -> ChatMessage {
        self.discard_placeholder();
        self.add_message(content, Sender::Assistant)
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn checkpoint(&self, id: &str) -> Option<&Checkpoint<S>> {
        self.checkpoints.get(id)
    }

    /// Checkpoint ids, oldest first.
    pub fn checkpoint_ids(&self) -> &[String] {
        &self.checkpoint_order
    }

    /// Put messages and state back to how they were at `id`.
    pub fn restore_checkpoint(&mut self, id: &str) -> Result<(), SessionError> {
        let checkpoint = self
            .checkpoints
            .get(id)
            .ok_or_else(|| SessionError::CheckpointNotFound(id.to_string()))?;

        self.messages = checkpoint.messages.clone();
        self.state = checkpoint.state.clone();
        self.placeholder = None;
        log::info!("restored checkpoint {}", id);
        Ok(())
    }

    /// Start over with only a fresh welcome message and checkpoint.
    pub fn new_session(&mut self) {
        self.messages.clear();
        self.checkpoints.clear();
        self.checkpoint_order.clear();
        self.placeholder = None;
        self.state = S::initial();
        self.add_message(S::WELCOME, Sender::Assistant);
    }

    /// Most recent user-authored message, skipping any later assistant turns.
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.sender == Sender::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_welcome_checkpoint() {
        let session = ProjectStore::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.checkpoint_ids().len(), 1);
        let id = &session.messages()[0].id;
        assert_eq!(session.checkpoint(id).unwrap().state, AppProject::starter());
    }

    #[test]
    fn only_assistant_messages_are_checkpointed() {
        let mut session = DesignStore::new();
        let user = session.add_message("a button", Sender::User);
        let reply = session.add_message("done", Sender::Assistant);
        assert!(session.checkpoint(&user.id).is_none());
        let checkpoint = session.checkpoint(&reply.id).unwrap();
        assert_eq!(checkpoint.messages, session.messages());
    }

    #[test]
    fn checkpoint_round_trip() {
        let mut session = DesignStore::new();
        session.add_message("a button", Sender::User);
        session.set_state(ElementDesign::new("<button></button>", "", ""));
        let reply = session.add_message("created", Sender::Assistant);
        let messages = session.messages().to_vec();
        let state = session.state().clone();

        session.restore_checkpoint(&reply.id).unwrap();
        assert_eq!(session.messages(), &messages[..]);
        assert_eq!(session.state(), &state);
    }

    #[test]
    fn snapshots_survive_live_edits() {
        let mut session = DesignStore::new();
        session.set_state(ElementDesign::new("<p>v1</p>", "", ""));
        let reply = session.add_message("v1", Sender::Assistant);

        session.set_state(ElementDesign::new("<p>v2</p>", "", ""));
        session.add_message("more", Sender::User);
        assert_eq!(session.checkpoint(&reply.id).unwrap().state.html, "<p>v1</p>");

        session.restore_checkpoint(&reply.id).unwrap();
        assert_eq!(session.state().html, "<p>v1</p>");
        assert_eq!(session.messages().last().unwrap().id, reply.id);
    }

    #[test]
    fn unknown_checkpoint_changes_nothing() {
        let mut session = ProjectStore::new();
        session.add_message("hello there", Sender::User);
        let before_messages = session.messages().to_vec();
        let before_state = session.state().clone();

        assert_matches!(
            session.restore_checkpoint("missing"),
            Err(SessionError::CheckpointNotFound(id)) if id == "missing"
        );
        assert_eq!(session.messages(), &before_messages[..]);
        assert_eq!(session.state(), &before_state);
    }

    #[test]
    fn new_session_resets_everything() {
        let mut session = DesignStore::new();
        session.set_state(ElementDesign::new("<p></p>", "", ""));
        session.add_message("x y", Sender::User);
        session.add_message("ok then", Sender::Assistant);

        session.new_session();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, ElementDesign::WELCOME);
        assert_eq!(session.state(), &ElementDesign::default());
        assert_eq!(session.checkpoint_ids(), &[session.messages()[0].id.clone()]);
    }

    #[test]
    fn placeholder_is_replaced_not_checkpointed() {
        let mut session = ProjectStore::new();
        session.add_message("build a todo app", Sender::User);
        let placeholder = session.push_placeholder(AppProject::GENERATING);
        assert!(session.has_placeholder());
        assert!(session.checkpoint(&placeholder.id).is_none());

        let done = session.replace_placeholder("created");
        assert!(!session.has_placeholder());
        assert!(session.messages().iter().all(|m| m.id != placeholder.id));
        assert_eq!(session.messages().last().unwrap().id, done.id);
        assert_eq!(session.messages().len(), 3);
        assert!(session.checkpoint(&done.id).is_some());
    }

    #[test]
    fn hydrate_recreates_checkpoints() {
        let mut original = ProjectStore::new();
        original.add_message("a timer app", Sender::User);
        original.add_message("created", Sender::Assistant);
        let messages = original.messages().to_vec();

        let restored = ProjectStore::hydrate(messages.clone(), Some(AppProject::error_stub()));
        assert_eq!(restored.checkpoint_ids().len(), 2);
        let last = restored.checkpoint(&messages[2].id).unwrap();
        assert_eq!(last.messages.len(), 3);
        assert_eq!(last.state, AppProject::error_stub());
    }

    #[test]
    fn hydrate_without_history_seeds_welcome() {
        let session = DesignStore::hydrate(Vec::new(), None);
        assert_eq!(session.messages()[0].content, ElementDesign::WELCOME);
    }

    #[test]
    fn last_user_message_skips_assistant_turns() {
        let mut session = DesignStore::new();
        assert!(session.last_user_message().is_none());
        session.add_message("first request", Sender::User);
        session.add_message("reply", Sender::Assistant);
        session.add_message("second request", Sender::User);
        session.add_message("reply", Sender::Assistant);
        assert_eq!(session.last_user_message().unwrap().content, "second request");
    }

    #[test]
    fn loading_gate() {
        let mut session = DesignStore::new();
        assert!(session.begin_request());
        assert!(!session.begin_request());
        session.finish_request();
        assert!(!session.is_loading());
    }
}
