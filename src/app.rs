use std::sync::Arc;

use anyhow::Result;

use crate::api::{ApiClient, CompletionClient, Message};
use crate::chat::{ChatMessage, Sender};
use crate::config::Config;
use crate::context::{self, ContextBuilder, CLARIFICATION_REQUEST, DEFAULT_CONTEXT_WINDOW};
use crate::error::{ApiError, ExtractionError, ProjectError};
use crate::models;
use crate::output::Notifier;
use crate::project::{AppFileType, AppProject};
use crate::session::Session;
use crate::storage::{self, FileStorage, SessionStorage};
use crate::surface::Surface;

pub const APOLOGY: &str = "I'm sorry, there was an error processing your request. Please try again.";
pub const REBUILD_APOLOGY: &str = "I'm sorry, there was an error rebuilding your project. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Generate,
    Modify,
    Rebuild,
}

/// What happened to one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Another request was in flight, or there was nothing to act on.
    Ignored,
    /// The request was too short; a clarification question was posted instead.
    Clarified,
    /// The model answered. `fallback` is set when its answer could not be used.
    Completed {
        mode: RequestMode,
        fallback: Option<ExtractionError>,
    },
    Restored,
    Failed(String),
}

/// Drives one generator surface: chat turns in, designs or projects out.
///
/// A session moves Idle -> Loading -> Idle per request. Every failure is
/// turned into a notification and an assistant message; none escape.
pub struct App<S: Surface> {
    session: Session<S>,
    client: Arc<dyn CompletionClient>,
    storage: Arc<dyn SessionStorage>,
    notifier: Arc<dyn Notifier>,
    context: ContextBuilder,
    model: String,
    clarify_short_messages: bool,
}

impl<S: Surface> App<S> {
    /// Hydrates the session from `storage`, or seeds a fresh one.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = storage::load_session::<S>(storage.as_ref());
        Self {
            session,
            client,
            storage,
            notifier,
            context: ContextBuilder::new(DEFAULT_CONTEXT_WINDOW, S::WELCOME_MARKER),
            model: models::default_model(crate::api::AIProvider::Groq).to_string(),
            clarify_short_messages: S::CLARIFY_BY_DEFAULT,
        }
    }

    /// Wire an app from the user's config: HTTP client, file-backed history.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let client = ApiClient::from_config(&config.ai)?;
        let storage = FileStorage::new(config.session.storage_dir());
        log::debug!("session history stored in {}", storage.dir().display());
        let app = Self::new(Arc::new(client), Arc::new(storage), notifier)
            .with_model(&config.ai.model)
            .with_context_window(config.session.context_window);
        Ok(match config.session.clarify_short_messages {
            Some(enabled) => app.with_clarification(enabled),
            None => app,
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.select_model(model);
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context = ContextBuilder::new(window, S::WELCOME_MARKER);
        self
    }

    pub fn with_clarification(mut self, enabled: bool) -> Self {
        self.clarify_short_messages = enabled;
        self
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    pub fn state(&self) -> &S {
        self.session.state()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn select_model(&mut self, model: &str) {
        if models::find_model(model).is_none() {
            log::warn!("model {} is not in the catalog, using it anyway", model);
        }
        log::info!("using model {}", models::model_name(model));
        self.model = model.to_string();
    }

    pub fn preview(&self) -> String {
        self.session.state().preview_document()
    }

    /// Handle a chat message: generate or modify, depending on the current state.
    pub async fn send_message(&mut self, text: &str) -> Outcome {
        let text = text.trim();
        if text.is_empty() || self.session.is_loading() {
            log::debug!("ignoring message while loading or empty");
            return Outcome::Ignored;
        }

        let prompt = self.context.build(self.session.messages(), text);
        self.session.add_message(text, Sender::User);
        self.session.begin_request();

        let outcome = self.process_message(text, &prompt).await;

        self.session.finish_request();
        self.persist();
        outcome
    }

    async fn process_message(&mut self, text: &str, prompt: &str) -> Outcome {
        if self.clarify_short_messages && context::needs_clarification(text) {
            log::info!("asking for clarification on short request {:?}", text);
            self.session.add_message(CLARIFICATION_REQUEST, Sender::Assistant);
            return Outcome::Clarified;
        }

        if self.session.state().wants_generation(text) {
            self.session.push_placeholder(S::GENERATING);
            match self.complete(S::generation_prompt(prompt)).await {
                Ok(response) => {
                    let extracted = S::extract_generated(&response);
                    let fallback = self.report_fallback(extracted.error);
                    self.session.set_state(extracted.value);
                    let done = self.session.state().generated_message();
                    self.session.replace_placeholder(done);
                    Outcome::Completed {
                        mode: RequestMode::Generate,
                        fallback,
                    }
                }
                Err(e) => self.fail(&format!("Error: {}", e), APOLOGY, e),
            }
        } else {
            let messages = self.session.state().modification_prompt(prompt);
            match self.complete(messages).await {
                Ok(response) => {
                    let extracted = self.session.state().extract_modified(&response);
                    let fallback = self.report_fallback(extracted.error);
                    self.session.set_state(extracted.value);
                    self.session.add_message(S::UPDATED, Sender::Assistant);
                    Outcome::Completed {
                        mode: RequestMode::Modify,
                        fallback,
                    }
                }
                Err(e) => self.fail(&format!("Error: {}", e), APOLOGY, e),
            }
        }
    }

    /// Regenerate from scratch using the latest user request.
    pub async fn rebuild(&mut self) -> Outcome {
        if self.session.is_loading() {
            return Outcome::Ignored;
        }
        let messages = self.session.messages();
        let Some(index) = messages.iter().rposition(|m| m.sender == Sender::User) else {
            log::debug!("nothing to rebuild, no user messages");
            return Outcome::Ignored;
        };
        let prompt = self.context.build(&messages[..index], &messages[index].content);

        self.session.begin_request();
        self.notifier.info("Rebuilding...");

        let outcome = match self.complete(S::generation_prompt(&prompt)).await {
            Ok(response) => {
                let extracted = S::extract_generated(&response);
                let fallback = self.report_fallback(extracted.error);
                self.session.set_state(extracted.value);
                self.session.add_message(S::REBUILT, Sender::Assistant);
                if fallback.is_none() {
                    self.notifier.success("Rebuilt successfully!");
                }
                Outcome::Completed {
                    mode: RequestMode::Rebuild,
                    fallback,
                }
            }
            Err(e) => self.fail(&format!("Rebuild failed: {}", e), REBUILD_APOLOGY, e),
        };

        self.session.finish_request();
        self.persist();
        outcome
    }

    pub fn restore_checkpoint(&mut self, message_id: &str) -> Outcome {
        if self.session.is_loading() {
            return Outcome::Ignored;
        }
        match self.session.restore_checkpoint(message_id) {
            Ok(()) => {
                self.persist();
                self.notifier.success("Restored to checkpoint");
                Outcome::Restored
            }
            Err(e) => {
                log::warn!("{}", e);
                self.notifier.error("Checkpoint not found");
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub fn new_chat(&mut self) {
        self.session.new_session();
        self.persist();
        self.notifier.success("Started a new session");
    }

    /// Replace the state with a hand-edited version. No checkpoint is taken.
    pub fn edit_state(&mut self, state: S) {
        self.session.set_state(state);
        self.persist();
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, ApiError> {
        self.client.complete(&self.model, messages).await
    }

    fn report_fallback(&self, error: Option<ExtractionError>) -> Option<ExtractionError> {
        if let Some(e) = &error {
            self.notifier.warning(&format!("Could not use the AI response: {}", e));
        }
        error
    }

    fn fail(&mut self, notice: &str, apology: &str, error: ApiError) -> Outcome {
        log::error!("request failed: {}", error);
        self.session.discard_placeholder();
        self.notifier.error(notice);
        self.session.add_message(apology, Sender::Assistant);
        Outcome::Failed(error.to_string())
    }

    fn persist(&self) {
        if let Err(e) = storage::save_session(self.storage.as_ref(), &self.session) {
            log::error!("failed to save session: {}", e);
            self.notifier.error("Failed to save session");
        }
    }
}

/// Hand edits to an app project's files.
impl App<AppProject> {
    pub fn update_file(&mut self, name: &str, content: &str) -> Result<(), ProjectError> {
        let mut project = self.state().clone();
        project.update_file(name, content)?;
        self.edit_state(project);
        Ok(())
    }

    pub fn add_file(&mut self, name: &str, file_type: AppFileType) -> Result<(), ProjectError> {
        let mut project = self.state().clone();
        if let Err(e) = project.add_file(name, file_type) {
            self.notifier.error(&e.to_string());
            return Err(e);
        }
        self.edit_state(project);
        self.notifier.success("New file added");
        Ok(())
    }

    pub fn delete_file(&mut self, name: &str) -> Result<(), ProjectError> {
        let mut project = self.state().clone();
        if let Err(e) = project.delete_file(name) {
            self.notifier.error(&e.to_string());
            return Err(e);
        }
        self.edit_state(project);
        self.notifier.success("File deleted");
        Ok(())
    }
}
