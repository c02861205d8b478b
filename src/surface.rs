//! The two generator surfaces: a single element designer and a multi-file app
//! generator. Each one fixes its persisted keys, welcome text, starting state,
//! prompts, and how a model response is folded into its state.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::Message;
use crate::extract::{self, Extracted};
use crate::project::{AppProject, ElementDesign};
use crate::prompts;
use crate::render;

pub trait Surface: Clone + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Storage key for the chat history.
    const MESSAGES_KEY: &'static str;
    /// Storage key for the current state.
    const STATE_KEY: &'static str;
    const WELCOME: &'static str;
    /// Substring that identifies the welcome message in history.
    const WELCOME_MARKER: &'static str;
    /// Whether very short requests get a clarification question by default.
    const CLARIFY_BY_DEFAULT: bool;
    const GENERATING: &'static str;
    const UPDATED: &'static str;
    const REBUILT: &'static str;

    fn initial() -> Self;

    /// Whether the state is worth writing to storage.
    fn is_persistable(&self) -> bool {
        true
    }

    /// Whether `request` should start over instead of modifying the current state.
    fn wants_generation(&self, request: &str) -> bool;

    fn generation_prompt(request: &str) -> Vec<Message>;

    fn modification_prompt(&self, request: &str) -> Vec<Message>;

    fn extract_generated(response: &str) -> Extracted<Self>;

    fn extract_modified(&self, response: &str) -> Extracted<Self>;

    fn generated_message(&self) -> String;

    /// Standalone HTML document for the preview frame.
    fn preview_document(&self) -> String;
}

impl Surface for ElementDesign {
    const MESSAGES_KEY: &'static str = "element_designer_chat_history";
    const STATE_KEY: &'static str = "element_designer_design";
    const WELCOME: &'static str = "Welcome to the AI Element Designer! Tell me what kind of element you'd like to create, and I'll help you design it. For example, you could ask for 'a glossy blue button with hover effects' or 'a responsive card with an image and description'.";
    const WELCOME_MARKER: &'static str = "Welcome to the AI Element Designer";
    const CLARIFY_BY_DEFAULT: bool = false;
    const GENERATING: &'static str = "Generating your element design...";
    const UPDATED: &'static str = "I've updated the element based on your request. Anything else you'd like to change?";
    const REBUILT: &'static str = "I've rebuilt your element from scratch. How does this version look?";

    fn initial() -> Self {
        ElementDesign::default()
    }

    fn wants_generation(&self, _request: &str) -> bool {
        self.is_empty()
    }

    fn generation_prompt(request: &str) -> Vec<Message> {
        vec![
            Message::system(prompts::DESIGN_GENERATE_SYSTEM),
            Message::user(prompts::design_generation_request(request)),
        ]
    }

    fn modification_prompt(&self, request: &str) -> Vec<Message> {
        vec![
            Message::system(prompts::DESIGN_MODIFY_SYSTEM),
            Message::user(prompts::design_modification_request(self, request)),
        ]
    }

    fn extract_generated(response: &str) -> Extracted<Self> {
        extract::extract_design(response)
    }

    fn extract_modified(&self, response: &str) -> Extracted<Self> {
        extract::extract_design_update(response, self)
    }

    fn generated_message(&self) -> String {
        "I've created that element for you. You can see it in the preview panel. What would you like to change?"
            .to_string()
    }

    fn preview_document(&self) -> String {
        render::render_design(self)
    }
}

impl Surface for AppProject {
    const MESSAGES_KEY: &'static str = "app_generator_chat_history";
    const STATE_KEY: &'static str = "app_generator_project_history";
    const WELCOME: &'static str = "Welcome to the AI App Generator! I've added a sample app to get you started. You can edit the code directly or ask me to modify it. Try asking for a specific type of app or request changes to the current one!";
    const WELCOME_MARKER: &'static str = "Welcome to the AI App Generator";
    const CLARIFY_BY_DEFAULT: bool = true;
    const GENERATING: &'static str = "Generating your app...";
    const UPDATED: &'static str = "I've updated the app based on your request. You can test it in the preview panel or continue editing the code directly.";
    const REBUILT: &'static str = "I've rebuilt your app from scratch. How does this version look?";

    fn initial() -> Self {
        AppProject::starter()
    }

    fn is_persistable(&self) -> bool {
        !self.files.is_empty()
    }

    fn wants_generation(&self, request: &str) -> bool {
        let request = request.to_lowercase();
        self.files.is_empty() || request.contains("create new") || request.contains("generate new")
    }

    fn generation_prompt(request: &str) -> Vec<Message> {
        vec![
            Message::system(prompts::PROJECT_GENERATE_SYSTEM),
            Message::user(prompts::project_generation_request(request)),
        ]
    }

    fn modification_prompt(&self, request: &str) -> Vec<Message> {
        vec![
            Message::system(prompts::PROJECT_MODIFY_SYSTEM),
            Message::user(prompts::project_modification_request(self, request)),
        ]
    }

    fn extract_generated(response: &str) -> Extracted<Self> {
        extract::extract_project(response)
    }

    fn extract_modified(&self, response: &str) -> Extracted<Self> {
        extract::extract_project_update(response, self)
    }

    fn generated_message(&self) -> String {
        format!(
            "I've created a {} app for you. You can see it in the preview panel and edit the code directly. What would you like to change?",
            self.name
        )
    }

    fn preview_document(&self) -> String {
        render::render_project(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_use_distinct_keys() {
        assert_ne!(ElementDesign::MESSAGES_KEY, AppProject::MESSAGES_KEY);
        assert_ne!(ElementDesign::STATE_KEY, AppProject::STATE_KEY);
    }

    #[test]
    fn welcome_text_carries_marker() {
        assert!(ElementDesign::WELCOME.contains(ElementDesign::WELCOME_MARKER));
        assert!(AppProject::WELCOME.contains(AppProject::WELCOME_MARKER));
    }

    #[test]
    fn project_generation_triggers() {
        let starter = AppProject::starter();
        assert!(!starter.wants_generation("add a dark mode toggle"));
        assert!(starter.wants_generation("Create New weather dashboard"));
        assert!(starter.wants_generation("please generate new game"));

        let mut empty = starter.clone();
        empty.files.clear();
        assert!(empty.wants_generation("add a footer"));
    }

    #[test]
    fn design_generates_until_html_exists() {
        assert!(ElementDesign::default().wants_generation("a button"));
        assert!(!ElementDesign::new("<b></b>", "", "").wants_generation("a button"));
        assert!(ElementDesign::new("", "p{}", "go()").wants_generation("a button"));
    }
}
