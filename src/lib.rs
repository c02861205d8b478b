// Library exports for the Elemental element and app generators

pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod output;
pub mod project;
pub mod prompts;
pub mod render;
pub mod session;
pub mod storage;
pub mod surface;

// Re-export commonly used types
pub use api::{AIProvider, ApiClient, CompletionClient, Message, Role};
pub use app::{App, Outcome, RequestMode};
pub use chat::{ChatMessage, Sender};
pub use config::{AiConfig, Config, SessionConfig};
pub use context::ContextBuilder;
pub use error::{ApiError, ExtractionError, ProjectError, SessionError, StorageError};
pub use extract::Extracted;
pub use output::{Notification, NotificationLevel, Notifier, OutputHandler, RecordingNotifier};
pub use project::{AppFile, AppFileType, AppProject, ElementDesign};
pub use session::{Checkpoint, DesignStore, ProjectStore, Session};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use surface::Surface;
