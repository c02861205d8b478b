use std::sync::Mutex;

use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Short user-visible notices ("toasts") raised by the controller.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}

/// Prints notifications to the terminal.
pub struct OutputHandler {
    debug: bool,
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputHandler {
    pub fn new() -> Self {
        Self { debug: false }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    fn format(level: NotificationLevel, message: &str) -> String {
        match level {
            NotificationLevel::Info => format!("{}", style(message).yellow().dim()),
            NotificationLevel::Success => format!("{} {}", style("✓").green().bold(), message),
            NotificationLevel::Warning => format!("{} {}", style("Warning:").yellow().bold(), message),
            NotificationLevel::Error => format!("{} {}", style("Error:").red().bold(), message),
        }
    }
}

impl Notifier for OutputHandler {
    fn notify(&self, level: NotificationLevel, message: &str) {
        if self.debug {
            log::debug!("notification {:?}: {}", level, message);
        }
        match level {
            NotificationLevel::Error | NotificationLevel::Warning => eprintln!("{}", Self::format(level, message)),
            _ => println!("{}", Self::format(level, message)),
        }
    }
}

/// Keeps every notification in memory, for embedding UIs and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.notifications().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(Notification {
                level,
                message: message.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("saved");
        notifier.error("boom");
        let seen = notifier.take();
        assert_eq!(seen[0].level, NotificationLevel::Success);
        assert_eq!(seen[1].message, "boom");
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn error_format_has_label() {
        console::set_colors_enabled(false);
        assert_eq!(OutputHandler::format(NotificationLevel::Error, "x"), "Error: x");
    }
}
