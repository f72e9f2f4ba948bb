//! User-facing notification seam.

/// Surfaces messages to the user. Only used to report failures and summaries.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes to the tracing log instead of a UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!(target: "filemarks::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "filemarks::notify", "{}", message);
    }
}
