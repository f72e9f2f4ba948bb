// filemarks services
// Collaborator seams (editor, notifier) and the config engine.

pub mod config_engine;
pub mod editor;
pub mod notifier;
