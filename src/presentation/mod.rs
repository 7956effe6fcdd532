// Presentation layer - CLI and operator feedback
pub mod cli;
pub mod progress_log;
