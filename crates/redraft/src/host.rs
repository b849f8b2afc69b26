//! Composer surface the orchestration core drives.
//!
//! The embedding composer implements [`ComposerHost`] and hands it in as an
//! `Rc<dyn ComposerHost>`. Everything here runs on the single-threaded UI
//! execution context, so the trait is `?Send`; worker threads never see
//! the host.

use async_trait::async_trait;
use thiserror::Error;

/// Which representation of the composer text a call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Plain text.
    Plain,
    /// HTML markup.
    Html,
}

/// Severity of a host alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Informational notice (e.g. the service produced no text).
    Info,
    /// The operation failed; the message carries the error text.
    Error,
}

/// Errors the host can report while supplying composer content.
#[derive(Debug, Error)]
pub enum HostError {
    /// The editing surface could not produce its content
    #[error("composer content unavailable: {0}")]
    ContentUnavailable(String),

    /// The composer window no longer exists
    #[error("composer window is gone")]
    Gone,
}

/// Surface a mail composer exposes to the orchestration core.
///
/// `content` is the only suspension point; every other method must return
/// without blocking. `show_wait_indicator` and `dismiss_wait_indicator`
/// manage one modal indicator per window; dismissing when nothing is shown
/// is a no-op.
#[async_trait(?Send)]
pub trait ComposerHost {
    /// Current text of the compose area.
    async fn content(&self, kind: ContentKind) -> Result<String, HostError>;

    /// Insert transformed text into the compose area. Position and
    /// replacement policy belong to the host.
    fn insert_content(&self, text: &str, kind: ContentKind);

    /// Show a non-blocking alert.
    fn submit_alert(&self, kind: AlertKind, message: &str);

    /// Bring up the modal wait indicator for a long-running request.
    fn show_wait_indicator(&self, model: &str);

    /// Take the wait indicator down again, if it is showing.
    fn dismiss_wait_indicator(&self);

    /// Whether the composer window still exists.
    fn is_alive(&self) -> bool;
}
