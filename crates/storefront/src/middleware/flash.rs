//! One-shot flash messages over the session.
//!
//! A flash message is set once by a mutating handler and consumed exactly
//! once by the next rendered page: [`take`] removes it from the session as
//! it reads it.

use tower_sessions::Session;

use crate::models::session_keys;

/// Set the flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set(session: &Session, message: &str) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH_MESSAGE, message).await
}

/// Consume the flash message, clearing it from the session.
///
/// Session read failures are logged and treated as "no message": a broken
/// flash must never break page rendering.
pub async fn take(session: &Session) -> Option<String> {
    match session.remove::<String>(session_keys::FLASH_MESSAGE).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Failed to read flash message from session: {}", e);
            None
        }
    }
}
