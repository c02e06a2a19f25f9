//! Session-related types.
//!
//! The session holds a single value: the visitor ID that keys the cart and
//! design in [`VisitorStore`](crate::services::visitors::VisitorStore). It is
//! written on the visitor's first change, so every later request carrying the
//! cookie sees the same ID.

use tower_sessions::Session;
use uuid::Uuid;

/// Session keys for storefront state.
pub mod keys {
    /// Key for the stable per-visitor ID.
    pub const VISITOR_ID: &str = "visitor_id";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// The visitor ID, creating and storing one if the session has none.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn visitor_id(session: &Session) -> SessionResult<Uuid> {
    if let Some(id) = existing_visitor_id(session).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    session.insert(keys::VISITOR_ID, id).await?;
    Ok(id)
}

/// The visitor ID if this session already has one. Never writes.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is not
/// a UUID.
pub async fn existing_visitor_id(session: &Session) -> SessionResult<Option<Uuid>> {
    session.get::<Uuid>(keys::VISITOR_ID).await
}
