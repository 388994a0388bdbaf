use gestor_core::{AppError, SessionState, UserIdentity};
use tower_sessions::Session;

use super::SESSION_USER_KEY;

/// Reads the completed session check. A store failure is an internal error.
pub async fn read_session_state(session: &Session) -> Result<SessionState, AppError> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session identity: {error}"))
        })?;

    Ok(SessionState::from_identity(identity))
}
