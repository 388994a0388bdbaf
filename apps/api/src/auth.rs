mod bootstrap;
mod session;
mod session_helpers;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler};
pub use session_helpers::read_session_state;

pub const SESSION_USER_KEY: &str = "user_identity";
/// Session creation timestamp, kept for audits of long-lived sessions.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
