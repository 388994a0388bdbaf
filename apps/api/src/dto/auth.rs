use serde::Deserialize;
use ts_rs::TS;

/// Incoming payload for token-gated sign-in.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub subject: String,
    pub email: Option<String>,
    pub token: String,
}
