// Data shapes shared by the session store and the API client.
// Field names on the wire follow the backend's snake_case JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally cached session. An empty `api_token` means "no session".
///
/// Missing keys load as defaults so files written by older clients, or a
/// hand-edited file, still deserialize.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialRecord {
    pub api_token: String,
    pub api_url: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "last_used")]
    pub last_used_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupResponse {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
}

/// Request-quota snapshot reported by `/status`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    #[serde(rename = "reset")]
    pub reset_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub status: String,
    pub user_id: String,
    pub token_valid: bool,
    pub expires_at: DateTime<Utc>,
    pub rate_limit: RateLimit,
    pub server_time: DateTime<Utc>,
}

/// Amount is expressed in satoshis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub amount: i64,
    pub to_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendResponse {
    pub transaction_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BalanceResponse {
    pub balance: i64,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Body returned by the server on any status >= 400.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
    pub message: String,
}
