//! Chat sessions with the medical assistant.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::instrument;

use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{Gateway, RequestOptions};
use crate::session::Identity;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    /// The user.
    Human,
    /// The assistant.
    Ai,
    /// System, tool or any other turn type this client does not model.
    #[serde(other)]
    Unknown,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Speaker of this turn.
    #[serde(rename = "type")]
    pub speaker: Speaker,
    /// Message text.
    pub content: String,
}

/// A freshly started session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartedSession {
    pub user_id: String,
    pub session_id: String,
    /// Greeting from the backend.
    #[serde(default)]
    pub message: String,
}

/// The assistant's answer plus the updated history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub user_id: String,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

/// Full history of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatHistory {
    pub user_id: String,
    pub session_id: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

/// Listing entry for one of the user's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionList {
    #[serde(default)]
    sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    message: &'a str,
}

/// Start a new chat session.
#[instrument(skip(gateway, identity), fields(user_id = %identity.user_id))]
pub async fn start_session(gateway: &Gateway, identity: &Identity) -> Result<StartedSession> {
    gateway
        .call(
            Endpoint::ChatStart.with([identity.user_id.as_str()]),
            RequestOptions::post(),
        )
        .await
}

/// Send `message` to an open session.
#[instrument(skip(gateway, identity, message), fields(user_id = %identity.user_id))]
pub async fn send_message(
    gateway: &Gateway,
    identity: &Identity,
    session_id: &str,
    message: &str,
) -> Result<ChatReply> {
    gateway
        .call(
            Endpoint::ChatSend.with([identity.user_id.as_str(), session_id, "message"]),
            RequestOptions::post().json(&Message { message })?,
        )
        .await
}

/// Fetch the full history of a session.
#[instrument(skip(gateway, identity), fields(user_id = %identity.user_id))]
pub async fn history(gateway: &Gateway, identity: &Identity, session_id: &str) -> Result<ChatHistory> {
    gateway
        .call(
            Endpoint::ChatHistory.with([identity.user_id.as_str(), session_id]),
            RequestOptions::get(),
        )
        .await
}

/// List the user's sessions.
#[instrument(skip(gateway, identity), fields(user_id = %identity.user_id))]
pub async fn list_sessions(gateway: &Gateway, identity: &Identity) -> Result<Vec<SessionSummary>> {
    let list: SessionList = gateway
        .call(
            Endpoint::ChatSessions.with([identity.user_id.as_str()]),
            RequestOptions::get(),
        )
        .await?;
    Ok(list.sessions)
}
