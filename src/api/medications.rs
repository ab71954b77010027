//! Medication adherence, confirmations and reminder responses.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::instrument;

use super::StatusMessage;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{Gateway, RequestOptions};

/// State of one scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    Missed,
    #[default]
    Pending,
    /// Anything newer than this client knows about.
    #[serde(other)]
    Unknown,
}

/// One reminder sent for one scheduled dose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationLog {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub medication_id: String,
    pub medication_name: Option<String>,
    pub patient_name: String,
    pub contact_number: String,
    /// `HH:MM`.
    pub scheduled_time: String,
    pub sent_time: Option<String>,
    pub status: DoseStatus,
    pub response_received: bool,
    pub response_time: Option<String>,
    pub response_message: Option<String>,
}

/// Adherence over a trailing window of days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdherenceReport {
    pub status: String,
    pub patient_name: String,
    pub period_days: u32,
    pub total_reminders: u32,
    pub taken: u32,
    pub missed: u32,
    pub pending: u32,
    /// Percentage of reminders confirmed as taken.
    pub adherence_rate: f64,
    pub logs: Vec<MedicationLog>,
}

/// A patient's reply to a reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Confirmation {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub medication_id: String,
    pub patient_name: String,
    pub contact_number: String,
    pub scheduled_time: String,
    pub confirmation_time: Option<String>,
    pub is_taken: bool,
    pub response_message: Option<String>,
    pub log_id: Option<String>,
    pub user_id: Option<String>,
}

/// Counts for today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    pub total: u32,
    pub taken: u32,
    pub missed: u32,
    pub pending: u32,
}

/// Today's reminders, including doses not yet sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStatus {
    pub status: String,
    pub patient_name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub today_summary: DaySummary,
    pub today_logs: Vec<MedicationLog>,
}

/// What the backend did with a reminder reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseOutcome {
    /// `success`, `ignored`, `no_pending` or `error`.
    pub status: String,
    pub message: String,
    pub is_taken: Option<bool>,
    pub patient_name: Option<String>,
    pub log_updated: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ConfirmationList {
    #[serde(default)]
    confirmations: Vec<Confirmation>,
}

/// Adherence for `patient_name` over the last `days` days.
#[instrument(skip(gateway))]
pub async fn adherence(gateway: &Gateway, patient_name: &str, days: u32) -> Result<AdherenceReport> {
    gateway
        .call(
            Endpoint::Adherence.with([patient_name]),
            RequestOptions::get().query("days", days),
        )
        .await
}

/// The most recent `limit` confirmations, newest first.
#[instrument(skip(gateway))]
pub async fn confirmations(
    gateway: &Gateway,
    patient_name: &str,
    limit: u32,
) -> Result<Vec<Confirmation>> {
    let list: ConfirmationList = gateway
        .call(
            Endpoint::Confirmations.with([patient_name]),
            RequestOptions::get().query("limit", limit),
        )
        .await?;
    Ok(list.confirmations)
}

/// Today's dose status.
#[instrument(skip(gateway))]
pub async fn daily_status(gateway: &Gateway, patient_name: &str) -> Result<DailyStatus> {
    gateway
        .call(Endpoint::DailyStatus.with([patient_name]), RequestOptions::get())
        .await
}

/// Report a patient's reply ("yes", "taken", "no", ...) to their last reminder.
#[instrument(skip(gateway))]
pub async fn respond(gateway: &Gateway, contact_number: &str, message: &str) -> Result<ResponseOutcome> {
    gateway
        .call(
            Endpoint::MedicationResponse,
            RequestOptions::post().form([("contact_number", contact_number), ("message", message)]),
        )
        .await
}

/// Seed demonstration logs for `patient_name`.
#[instrument(skip(gateway))]
pub async fn create_test_logs(gateway: &Gateway, patient_name: &str) -> Result<StatusMessage> {
    gateway
        .call(
            Endpoint::CreateTestLogs.with([patient_name]),
            RequestOptions::post(),
        )
        .await
}
