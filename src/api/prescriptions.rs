//! Prescription records and the medications they schedule.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::upload::{file_part, FileUploadResponse};
use super::StatusMessage;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{Gateway, RequestOptions};

/// One medicine on a prescription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medicine {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    /// Schedule as written on the prescription ("after lunch", ...).
    pub original_schedule_text: Vec<String>,
    /// Resolved `HH:MM` reminder times.
    pub scheduled_times: Vec<String>,
    pub notes: Option<String>,
}

/// A stored prescription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prescription {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub patient_name: String,
    pub age: String,
    pub date: String,
    pub medicines: Vec<Medicine>,
    pub diagnosis: String,
    pub doctor_instructions: Vec<String>,
    pub upload_date: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrescriptionList {
    #[serde(default)]
    prescriptions: Vec<Prescription>,
}

#[derive(Debug, Deserialize)]
struct MedicationList {
    #[serde(default)]
    medications: Vec<Medicine>,
}

/// Upload a prescription image or PDF; the identity header names the owner.
#[instrument(skip(gateway, bytes), fields(bytes = bytes.len()))]
pub async fn upload(gateway: &Gateway, file_name: &str, bytes: Vec<u8>) -> Result<FileUploadResponse> {
    let options = RequestOptions::post().multipart(file_part(file_name, bytes), Vec::new());
    gateway.call(Endpoint::PrescriptionUpload, options).await
}

/// All prescriptions for `patient_name`.
#[instrument(skip(gateway))]
pub async fn list(gateway: &Gateway, patient_name: &str) -> Result<Vec<Prescription>> {
    let list: PrescriptionList = gateway
        .call(
            Endpoint::PrescriptionList.with([patient_name]),
            RequestOptions::get(),
        )
        .await?;
    Ok(list.prescriptions)
}

/// Medicines still within their course for `patient_name`.
#[instrument(skip(gateway))]
pub async fn active_medications(gateway: &Gateway, patient_name: &str) -> Result<Vec<Medicine>> {
    let list: MedicationList = gateway
        .call(
            Endpoint::ActiveMedications.with([patient_name]),
            RequestOptions::get(),
        )
        .await?;
    Ok(list.medications)
}

/// Delete a prescription the signed-in user owns.
#[instrument(skip(gateway))]
pub async fn delete(gateway: &Gateway, prescription_id: &str) -> Result<StatusMessage> {
    gateway
        .call(
            Endpoint::PrescriptionDelete.with([prescription_id]),
            RequestOptions::delete(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockReply, MockTransport, RequestBody};
    use crate::session::{Identity, MemoryStorage};
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (MockTransport, Gateway) {
        let mock = MockTransport::new();
        let storage = MemoryStorage::with_identity("user", &Identity::new("u-1", "ana")).unwrap();
        let gateway = mock.gateway(Arc::new(storage)).unwrap();
        (mock, gateway)
    }

    #[tokio::test]
    async fn list_unwraps_prescriptions() {
        let (mock, gateway) = setup();
        mock.on(
            Method::GET,
            "/api/prescriptions/prescriptions/Ana%20Lima",
            MockReply::json(
                200,
                json!({
                    "status": "success",
                    "prescriptions": [{
                        "_id": "p-1",
                        "user_id": "u-1",
                        "patient_name": "Ana Lima",
                        "age": "34",
                        "date": "2024-05-01",
                        "medicines": [{
                            "name": "Amoxicillin",
                            "dosage": "500mg",
                            "duration": "7 days",
                            "original_schedule_text": ["after breakfast"],
                            "scheduled_times": ["08:30"],
                            "notes": ""
                        }],
                        "diagnosis": "Sinusitis",
                        "doctor_instructions": ["Drink water"],
                        "upload_date": null,
                        "created_at": null
                    }]
                }),
            ),
        );

        let prescriptions = list(&gateway, "Ana Lima").await.unwrap();

        assert_eq!(prescriptions.len(), 1);
        assert_eq!(prescriptions[0].id, "p-1");
        assert_eq!(prescriptions[0].medicines[0].scheduled_times, vec!["08:30"]);
    }

    #[tokio::test]
    async fn active_medications_tolerates_missing_list() {
        let (mock, gateway) = setup();
        mock.on(
            Method::GET,
            "/api/prescriptions/active-medications/ana",
            MockReply::json(200, json!({"status": "success"})),
        );

        let meds = active_medications(&gateway, "ana").await.unwrap();
        assert!(meds.is_empty());
    }

    #[tokio::test]
    async fn delete_reports_access_denied() {
        let (mock, gateway) = setup();
        mock.on(
            Method::DELETE,
            "/api/prescriptions/prescription/p-2",
            MockReply::json(404, json!({"detail": "Prescription not found or access denied"})),
        );

        let err = delete(&gateway, "p-2").await.unwrap_err();
        assert_eq!(err.to_string(), "Prescription not found or access denied");
    }

    #[tokio::test]
    async fn delete_of_dot_dot_id_never_reaches_the_list_path() {
        let (mock, gateway) = setup();

        let err = delete(&gateway, "..").await.unwrap_err();

        assert!(matches!(err, crate::error::ClientError::InvalidPath(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_acknowledges_success() {
        let (mock, gateway) = setup();
        mock.on(
            Method::DELETE,
            "/api/prescriptions/prescription/p-1",
            MockReply::json(200, json!({"status": "success", "message": "Prescription deleted successfully"})),
        );

        let ack = delete(&gateway, "p-1").await.unwrap();
        assert!(ack.is_success());
    }

    #[tokio::test]
    async fn upload_is_multipart_with_identity_header() {
        let (mock, gateway) = setup();
        mock.on(
            Method::POST,
            "/api/prescriptions/upload-prescription",
            MockReply::json(200, json!({"prescription_id": "p-3"})),
        );

        let response = upload(&gateway, "scan.pdf", vec![1, 2, 3]).await.unwrap();
        assert_eq!(response.prescription_id.as_deref(), Some("p-3"));

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.headers["x-user-id"], "u-1");
        assert!(sent.headers.get(CONTENT_TYPE).is_none());
        assert!(matches!(sent.body, Some(RequestBody::Multipart { .. })));
    }
}
