//! Raw file uploads.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{FilePart, Gateway, RequestOptions};
use crate::session::Identity;

/// Result of uploading a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUploadResponse {
    /// Stored file name.
    pub filename: String,
    /// Public URL, or `N/A` when the file was not hosted.
    pub url: String,
    /// Storage identifier.
    pub public_id: String,
    /// `image`, `raw`, ...
    pub resource_type: String,
    /// Structured data extracted from a prescription.
    pub extracted_json: Option<Value>,
    /// Plain-language summary of the extracted prescription.
    pub summary: Option<String>,
    /// Id of the prescription record created from the upload.
    pub prescription_id: Option<String>,
    /// Processing error reported alongside an otherwise successful upload.
    pub error: Option<String>,
}

/// Guess a MIME type from the file extension.
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// The multipart `file` field every upload endpoint expects.
pub fn file_part(file_name: &str, bytes: Vec<u8>) -> FilePart {
    FilePart {
        field: "file".to_string(),
        file_name: file_name.to_string(),
        bytes,
        mime: guess_mime(file_name).map(str::to_owned),
    }
}

/// Upload an arbitrary file.
#[instrument(skip(gateway, bytes), fields(bytes = bytes.len()))]
pub async fn upload_file(
    gateway: &Gateway,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<FileUploadResponse> {
    let options = RequestOptions::post().multipart(file_part(file_name, bytes), Vec::new());
    gateway.call(Endpoint::UploadFile, options).await
}

/// Upload a prescription for `identity`, who is named in a form field
/// rather than the identity header.
#[instrument(skip(gateway, identity, bytes), fields(user_id = %identity.user_id, bytes = bytes.len()))]
pub async fn upload_prescription(
    gateway: &Gateway,
    identity: &Identity,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<FileUploadResponse> {
    let options = RequestOptions::post().multipart(
        file_part(file_name, bytes),
        vec![("user_id".to_string(), identity.user_id.clone())],
    );
    gateway.call(Endpoint::UploadPrescriptionFile, options).await
}
