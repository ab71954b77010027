//! Endpoint registry: every logical backend operation and its server path.

use strum::{Display, EnumIter};
use url::Url;

use crate::error::{ClientError, Result};

/// Feature area an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EndpointGroup {
    /// Signup, signin, current user.
    Auth,
    /// Raw file uploads.
    Upload,
    /// Chat sessions.
    Chat,
    /// Prescription records.
    Prescriptions,
    /// Medication adherence and confirmations.
    Medications,
}

/// Logical backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    Signup,
    Signin,
    CurrentUser,

    UploadFile,
    UploadPrescriptionFile,

    /// Followed by `{user_id}`.
    ChatStart,
    /// Followed by `{user_id}/{session_id}/message`.
    ChatSend,
    /// Followed by `{user_id}/{session_id}`.
    ChatHistory,
    /// Followed by `{user_id}`.
    ChatSessions,

    PrescriptionUpload,
    /// Followed by `{patient_name}`.
    PrescriptionList,
    /// Followed by `{patient_name}`.
    ActiveMedications,
    /// Followed by `{prescription_id}`.
    PrescriptionDelete,

    /// Followed by `{patient_name}`.
    Adherence,
    /// Followed by `{patient_name}`.
    Confirmations,
    /// Followed by `{patient_name}`.
    DailyStatus,
    MedicationResponse,
    /// Followed by `{patient_name}`.
    CreateTestLogs,
}

impl Endpoint {
    /// Server path relative to the base address.
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Signup => "/api/auth/signup",
            Endpoint::Signin => "/api/auth/signin",
            Endpoint::CurrentUser => "/api/auth/me",

            Endpoint::UploadFile => "/api/upload/file",
            Endpoint::UploadPrescriptionFile => "/api/upload/upload-prescription",

            Endpoint::ChatStart => "/api/chat/sessions/start",
            Endpoint::ChatSend => "/api/chat/sessions",
            Endpoint::ChatHistory => "/api/chat/history",
            Endpoint::ChatSessions => "/api/chat/sessions",

            Endpoint::PrescriptionUpload => "/api/prescriptions/upload-prescription",
            Endpoint::PrescriptionList => "/api/prescriptions/prescriptions",
            Endpoint::ActiveMedications => "/api/prescriptions/active-medications",
            Endpoint::PrescriptionDelete => "/api/prescriptions/prescription",

            Endpoint::Adherence => "/api/medications/medication-adherence",
            Endpoint::Confirmations => "/api/medications/medication-confirmations",
            Endpoint::DailyStatus => "/api/medications/medication-status",
            Endpoint::MedicationResponse => "/api/medications/medication-response",
            Endpoint::CreateTestLogs => "/api/medications/create-test-logs",
        }
    }

    /// Feature area of this endpoint.
    pub const fn group(self) -> EndpointGroup {
        match self {
            Endpoint::Signup | Endpoint::Signin | Endpoint::CurrentUser => EndpointGroup::Auth,
            Endpoint::UploadFile | Endpoint::UploadPrescriptionFile => EndpointGroup::Upload,
            Endpoint::ChatStart
            | Endpoint::ChatSend
            | Endpoint::ChatHistory
            | Endpoint::ChatSessions => EndpointGroup::Chat,
            Endpoint::PrescriptionUpload
            | Endpoint::PrescriptionList
            | Endpoint::ActiveMedications
            | Endpoint::PrescriptionDelete => EndpointGroup::Prescriptions,
            Endpoint::Adherence
            | Endpoint::Confirmations
            | Endpoint::DailyStatus
            | Endpoint::MedicationResponse
            | Endpoint::CreateTestLogs => EndpointGroup::Medications,
        }
    }

    /// Append path segments (user ids, patient names, ...) to this endpoint.
    pub fn with<I, S>(self, segments: I) -> ApiPath
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiPath {
            endpoint: self,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

/// An endpoint plus trailing path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    endpoint: Endpoint,
    segments: Vec<String>,
}

impl ApiPath {
    /// The endpoint this path targets.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Compose with `base` into an absolute URL.
    ///
    /// The base's own path is kept as a prefix. Trailing segments are
    /// percent-encoded, so a patient name containing `/` stays one segment.
    /// Empty, `.` and `..` segments have no single-segment form and are
    /// rejected with [`ClientError::InvalidPath`].
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        if let Some(bad) = self
            .segments
            .iter()
            .find(|s| matches!(s.as_str(), "" | "." | ".."))
        {
            return Err(ClientError::InvalidPath(bad.clone()));
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            path.pop_if_empty();
            path.extend(self.endpoint.path().split('/').filter(|s| !s.is_empty()));
            path.extend(self.segments.iter());
        }
        Ok(url)
    }
}

impl From<Endpoint> for ApiPath {
    fn from(endpoint: Endpoint) -> Self {
        ApiPath {
            endpoint,
            segments: Vec::new(),
        }
    }
}

impl std::fmt::Display for ApiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint.path())?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
