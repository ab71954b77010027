//! The signed-in user's session record.

use serde::{Deserialize, Serialize};

/// Minimal record of the authenticated user.
///
/// Signup and signin responses deserialize straight into this; the backend
/// has shipped the identifier as `user_id`, `id` and `_id` over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier, sent as the identity header.
    #[serde(alias = "id", alias = "_id")]
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Contact email, when the backend returns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Build an identity from its parts.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            email: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signin_response_deserializes() {
        let identity: Identity = serde_json::from_value(json!({
            "username": "ana",
            "email": "ana@example.com",
            "user_id": "u-1"
        }))
        .unwrap();

        assert_eq!(identity, Identity::new("u-1", "ana").with_email("ana@example.com"));
    }

    #[test]
    fn mongo_style_id_is_accepted() {
        let identity: Identity =
            serde_json::from_value(json!({"_id": "u-2", "username": "bo"})).unwrap();
        assert_eq!(identity.user_id, "u-2");
        assert_eq!(identity.email, None);
    }

    #[test]
    fn missing_identifier_is_rejected() {
        let result: Result<Identity, _> = serde_json::from_value(json!({"username": "cy"}));
        assert!(result.is_err());
    }
}
