//! API key records and the request bodies used to mutate them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{WIRE_DATETIME_FORMAT, lenient_datetime, null_as_default};
use crate::errors::{Error, Result};
use crate::types::ApiKeyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiKeyStatus {
    Active,
    Revoked,
    Expired,
    Unused,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ApiKeyStatus {
    /// The status an explicit toggle moves a key to: active keys are revoked, anything
    /// else is reactivated.
    pub fn toggled(self) -> Self {
        match self {
            ApiKeyStatus::Active => ApiKeyStatus::Revoked,
            _ => ApiKeyStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: ApiKeyId,
    #[serde(default)]
    pub api_key_value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApiKeyStatus,
    #[serde(default, with = "lenient_datetime")]
    pub expires_at: Option<NaiveDateTime>,
    #[serde(default, with = "lenient_datetime")]
    pub last_used_at: Option<NaiveDateTime>,
    #[serde(default, with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /admin/apikeys` and `PUT /admin/apikeys/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Body of `PUT /admin/apikeys/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiKeyStatusUpdate {
    pub status: ApiKeyStatus,
}

/// Form state behind the create and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyDraft {
    pub description: String,
    pub expires_at: Option<NaiveDateTime>,
}

impl ApiKeyDraft {
    /// Validate the draft and build the wire body.
    ///
    /// The description is mandatory. The expiry is sent as `YYYY-MM-DD HH:mm:ss` and left
    /// out entirely when unset.
    pub fn to_request(&self) -> Result<ApiKeyRequest> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::Validation {
                message: "Please enter an API key description".to_string(),
            });
        }

        Ok(ApiKeyRequest {
            description: description.to_string(),
            expires_at: self.expires_at.map(|ts| ts.format(WIRE_DATETIME_FORMAT).to_string()),
        })
    }
}

/// Edit dialog state: the key being edited plus its editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyEdit {
    pub id: ApiKeyId,
    pub api_key_value: String,
    pub draft: ApiKeyDraft,
}

impl From<&ApiKey> for ApiKeyEdit {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id.clone(),
            api_key_value: key.api_key_value.clone(),
            draft: ApiKeyDraft {
                description: key.description.clone().unwrap_or_default(),
                expires_at: key.expires_at,
            },
        }
    }
}
