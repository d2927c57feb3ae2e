use serde::{Deserialize, Serialize};

use crate::pharmacies::PharmacyId;

use super::{PrescriptionId, PrescriptionStatus};

pub const DEFAULT_DISPATCH_MESSAGE: &str = "Prescription dispatched";

/// Body of `PATCH /prescriptions/{id}/status`
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct StatusUpdateInput {
    pub status: PrescriptionStatus,
}

/// Body of `POST /prescriptions/{id}/dispatch`
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchInput {
    pub pharmacy_id: PharmacyId,
}

/// Server-confirmed status after an update
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default)]
    pub prescription_id: Option<PrescriptionId>,
    pub status: PrescriptionStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct DispatchResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl DispatchResponse {
    /// Accepts `{"message": ...}`, a plain-text body, or nothing at all.
    pub fn from_body(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => Self {
                message: map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
            },
            Ok(serde_json::Value::String(text)) => Self {
                message: Some(text),
            },
            Ok(_) => Self::default(),
            Err(_) => Self {
                message: Some(body.to_string()),
            },
        }
    }

    pub fn message_or_default(self) -> String {
        self.message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPATCH_MESSAGE.to_string())
    }
}
