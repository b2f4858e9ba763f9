//! Group invite payloads, as carried by join links and QR codes.
//!
//! The wire form is base64-encoded JSON:
//! `{"type":"bundleflow_group","groupId":..,"groupName":..,"inviter":..,"ts":..}`.

use crate::constants::INVITE_TYPE;
use crate::core::errors::BundleflowError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvitePayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub group_id: String,
    pub group_name: String,
    pub inviter: String,
    /// Issue time in milliseconds since the Unix epoch.
    pub ts: i64,
}

impl InvitePayload {
    pub fn new(group_id: &str, group_name: &str, inviter: &str) -> Self {
        InvitePayload {
            kind: INVITE_TYPE.to_string(),
            group_id: group_id.to_string(),
            group_name: group_name.to_string(),
            inviter: inviter.to_string(),
            ts: Utc::now().timestamp_millis(),
        }
    }

    pub fn encode(&self) -> Result<String, BundleflowError> {
        let json = serde_json::to_vec(self).map_err(|e| BundleflowError::MalformedPayload(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Decode and validate an invite. Rejects without side effects.
    pub fn decode(encoded: &str) -> Result<Self, BundleflowError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            warn!("Invite is not valid base64: {}", e);
            BundleflowError::MalformedPayload(format!("invite is not base64: {}", e))
        })?;
        let payload: InvitePayload = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Invite is not a valid payload: {}", e);
            BundleflowError::MalformedPayload(format!("invite is not a valid payload: {}", e))
        })?;

        if payload.kind != INVITE_TYPE || payload.group_id.trim().is_empty() {
            warn!("Invite has type {:?} and group {:?}", payload.kind, payload.group_id);
            return Err(BundleflowError::InvalidInvite);
        }
        Ok(payload)
    }
}
