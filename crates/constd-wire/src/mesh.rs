// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The mesh message envelope exchanged between peer Runners over the
//! WebSocket transport. `type` carries either an FQFN (a step request) or the
//! literal `atmo.fnresult` (a chain-step result); `parent_id` links a result
//! back to the request that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MSG_TYPE_FN_RESULT: &str = "atmo.fnresult";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub data: Vec<u8>,
}

impl MeshMessage {
    pub fn new(message_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { message_type: message_type.into(), id: Uuid::new_v4().to_string(), parent_id: None, data }
    }

    pub fn with_parent_id(message_type: impl Into<String>, parent_id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            message_type: message_type.into(),
            id: Uuid::new_v4().to_string(),
            parent_id: Some(parent_id.into()),
            data,
        }
    }

    pub fn is_fn_result(&self) -> bool {
        self.message_type == MSG_TYPE_FN_RESULT
    }
}
