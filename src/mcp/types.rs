// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dispatch::ProgressEvent;
use crate::model::DocumentKind;
use crate::session::SessionInfo;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionOpenParams {
    pub kind: DocumentKind,
    /// File to load; relative paths resolve against the workspace root.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionCreateParams {
    pub kind: DocumentKind,
    /// Where `session.save` writes by default. Nothing is written on create.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionOpenResponse {
    pub session_id: String,
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionSaveParams {
    pub session_id: String,
    /// Defaults to the path the session was opened from.
    pub output_path: Option<String>,
    /// `native`, `txt`, `md` or `csv`; inferred from the extension when omitted.
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionSaveResponse {
    pub session_id: String,
    pub saved_to: String,
    pub modified: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionCloseParams {
    pub session_id: String,
    /// Persist pending changes before closing (default false: changes are discarded).
    pub save: Option<bool>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionCloseResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
    pub discarded_changes: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionStatusParams {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SessionStatusResponse {
    pub session: SessionInfo,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OperationsParams {
    /// Limit the listing to one kind.
    pub kind: Option<DocumentKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KindOperations {
    pub kind: DocumentKind,
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OperationsResponse {
    pub kinds: Vec<KindOperations>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InvokeParams {
    pub kind: DocumentKind,
    pub operation: String,
    /// Run against a resident session.
    pub session_id: Option<String>,
    /// Or load this file for the duration of the call.
    pub input_path: Option<String>,
    /// Where a path-sourced document is written when the operation modifies it.
    pub output_path: Option<String>,
    /// Operation arguments.
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct InvokeResponse {
    pub result: Value,
    pub modified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<ProgressEvent>,
}
