// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// MCP server helper functions:
/// error mapping, save-format parsing and document source selection.
fn to_error_data(err: DocError) -> ErrorData {
    let data = Some(serde_json::json!({ "error": err.code() }));
    match err {
        DocError::SessionNotFound(_) | DocError::AccessDenied(_) => {
            ErrorData::resource_not_found(err.to_string(), data)
        }
        DocError::Save { .. } | DocError::Internal(_) => {
            ErrorData::internal_error(err.to_string(), data)
        }
        _ => ErrorData::invalid_params(err.to_string(), data),
    }
}

fn parse_save_format(raw: &str) -> Result<SaveFormat, ErrorData> {
    SaveFormat::parse(raw).ok_or_else(|| {
        ErrorData::invalid_params(
            format!("unknown format '{raw}' (expected native, txt, md or csv)"),
            Some(serde_json::json!({ "error": "ArgumentError", "format": raw })),
        )
    })
}

/// Picks the document source for `document.invoke`.
///
/// Returns `None` when neither a session nor an input path is given, so the dispatcher can
/// report the missing source after resolving the operation.
fn document_source(
    session_id: Option<String>,
    input_path: Option<String>,
    output_path: Option<String>,
) -> Result<Option<DocumentSource>, ErrorData> {
    match (session_id, input_path) {
        (Some(_), Some(_)) => Err(ErrorData::invalid_params(
            "pass either session_id or input_path, not both",
            Some(serde_json::json!({ "error": "ArgumentError" })),
        )),
        (Some(session_id), None) => {
            if output_path.is_some() {
                return Err(ErrorData::invalid_params(
                    "output_path only applies with input_path; use session.save for sessions",
                    Some(serde_json::json!({ "error": "ArgumentError" })),
                ));
            }
            let id = parse_session_id(&session_id).map_err(to_error_data)?;
            Ok(Some(DocumentSource::Session(id)))
        }
        (None, Some(input)) => Ok(Some(DocumentSource::Path {
            input: input.into(),
            output: output_path.map(Into::into),
        })),
        (None, None) => Ok(None),
    }
}

/// Caller identity from an HTTP request head, if it names one.
fn http_caller(parts: &Parts, identity_header: Option<&str>) -> Option<SessionIdentity> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };
    if let Some(principal) = identity_header.and_then(header) {
        return Some(SessionIdentity::principal(principal));
    }
    header(HEADER_SESSION_ID).map(SessionIdentity::connection)
}

fn progress_notification(token: ProgressToken, event: ProgressEvent) -> ProgressNotificationParam {
    ProgressNotificationParam {
        progress_token: token,
        progress: event.progress as f64,
        total: event.total.map(|total| total as f64),
        message: Some(event.message),
    }
}

/// Sends each progress event to the client until the sink is dropped.
async fn forward_progress(
    peer: rmcp::Peer<RoleServer>,
    token: ProgressToken,
    mut events: UnboundedReceiver<ProgressEvent>,
) {
    while let Some(event) = events.recv().await {
        if let Err(err) = peer.notify_progress(progress_notification(token.clone(), event)).await {
            tracing::debug!(error = %err, "dropping progress notifications");
            break;
        }
    }
}
