// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::Path;
use std::sync::Arc;

use axum::http::request::Parts;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{
    Extensions, ProgressNotificationParam, ProgressToken, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::common::http_header::HEADER_SESSION_ID;
use rmcp::{tool, tool_handler, tool_router, ErrorData, RoleServer, ServerHandler, ServiceExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::dispatch::{
    Dispatcher, DocumentSource, ForwardingProgress, InvokeRequest, ProgressEvent, ProgressSink,
};
use crate::engine::SaveFormat;
use crate::error::DocError;
use crate::model::{resolve_identity, DocumentKind, IdentityAccessor, SessionIdentity};
use crate::params::ParamBag;
use crate::session::parse_session_id;

use super::types::*;

#[derive(Clone)]
pub struct DocdeskMcp {
    dispatcher: Arc<Dispatcher>,
    identity: Option<Arc<dyn IdentityAccessor>>,
    identity_header: Option<String>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocdeskMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocdeskMcp")
            .field("dispatcher", &self.dispatcher)
            .field("identity", &resolve_identity(self.identity.as_deref()))
            .field("identity_header", &self.identity_header)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl DocdeskMcp {
    /// Stdio calls run as the anonymous principal.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_identity(dispatcher, None)
    }

    pub fn with_identity(
        dispatcher: Arc<Dispatcher>,
        identity: Option<Arc<dyn IdentityAccessor>>,
    ) -> Self {
        Self {
            dispatcher,
            identity,
            identity_header: None,
            tool_router: Self::tool_router(),
        }
    }

    /// Trusts `header` (set by a proxy in front of the HTTP transport) to name the caller.
    pub fn with_identity_header(mut self, header: Option<String>) -> Self {
        self.identity_header = header.map(|name| name.trim().to_ascii_lowercase());
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// The identity of the caller making this request.
    ///
    /// Over streamable HTTP the request head travels in `extensions`: the trusted identity
    /// header names a principal, otherwise the MCP session id is the caller. Without a request
    /// head (stdio) the configured accessor decides.
    fn caller(&self, extensions: &Extensions) -> SessionIdentity {
        extensions
            .get::<Parts>()
            .and_then(|parts| http_caller(parts, self.identity_header.as_deref()))
            .unwrap_or_else(|| resolve_identity(self.identity.as_deref()))
    }

    /// Load a document into a new session; pass the returned `session_id` to
    /// `document.invoke`, then `session.close` when done.
    #[tool(name = "session.open")]
    async fn session_open(
        &self,
        params: Parameters<SessionOpenParams>,
        extensions: Extensions,
    ) -> Result<Json<SessionOpenResponse>, ErrorData> {
        let SessionOpenParams { kind, path } = params.0;
        let path = self.resolve_path(&path)?;
        let session_id = self
            .dispatcher
            .sessions()
            .open_session(kind, &path, &self.caller(&extensions))
            .await
            .map_err(to_error_data)?;

        Ok(Json(SessionOpenResponse {
            session_id: session_id.into_string(),
            kind,
            source_path: Some(path.display().to_string()),
        }))
    }

    /// Start a session on a blank document of the given kind.
    #[tool(name = "session.create")]
    async fn session_create(
        &self,
        params: Parameters<SessionCreateParams>,
        extensions: Extensions,
    ) -> Result<Json<SessionOpenResponse>, ErrorData> {
        let SessionCreateParams { kind, path } = params.0;
        let path = path.map(|raw| self.resolve_path(&raw)).transpose()?;
        let sessions = self.dispatcher.sessions();
        let document = sessions.engines().blank(kind).map_err(to_error_data)?;
        let session_id = sessions
            .open_document(document, &self.caller(&extensions), path.clone())
            .map_err(to_error_data)?;

        Ok(Json(SessionOpenResponse {
            session_id: session_id.into_string(),
            kind,
            source_path: path.map(|path| path.display().to_string()),
        }))
    }

    /// Write a session's document without closing it.
    #[tool(name = "session.save")]
    async fn session_save(
        &self,
        params: Parameters<SessionSaveParams>,
        extensions: Extensions,
    ) -> Result<Json<SessionSaveResponse>, ErrorData> {
        let SessionSaveParams { session_id, output_path, format } = params.0;
        let id = parse_session_id(&session_id).map_err(to_error_data)?;
        let output_path = output_path.map(|raw| self.resolve_path(&raw)).transpose()?;
        let format = format.map(|raw| parse_save_format(&raw)).transpose()?;
        let caller = self.caller(&extensions);
        let sessions = self.dispatcher.sessions();

        let saved_to = sessions
            .save_session(&id, &caller, output_path.as_deref(), format)
            .await
            .map_err(to_error_data)?;
        let modified = sessions.session_info(&id, &caller).map_err(to_error_data)?.modified;

        Ok(Json(SessionSaveResponse {
            session_id,
            saved_to: saved_to.display().to_string(),
            modified,
        }))
    }

    /// Close a session; with `save: true` pending changes are written first.
    #[tool(name = "session.close")]
    async fn session_close(
        &self,
        params: Parameters<SessionCloseParams>,
        extensions: Extensions,
    ) -> Result<Json<SessionCloseResponse>, ErrorData> {
        let SessionCloseParams { session_id, save, output_path } = params.0;
        let id = parse_session_id(&session_id).map_err(to_error_data)?;
        let output_path = output_path.map(|raw| self.resolve_path(&raw)).transpose()?;

        let outcome = self
            .dispatcher
            .sessions()
            .close_session(&id, &self.caller(&extensions), save.unwrap_or(false), output_path.as_deref())
            .await
            .map_err(to_error_data)?;

        Ok(Json(SessionCloseResponse {
            session_id,
            saved_to: outcome.saved_to.map(|path| path.display().to_string()),
            discarded_changes: outcome.discarded_changes,
        }))
    }

    /// Report kind, dirty flag, busy state and idle time of one session.
    #[tool(name = "session.status")]
    async fn session_status(
        &self,
        params: Parameters<SessionStatusParams>,
        extensions: Extensions,
    ) -> Result<Json<SessionStatusResponse>, ErrorData> {
        let id = parse_session_id(&params.0.session_id).map_err(to_error_data)?;
        let session = self
            .dispatcher
            .sessions()
            .session_info(&id, &self.caller(&extensions))
            .map_err(to_error_data)?;
        Ok(Json(SessionStatusResponse { session }))
    }

    /// List the caller's open sessions.
    #[tool(name = "session.list")]
    async fn session_list(
        &self,
        extensions: Extensions,
    ) -> Result<Json<SessionListResponse>, ErrorData> {
        let sessions = self.dispatcher.sessions().list_sessions(&self.caller(&extensions));
        Ok(Json(SessionListResponse { sessions }))
    }

    /// List the operations `document.invoke` accepts, per document kind.
    #[tool(name = "document.operations")]
    async fn document_operations(
        &self,
        params: Parameters<OperationsParams>,
    ) -> Result<Json<OperationsResponse>, ErrorData> {
        let kinds = match params.0.kind {
            Some(kind) => vec![kind],
            None => DocumentKind::ALL.to_vec(),
        };
        let kinds = kinds
            .into_iter()
            .map(|kind| KindOperations {
                kind,
                operations: self
                    .dispatcher
                    .operation_names(kind)
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            })
            .collect();
        Ok(Json(OperationsResponse { kinds }))
    }

    /// Run one operation against a session (`session_id`) or a file (`input_path`, optionally
    /// `output_path`). With a progress token, multi-step operations notify as they go.
    #[tool(name = "document.invoke")]
    async fn document_invoke(
        &self,
        params: Parameters<InvokeParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<Json<InvokeResponse>, ErrorData> {
        let caller = self.caller(&context.extensions);
        let (sink, events) = ForwardingProgress::channel();
        let forwarder = context
            .meta
            .get_progress_token()
            .map(|token| tokio::spawn(forward_progress(context.peer.clone(), token, events)));

        let response = self.invoke(params.0, caller, sink).await;
        if let Some(forwarder) = forwarder {
            let _ = forwarder.await;
        }
        response.map(Json)
    }

    /// Runs `document.invoke` for `caller`, reporting through `sink`. The sink is dropped
    /// before returning so its receiver ends.
    async fn invoke(
        &self,
        params: InvokeParams,
        caller: SessionIdentity,
        sink: ForwardingProgress,
    ) -> Result<InvokeResponse, ErrorData> {
        let InvokeParams {
            kind,
            operation,
            session_id,
            input_path,
            output_path,
            params,
        } = params;

        let source = document_source(session_id, input_path, output_path)?;
        let request = InvokeRequest {
            kind,
            operation,
            source,
            params: ParamBag::new(params.unwrap_or_default()),
            identity: caller,
        };
        let progress = Arc::new(sink);
        let shared: Arc<dyn ProgressSink> = progress.clone();
        let outcome = self.dispatcher.invoke(request, shared).await.map_err(to_error_data)?;

        Ok(InvokeResponse {
            result: outcome.result,
            modified: outcome.modified,
            saved_to: outcome.saved_to.map(|path| path.display().to_string()),
            progress: progress.events(),
        })
    }

    fn resolve_path(&self, raw: &str) -> Result<std::path::PathBuf, ErrorData> {
        self.dispatcher.env().paths.resolve(Path::new(raw)).map_err(to_error_data)
    }
}

#[tool_handler]
impl ServerHandler for DocdeskMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Docdesk document session server (tools: session.open, session.create, session.save, session.close, session.status, session.list, document.operations, document.invoke). Open a session, invoke operations against its session_id, then close it with save=true to persist; or pass input_path to document.invoke for a one-shot call."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Error mapping and request parsing helpers for the tool handlers.
include!("server/helpers.rs");
