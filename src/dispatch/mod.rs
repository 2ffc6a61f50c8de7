// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Routes `(kind, operation, params, source)` to a handler and runs it.

mod context;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::engine::SaveFormat;
use crate::error::{DocError, DocResult};
use crate::model::{DocumentKind, DocumentType, SessionId, SessionIdentity};
use crate::params::ParamBag;
use crate::registry::{OperationHandler, Registries};
use crate::session::{run_blocking, SessionManager};

pub use context::{
    OperationContext, OperationEnv, OperationLimits, PathPolicy, DEFAULT_MAX_INPUTS,
    DEFAULT_MAX_TEXT_BYTES,
};
pub use progress::{ForwardingProgress, NoProgress, ProgressEvent, ProgressSink, RecordingProgress};

/// Where the document for one call comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A resident session document.
    Session(SessionId),
    /// A file loaded for this call only. A modified document is written to `output`, or back
    /// to `input` when no output is given.
    Path {
        input: PathBuf,
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub kind: DocumentKind,
    pub operation: String,
    pub source: Option<DocumentSource>,
    pub params: ParamBag,
    pub identity: SessionIdentity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOutcome {
    pub result: Value,
    pub modified: bool,
    pub saved_to: Option<PathBuf>,
}

pub struct Dispatcher {
    registries: Arc<Registries>,
    sessions: Arc<SessionManager>,
    env: Arc<OperationEnv>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registries", &self.registries)
            .field("sessions", &self.sessions)
            .field("env", &self.env)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(registries: Arc<Registries>, sessions: Arc<SessionManager>) -> Self {
        Self::with_env(registries, sessions, OperationEnv::default())
    }

    pub fn with_env(
        registries: Arc<Registries>,
        sessions: Arc<SessionManager>,
        env: OperationEnv,
    ) -> Self {
        Self {
            registries,
            sessions,
            env: Arc::new(env),
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn env(&self) -> &OperationEnv {
        &self.env
    }

    pub fn operation_names(&self, kind: DocumentKind) -> Vec<&'static str> {
        self.registries.operation_names(kind)
    }

    pub async fn invoke(
        &self,
        request: InvokeRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> DocResult<InvokeOutcome> {
        let InvokeRequest {
            kind,
            operation,
            source,
            params,
            identity,
        } = request;
        debug!(kind = %kind, operation = %operation, "dispatching operation");

        let outcome = match kind {
            DocumentKind::Word => {
                let handler = self.registries.word.resolve(&operation)?;
                self.run(handler, source, params, identity, progress).await
            }
            DocumentKind::Spreadsheet => {
                let handler = self.registries.spreadsheet.resolve(&operation)?;
                self.run(handler, source, params, identity, progress).await
            }
            DocumentKind::Presentation => {
                let handler = self.registries.presentation.resolve(&operation)?;
                self.run(handler, source, params, identity, progress).await
            }
            DocumentKind::Pdf => {
                let handler = self.registries.pdf.resolve(&operation)?;
                self.run(handler, source, params, identity, progress).await
            }
            DocumentKind::Ocr => {
                let handler = self.registries.ocr.resolve(&operation)?;
                self.run(handler, source, params, identity, progress).await
            }
        };

        match &outcome {
            Ok(done) => debug!(kind = %kind, operation = %operation, modified = done.modified, "operation finished"),
            Err(err) => debug!(kind = %kind, operation = %operation, error = %err, code = err.code(), "operation failed"),
        }
        outcome
    }

    async fn run<D: DocumentType>(
        &self,
        handler: Arc<dyn OperationHandler<D>>,
        source: Option<DocumentSource>,
        params: ParamBag,
        identity: SessionIdentity,
        progress: Arc<dyn ProgressSink>,
    ) -> DocResult<InvokeOutcome> {
        let source = source.ok_or_else(|| {
            DocError::argument(format!(
                "'{}' needs a document: pass session_id or input_path",
                handler.operation_name()
            ))
        })?;
        let sessions = Arc::clone(&self.sessions);
        let env = Arc::clone(&self.env);

        match source {
            DocumentSource::Session(id) => {
                let mut lease = sessions.acquire(&id, &identity).await?;
                // Fail before touching the blocking pool when the kinds disagree.
                lease.get::<D>()?;
                run_blocking(move || {
                    let source_path = lease.source_path().map(PathBuf::from);
                    let document = lease.get_mut::<D>()?;
                    let mut ctx = OperationContext::new(document, &sessions, &identity, &env)
                        .with_session(&id)
                        .with_source_path(source_path.as_deref())
                        .with_progress(progress.as_ref());
                    let result = handler.execute(&mut ctx, &params);
                    let modified = ctx.is_modified();
                    if modified {
                        lease.mark_modified();
                    }
                    Ok(InvokeOutcome {
                        result: result?,
                        modified,
                        saved_to: None,
                    })
                })
                .await
            }
            DocumentSource::Path { input, output } => {
                let input = env.paths.resolve(&input)?;
                let output = output.map(|path| env.paths.resolve(&path)).transpose()?;
                run_blocking(move || {
                    let engines = sessions.engines();
                    let mut document = engines.load(D::KIND, &input)?;
                    let typed = D::from_document_mut(&mut document).ok_or_else(|| {
                        DocError::Internal(format!("engine loaded the wrong kind from {}", input.display()))
                    })?;
                    let mut ctx = OperationContext::new(typed, &sessions, &identity, &env)
                        .with_source_path(Some(input.as_path()))
                        .with_progress(progress.as_ref());
                    let result = handler.execute(&mut ctx, &params)?;
                    if !ctx.is_modified() {
                        return Ok(InvokeOutcome {
                            result,
                            modified: false,
                            saved_to: None,
                        });
                    }
                    let target = output.unwrap_or_else(|| input.clone());
                    engines.save(&document, &target, SaveFormat::Native)?;
                    Ok(InvokeOutcome {
                        result,
                        modified: true,
                        saved_to: Some(target),
                    })
                })
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests;
