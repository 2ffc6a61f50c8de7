// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Component, Path, PathBuf};

use crate::engine::Engines;
use crate::error::{DocError, DocResult};
use crate::model::{DocumentType, SessionId, SessionIdentity};
use crate::session::SessionManager;

use super::progress::{NoProgress, ProgressSink};

pub const DEFAULT_MAX_INPUTS: usize = 32;
pub const DEFAULT_MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Size limits handlers enforce on their inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationLimits {
    /// Most files a single merge (or similar) may read.
    pub max_inputs: usize,
    /// Longest text payload a handler accepts or produces in one call.
    pub max_text_bytes: usize,
}

impl Default for OperationLimits {
    fn default() -> Self {
        Self {
            max_inputs: DEFAULT_MAX_INPUTS,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

impl OperationLimits {
    pub fn check_inputs(&self, count: usize) -> DocResult<()> {
        if count > self.max_inputs {
            return Err(DocError::argument(format!(
                "too many inputs: {count} (limit {})",
                self.max_inputs
            )));
        }
        Ok(())
    }

    pub fn check_text(&self, name: &str, text: &str) -> DocResult<()> {
        if text.len() > self.max_text_bytes {
            return Err(DocError::argument(format!(
                "'{name}' is {} bytes (limit {})",
                text.len(),
                self.max_text_bytes
            )));
        }
        Ok(())
    }
}

/// Resolves client-supplied file paths.
///
/// `..` components are always rejected. With a workspace root, relative paths resolve against
/// it and absolute paths must stay inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPolicy {
    root: Option<PathBuf>,
}

impl PathPolicy {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn resolve(&self, raw: &Path) -> DocResult<PathBuf> {
        if raw.as_os_str().is_empty() {
            return Err(DocError::argument("path must not be empty"));
        }
        if raw.components().any(|component| matches!(component, Component::ParentDir)) {
            return Err(DocError::argument(format!(
                "path {raw:?} must not contain '..'"
            )));
        }
        let Some(root) = self.root.as_deref() else {
            return Ok(raw.to_path_buf());
        };
        if raw.is_relative() {
            return Ok(root.join(raw));
        }
        if raw.starts_with(root) {
            Ok(raw.to_path_buf())
        } else {
            Err(DocError::argument(format!(
                "path {raw:?} is outside the workspace"
            )))
        }
    }

    pub fn resolve_str(&self, raw: &str) -> DocResult<PathBuf> {
        self.resolve(Path::new(raw.trim()))
    }
}

/// Per-call settings shared by every operation.
#[derive(Debug, Clone, Default)]
pub struct OperationEnv {
    pub limits: OperationLimits,
    pub paths: PathPolicy,
}

/// Everything one handler invocation may touch.
///
/// The context lives exactly as long as the call; handlers cannot keep it.
pub struct OperationContext<'a, D: DocumentType> {
    document: &'a mut D,
    sessions: &'a SessionManager,
    identity: &'a SessionIdentity,
    env: &'a OperationEnv,
    session_id: Option<&'a SessionId>,
    source_path: Option<&'a Path>,
    progress: &'a dyn ProgressSink,
    modified: bool,
}

impl<'a, D: DocumentType> OperationContext<'a, D> {
    pub fn new(
        document: &'a mut D,
        sessions: &'a SessionManager,
        identity: &'a SessionIdentity,
        env: &'a OperationEnv,
    ) -> Self {
        Self {
            document,
            sessions,
            identity,
            env,
            session_id: None,
            source_path: None,
            progress: &NoProgress,
            modified: false,
        }
    }

    pub fn with_session(mut self, session_id: &'a SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_source_path(mut self, source_path: Option<&'a Path>) -> Self {
        self.source_path = source_path;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn document(&self) -> &D {
        self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        self.document
    }

    pub fn sessions(&self) -> &SessionManager {
        self.sessions
    }

    pub fn engines(&self) -> &Engines {
        self.sessions.engines()
    }

    pub fn identity(&self) -> &SessionIdentity {
        self.identity
    }

    /// The session being operated on; `None` for single-call path invocations.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path
    }

    pub fn limits(&self) -> &OperationLimits {
        &self.env.limits
    }

    /// Resolves a client path through the workspace policy.
    pub fn resolve_path(&self, raw: &str) -> DocResult<PathBuf> {
        self.env.paths.resolve_str(raw)
    }

    pub fn report_progress(&self, progress: u64, total: Option<u64>, message: &str) {
        self.progress.report(progress, total, message);
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
