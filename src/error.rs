// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The error taxonomy shared by the parameter bag, registries, sessions and handlers.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::DocumentKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocError {
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: String },

    #[error("parameter '{name}' must be {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0}")]
    Argument(String),

    #[error("unknown {kind} operation '{operation}'{}", suggestion_suffix(.suggestion))]
    UnknownOperation {
        kind: DocumentKind,
        operation: String,
        suggestion: Option<String>,
    },

    // Both session errors share one message so a foreign session's existence does not leak.
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("session '{0}' not found")]
    AccessDenied(String),

    #[error("cannot load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("cannot save {path:?}: {reason}")]
    Save { path: PathBuf, reason: String },

    #[error("session limit reached ({limit} open sessions)")]
    SessionLimitReached { limit: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

impl DocError {
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Stable, wire-visible name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "MissingParameter",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::Argument(_) => "ArgumentError",
            Self::UnknownOperation { .. } => "UnknownOperation",
            Self::SessionNotFound(_) => "SessionNotFound",
            Self::AccessDenied(_) => "AccessDenied",
            Self::Load { .. } => "LoadError",
            Self::Save { .. } => "SaveError",
            Self::SessionLimitReached { .. } => "SessionLimitReached",
            Self::Internal(_) => "Internal",
        }
    }

    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Save { .. } | Self::Internal(_))
    }
}

pub type DocResult<T> = Result<T, DocError>;
