// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The document-engine boundary.
//!
//! Parsing and rendering real office formats belongs to an external library. The crate talks
//! to it through [`DocumentEngine`]; [`JsonEngine`] is the bundled reference engine, which
//! keeps every kind as a tagged JSON file and renders the plain-text export formats.

mod export;
mod json;
mod write;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::error::{DocError, DocResult};
use crate::model::{Document, DocumentKind};

pub use json::JsonEngine;
pub use write::{write_atomic, WriteDurability};

/// Largest text export (txt, md, csv) the reference engine writes.
pub const DEFAULT_MAX_EXPORT_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    /// The engine's own lossless format.
    Native,
    Text,
    Markdown,
    Csv,
}

impl SaveFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "native" | "json" => Some(Self::Native),
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Picks the format from the file extension; anything unrecognized is native.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .unwrap_or(Self::Native)
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not a valid document: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("{path:?} holds a {actual} document, expected {expected}")]
    WrongKind {
        path: PathBuf,
        expected: DocumentKind,
        actual: DocumentKind,
    },

    #[error("{format} export would be about {estimated} bytes (limit {limit})")]
    TooLarge {
        format: SaveFormat,
        estimated: usize,
        limit: usize,
    },

    #[error("{kind} documents cannot be saved as {format}")]
    UnsupportedFormat {
        kind: DocumentKind,
        format: SaveFormat,
    },
}

/// One engine per document kind.
pub trait DocumentEngine: Send + Sync {
    fn kind(&self) -> DocumentKind;

    fn load(&self, path: &Path) -> Result<Document, EngineError>;

    fn save(&self, document: &Document, path: &Path, format: SaveFormat) -> Result<(), EngineError>;

    fn blank(&self) -> Document {
        Document::blank(self.kind())
    }
}

/// The engine set, keyed by kind. Every kind always has an engine.
#[derive(Clone)]
pub struct Engines {
    engines: BTreeMap<DocumentKind, Arc<dyn DocumentEngine>>,
}

impl fmt::Debug for Engines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engines").field("kinds", &self.engines.keys().collect::<Vec<_>>()).finish()
    }
}

impl Default for Engines {
    fn default() -> Self {
        Self::reference(WriteDurability::default(), DEFAULT_MAX_EXPORT_BYTES)
    }
}

impl Engines {
    /// The bundled JSON reference engine for every kind.
    pub fn reference(durability: WriteDurability, max_export_bytes: usize) -> Self {
        let engines = DocumentKind::ALL
            .into_iter()
            .map(|kind| {
                let engine: Arc<dyn DocumentEngine> = Arc::new(
                    JsonEngine::new(kind)
                        .with_durability(durability)
                        .with_max_export_bytes(max_export_bytes),
                );
                (kind, engine)
            })
            .collect();
        Self { engines }
    }

    /// Replaces the engine for `engine.kind()`.
    pub fn with_engine(mut self, engine: Arc<dyn DocumentEngine>) -> Self {
        self.engines.insert(engine.kind(), engine);
        self
    }

    pub fn engine(&self, kind: DocumentKind) -> DocResult<&Arc<dyn DocumentEngine>> {
        self.engines
            .get(&kind)
            .ok_or_else(|| DocError::Internal(format!("no engine registered for {kind}")))
    }

    pub fn load(&self, kind: DocumentKind, path: &Path) -> DocResult<Document> {
        self.engine(kind)?.load(path).map_err(|err| DocError::Load {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn save(&self, document: &Document, path: &Path, format: SaveFormat) -> DocResult<()> {
        self.engine(document.kind())?.save(document, path, format).map_err(|err| match err {
            EngineError::UnsupportedFormat { .. } | EngineError::TooLarge { .. } => {
                DocError::argument(err.to_string())
            }
            other => DocError::Save {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }

    pub fn blank(&self, kind: DocumentKind) -> DocResult<Document> {
        Ok(self.engine(kind)?.blank())
    }
}
