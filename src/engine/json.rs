// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::Path;

use crate::model::{Document, DocumentKind};

use super::write::{write_atomic, WriteDurability};
use super::{export, DocumentEngine, EngineError, SaveFormat, DEFAULT_MAX_EXPORT_BYTES};

/// Reference engine: documents are stored as `{"kind": ..., "content": ...}` JSON.
#[derive(Debug, Clone)]
pub struct JsonEngine {
    kind: DocumentKind,
    durability: WriteDurability,
    max_export_bytes: usize,
}

impl JsonEngine {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            durability: WriteDurability::default(),
            max_export_bytes: DEFAULT_MAX_EXPORT_BYTES,
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_max_export_bytes(mut self, max_export_bytes: usize) -> Self {
        self.max_export_bytes = max_export_bytes;
        self
    }
}

impl DocumentEngine for JsonEngine {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn load(&self, path: &Path) -> Result<Document, EngineError> {
        let bytes = fs::read(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Document =
            serde_json::from_slice(&bytes).map_err(|err| EngineError::Invalid {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        if document.kind() != self.kind {
            return Err(EngineError::WrongKind {
                path: path.to_path_buf(),
                expected: self.kind,
                actual: document.kind(),
            });
        }
        Ok(document)
    }

    fn save(&self, document: &Document, path: &Path, format: SaveFormat) -> Result<(), EngineError> {
        if document.kind() != self.kind {
            return Err(EngineError::UnsupportedFormat {
                kind: document.kind(),
                format,
            });
        }
        let contents = match format {
            SaveFormat::Native => {
                let mut json =
                    serde_json::to_vec_pretty(document).map_err(|err| EngineError::Invalid {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    })?;
                json.push(b'\n');
                json
            }
            other => export::render(document, other, self.max_export_bytes)?.into_bytes(),
        };
        write_atomic(path, &contents, self.durability).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
