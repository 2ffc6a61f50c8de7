// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Operation handlers and the per-kind registries that route operation names to them.
//!
//! Registries are filled once at startup and then only read, so they are shared behind an
//! `Arc` without any locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::dispatch::OperationContext;
use crate::error::{DocError, DocResult};
use crate::model::{DocumentKind, DocumentType, OcrEngine, PdfDocument, Presentation, Workbook, WordDocument};
use crate::params::ParamBag;

/// Implements exactly one named operation for one document type.
pub trait OperationHandler<D: DocumentType>: Send + Sync {
    fn operation_name(&self) -> &'static str;

    /// Runs the operation. A handler that mutates the document must call
    /// [`OperationContext::mark_modified`].
    fn execute(&self, ctx: &mut OperationContext<'_, D>, params: &ParamBag) -> DocResult<Value>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation '{operation}' is already registered for {kind}")]
pub struct DuplicateOperation {
    pub kind: DocumentKind,
    pub operation: &'static str,
}

pub struct HandlerRegistry<D: DocumentType> {
    handlers: HashMap<&'static str, Arc<dyn OperationHandler<D>>>,
}

impl<D: DocumentType> Default for HandlerRegistry<D> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<D: DocumentType> fmt::Debug for HandlerRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kind", &D::KIND)
            .field("operations", &self.operation_names())
            .finish()
    }
}

impl<D: DocumentType> HandlerRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> DocumentKind {
        D::KIND
    }

    pub fn try_register(
        &mut self,
        handler: impl OperationHandler<D> + 'static,
    ) -> Result<&mut Self, DuplicateOperation> {
        let operation = handler.operation_name();
        if self.handlers.contains_key(operation) {
            return Err(DuplicateOperation {
                kind: D::KIND,
                operation,
            });
        }
        self.handlers.insert(operation, Arc::new(handler));
        Ok(self)
    }

    /// Registers `handler`.
    ///
    /// # Panics
    ///
    /// On a duplicate operation name; registries are wired at startup and a clash is a bug.
    pub fn register(&mut self, handler: impl OperationHandler<D> + 'static) -> &mut Self {
        match self.try_register(handler) {
            Ok(registry) => registry,
            Err(err) => panic!("{err}"),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, operation: &str) -> DocResult<Arc<dyn OperationHandler<D>>> {
        self.handlers.get(operation).cloned().ok_or_else(|| DocError::UnknownOperation {
            kind: D::KIND,
            operation: operation.to_owned(),
            suggestion: self.suggest(operation),
        })
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.handlers.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names = self.handlers.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Closest registered name, only used to enrich the error message.
    fn suggest(&self, operation: &str) -> Option<String> {
        const MIN_RATIO: f64 = 0.7;

        let needle = operation.to_ascii_lowercase();
        self.handlers
            .keys()
            .map(|name| (name, rapidfuzz::fuzz::ratio(needle.chars(), name.chars())))
            .filter(|(_, ratio)| *ratio >= MIN_RATIO)
            .max_by(|(a_name, a), (b_name, b)| a.total_cmp(b).then_with(|| b_name.cmp(a_name)))
            .map(|(name, _)| (*name).to_owned())
    }
}

/// One registry per document kind.
#[derive(Debug, Default)]
pub struct Registries {
    pub word: HandlerRegistry<WordDocument>,
    pub spreadsheet: HandlerRegistry<Workbook>,
    pub presentation: HandlerRegistry<Presentation>,
    pub pdf: HandlerRegistry<PdfDocument>,
    pub ocr: HandlerRegistry<OcrEngine>,
}

impl Registries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registries holding every built-in operation.
    pub fn builtin() -> Self {
        let mut registries = Self::default();
        crate::ops::register_builtin(&mut registries);
        registries
    }

    pub fn operation_names(&self, kind: DocumentKind) -> Vec<&'static str> {
        match kind {
            DocumentKind::Word => self.word.operation_names(),
            DocumentKind::Spreadsheet => self.spreadsheet.operation_names(),
            DocumentKind::Presentation => self.presentation.operation_names(),
            DocumentKind::Pdf => self.pdf.operation_names(),
            DocumentKind::Ocr => self.ocr.operation_names(),
        }
    }

    pub fn contains(&self, kind: DocumentKind, operation: &str) -> bool {
        match kind {
            DocumentKind::Word => self.word.contains(operation),
            DocumentKind::Spreadsheet => self.spreadsheet.contains(operation),
            DocumentKind::Presentation => self.presentation.contains(operation),
            DocumentKind::Pdf => self.pdf.contains(operation),
            DocumentKind::Ocr => self.ocr.contains(operation),
        }
    }
}

#[cfg(test)]
mod tests;
