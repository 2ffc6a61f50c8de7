// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::kind::DocumentKind;
use super::ocr::OcrEngine;
use super::pdf::PdfDocument;
use super::presentation::Presentation;
use super::spreadsheet::Workbook;
use super::word::WordDocument;

/// A resident document instance of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Document {
    Word(WordDocument),
    Spreadsheet(Workbook),
    Presentation(Presentation),
    Pdf(PdfDocument),
    Ocr(OcrEngine),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Word(_) => DocumentKind::Word,
            Self::Spreadsheet(_) => DocumentKind::Spreadsheet,
            Self::Presentation(_) => DocumentKind::Presentation,
            Self::Pdf(_) => DocumentKind::Pdf,
            Self::Ocr(_) => DocumentKind::Ocr,
        }
    }

    /// An empty document of the given kind.
    pub fn blank(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Word => Self::Word(WordDocument::default()),
            DocumentKind::Spreadsheet => Self::Spreadsheet(Workbook::default()),
            DocumentKind::Presentation => Self::Presentation(Presentation::default()),
            DocumentKind::Pdf => Self::Pdf(PdfDocument::default()),
            DocumentKind::Ocr => Self::Ocr(OcrEngine::default()),
        }
    }

    pub fn get<T: DocumentType>(&self) -> Option<&T> {
        T::from_document(self)
    }

    pub fn get_mut<T: DocumentType>(&mut self) -> Option<&mut T> {
        T::from_document_mut(self)
    }
}

/// A concrete document type bound to exactly one [`DocumentKind`].
pub trait DocumentType: Sized + Send + Sync + 'static {
    const KIND: DocumentKind;

    fn from_document(document: &Document) -> Option<&Self>;
    fn from_document_mut(document: &mut Document) -> Option<&mut Self>;
    fn into_document(self) -> Document;
    fn try_from_document(document: Document) -> Result<Self, Document>;
}

macro_rules! document_type {
    ($ty:ty, $variant:ident) => {
        impl DocumentType for $ty {
            const KIND: DocumentKind = DocumentKind::$variant;

            fn from_document(document: &Document) -> Option<&Self> {
                match document {
                    Document::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_document_mut(document: &mut Document) -> Option<&mut Self> {
                match document {
                    Document::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_document(self) -> Document {
                Document::$variant(self)
            }

            fn try_from_document(document: Document) -> Result<Self, Document> {
                match document {
                    Document::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

document_type!(WordDocument, Word);
document_type!(Workbook, Spreadsheet);
document_type!(Presentation, Presentation);
document_type!(PdfDocument, Pdf);
document_type!(OcrEngine, Ocr);
