// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document model, identities and ids.
//!
//! The document types mirror what the external engine hands out: plain in-memory objects
//! that handlers mutate in place while a session holds them.

pub mod document;
pub mod identity;
pub mod ids;
pub mod kind;
pub mod ocr;
pub mod pdf;
pub mod presentation;
pub mod spreadsheet;
pub mod style;
pub mod word;

pub use document::{Document, DocumentType};
pub use identity::{resolve_identity, IdentityAccessor, SessionIdentity, StaticIdentity};
pub use ids::{Id, IdError, SessionId};
pub use kind::{DocumentKind, ParseDocumentKindError};
pub use ocr::{OcrEngine, OcrSettings, Recognition};
pub use pdf::{Annotation, AnnotationKind, PdfDocument, PdfPage};
pub use presentation::{Presentation, Shape, ShapeKind, Slide};
pub use spreadsheet::{Cell, CellRange, CellRef, CellRefError, CellValue, Workbook, Worksheet};
pub use style::{TextStyle, TextStylePatch};
pub use word::{Comment, Paragraph, WordDocument};
