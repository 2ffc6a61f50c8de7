// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in operations for every document kind.
//!
//! Handlers validate all arguments before touching the document, so a failed call leaves the
//! document as it was.

mod common;
mod ocr;
mod pdf;
mod presentation;
mod spreadsheet;
mod word;

use crate::registry::Registries;

pub(crate) fn register_builtin(registries: &mut Registries) {
    word::register(&mut registries.word);
    spreadsheet::register(&mut registries.spreadsheet);
    presentation::register(&mut registries.presentation);
    pdf::register(&mut registries.pdf);
    ocr::register(&mut registries.ocr);
}
