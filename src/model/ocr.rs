// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// A configured recognition engine; the "document" of the OCR kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrEngine {
    pub settings: OcrSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<Recognition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Lowercase language code, e.g. `eng`.
    pub language: String,
    pub preserve_whitespace: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_owned(),
            preserve_whitespace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recognition {
    pub language: String,
    pub text: String,
    pub lines: usize,
}

/// Languages the recognizer ships models for.
pub const SUPPORTED_LANGUAGES: [&str; 8] = ["eng", "deu", "fra", "spa", "ita", "por", "nld", "pol"];
