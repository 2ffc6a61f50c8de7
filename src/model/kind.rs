// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The category of a document; selects the handler registry and the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[serde(alias = "word_processing", alias = "docx")]
    Word,
    #[serde(alias = "excel", alias = "xlsx")]
    Spreadsheet,
    #[serde(alias = "powerpoint", alias = "pptx")]
    Presentation,
    Pdf,
    Ocr,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Word,
        DocumentKind::Spreadsheet,
        DocumentKind::Presentation,
        DocumentKind::Pdf,
        DocumentKind::Ocr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::Pdf => "pdf",
            Self::Ocr => "ocr",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document kind: {0}")]
pub struct ParseDocumentKindError(String);

impl FromStr for DocumentKind {
    type Err = ParseDocumentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "word_processing" | "docx" => Ok(Self::Word),
            "spreadsheet" | "excel" | "xlsx" => Ok(Self::Spreadsheet),
            "presentation" | "powerpoint" | "pptx" => Ok(Self::Presentation),
            "pdf" => Ok(Self::Pdf),
            "ocr" => Ok(Self::Ocr),
            _ => Err(ParseDocumentKindError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentKind;

    #[test]
    fn aliases_deserialize_to_canonical_kinds() {
        let kind: DocumentKind = serde_json::from_str("\"excel\"").expect("kind");
        assert_eq!(kind, DocumentKind::Spreadsheet);
        let kind: DocumentKind = serde_json::from_str("\"powerpoint\"").expect("kind");
        assert_eq!(kind, DocumentKind::Presentation);
        assert_eq!(serde_json::to_string(&DocumentKind::Word).expect("json"), "\"word\"");
    }

    #[test]
    fn from_str_matches_wire_names() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.as_str().parse::<DocumentKind>().expect("parse"), kind);
        }
        assert!("odt".parse::<DocumentKind>().is_err());
    }
}
