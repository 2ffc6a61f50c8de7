// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! OCR engine operations.
//!
//! The reference backend recognizes images that carry a UTF-8 text layer; anything else is
//! reported as unrecognizable.

use base64::Engine as _;
use serde_json::{json, Value};

use crate::dispatch::OperationContext;
use crate::error::{DocError, DocResult};
use crate::model::ocr::SUPPORTED_LANGUAGES;
use crate::model::{OcrEngine, Recognition};
use crate::params::ParamBag;
use crate::registry::{HandlerRegistry, OperationHandler};

pub(crate) fn register(registry: &mut HandlerRegistry<OcrEngine>) {
    registry.register(GetSettings).register(SetLanguage).register(Recognize);
}

struct GetSettings;

impl OperationHandler<OcrEngine> for GetSettings {
    fn operation_name(&self) -> &'static str {
        "get_settings"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, OcrEngine>, _params: &ParamBag) -> DocResult<Value> {
        let settings = &ctx.document().settings;
        Ok(json!({
            "language": settings.language,
            "preserve_whitespace": settings.preserve_whitespace,
            "supported_languages": SUPPORTED_LANGUAGES,
        }))
    }
}

struct SetLanguage;

impl OperationHandler<OcrEngine> for SetLanguage {
    fn operation_name(&self) -> &'static str {
        "set_language"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, OcrEngine>, params: &ParamBag) -> DocResult<Value> {
        let language = params.required_str("language")?.trim().to_ascii_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(DocError::argument(format!(
                "unsupported language '{language}' (supported: {})",
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }
        let preserve_whitespace = params.optional::<bool>("preserve_whitespace")?;

        let settings = &mut ctx.document_mut().settings;
        settings.language = language.clone();
        if let Some(preserve) = preserve_whitespace {
            settings.preserve_whitespace = preserve;
        }
        let preserve = settings.preserve_whitespace;
        ctx.mark_modified();
        Ok(json!({ "language": language, "preserve_whitespace": preserve }))
    }
}

struct Recognize;

impl OperationHandler<OcrEngine> for Recognize {
    fn operation_name(&self) -> &'static str {
        "recognize"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, OcrEngine>, params: &ParamBag) -> DocResult<Value> {
        let bytes = match (
            params.optional::<String>("image_path")?,
            params.optional::<String>("image_base64")?,
        ) {
            (Some(_), Some(_)) => {
                return Err(DocError::argument("pass either image_path or image_base64, not both"))
            }
            (Some(raw), None) => {
                let path = ctx.resolve_path(&raw)?;
                std::fs::read(&path).map_err(|err| DocError::Load {
                    path,
                    reason: err.to_string(),
                })?
            }
            (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|err| DocError::argument(format!("image_base64 is not valid base64: {err}")))?,
            (None, None) => return Err(DocError::argument("pass image_path or image_base64")),
        };
        if bytes.len() > ctx.limits().max_text_bytes {
            return Err(DocError::argument(format!(
                "image is {} bytes (limit {})",
                bytes.len(),
                ctx.limits().max_text_bytes
            )));
        }
        let raw_text = String::from_utf8(bytes)
            .map_err(|_| DocError::argument("image has no recognizable text layer"))?;

        let settings = ctx.document().settings.clone();
        let text = if settings.preserve_whitespace {
            raw_text
        } else {
            normalize_whitespace(&raw_text)
        };
        let recognition = Recognition {
            language: settings.language,
            lines: text.lines().filter(|line| !line.trim().is_empty()).count(),
            text,
        };
        let result = json!({
            "language": recognition.language,
            "text": recognition.text,
            "lines": recognition.lines,
        });
        ctx.document_mut().last_result = Some(recognition);
        ctx.mark_modified();
        Ok(result)
    }
}

/// Collapses runs of blanks inside lines and drops empty lines.
fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
