// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::dispatch::OperationContext;
use crate::engine::SaveFormat;
use crate::error::{DocError, DocResult};
use crate::model::{Document, DocumentType, TextStylePatch};
use crate::params::ParamBag;
use crate::registry::OperationHandler;

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("orange", "#ffa500"),
    ("purple", "#800080"),
    ("gray", "#808080"),
    ("grey", "#808080"),
];

/// Fonts the reference engine can embed.
const KNOWN_FONTS: &[&str] = &[
    "Arial",
    "Calibri",
    "Cambria",
    "Courier New",
    "Georgia",
    "Helvetica",
    "Liberation Sans",
    "Liberation Serif",
    "Times New Roman",
    "Verdana",
];

const MAX_FONT_SIZE: f64 = 409.0;

/// `#rgb`, `#rrggbb` or a named color, normalized to lowercase `#rrggbb`.
pub(crate) fn parse_color(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| name.eq_ignore_ascii_case(raw)) {
        return Some((*hex).to_owned());
    }
    let hex = raw.strip_prefix('#')?;
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(format!("#{}", hex.to_ascii_lowercase())),
        3 => Some(hex.chars().fold(String::from("#"), |mut out, ch| {
            let ch = ch.to_ascii_lowercase();
            out.push(ch);
            out.push(ch);
            out
        })),
        _ => None,
    }
}

/// Canonical name of an installed font.
pub(crate) fn lookup_font(name: &str) -> Option<&'static str> {
    let name = name.trim();
    KNOWN_FONTS.iter().copied().find(|font| font.eq_ignore_ascii_case(name))
}

/// A style patch read from `bold`, `italic`, `underline`, `font_name`, `font_size`, `color`.
///
/// An unknown font is left out of the patch and reported as a warning instead of failing.
pub(crate) fn style_patch(params: &ParamBag) -> DocResult<(TextStylePatch, Vec<String>)> {
    let mut warnings = Vec::new();
    let mut patch = TextStylePatch {
        bold: params.optional("bold")?,
        italic: params.optional("italic")?,
        underline: params.optional("underline")?,
        ..TextStylePatch::default()
    };

    if let Some(size) = params.optional::<f64>("font_size")? {
        if !(size > 0.0 && size <= MAX_FONT_SIZE) {
            return Err(DocError::argument(format!(
                "font_size must be in (0, {MAX_FONT_SIZE}], got {size}"
            )));
        }
        patch.font_size = Some(size);
    }
    if let Some(raw) = params.optional::<String>("color")? {
        let color = parse_color(&raw)
            .ok_or_else(|| DocError::argument(format!("'{raw}' is not a color")))?;
        patch.color = Some(color);
    }
    if let Some(name) = params.optional::<String>("font_name")? {
        match lookup_font(&name) {
            Some(font) => patch.font_name = Some(font.to_owned()),
            None => warnings.push(format!("font '{name}' is not installed; font left unchanged")),
        }
    }
    Ok((patch, warnings))
}

/// Fails when nothing would change; a format call without options is a caller mistake.
pub(crate) fn require_style_change(
    patch: &TextStylePatch,
    warnings: &[String],
    extra: bool,
) -> DocResult<()> {
    if patch.is_empty() && !extra && warnings.is_empty() {
        return Err(DocError::argument(
            "no formatting given (bold, italic, underline, font_name, font_size, color)",
        ));
    }
    Ok(())
}

pub(crate) fn check_index(name: &str, index: usize, len: usize) -> DocResult<()> {
    if index >= len {
        return Err(DocError::argument(format!(
            "{name} {index} is out of range (document has {len})"
        )));
    }
    Ok(())
}

/// Text parameter, checked against the configured size limit.
pub(crate) fn text_param<D: DocumentType>(
    ctx: &OperationContext<'_, D>,
    params: &ParamBag,
    name: &str,
) -> DocResult<String> {
    let text: String = params.required(name)?;
    ctx.limits().check_text(name, &text)?;
    Ok(text)
}

/// `input_paths`, resolved and bounded by the input limit.
pub(crate) fn input_paths<D: DocumentType>(
    ctx: &OperationContext<'_, D>,
    params: &ParamBag,
) -> DocResult<Vec<PathBuf>> {
    let raw: Vec<String> = params.required("input_paths")?;
    if raw.is_empty() {
        return Err(DocError::argument("input_paths must name at least one document"));
    }
    ctx.limits().check_inputs(raw.len())?;
    raw.iter().map(|path| ctx.resolve_path(path)).collect()
}

/// Loads every input of kind `D` before anything is changed.
pub(crate) fn load_inputs<D: DocumentType>(
    ctx: &OperationContext<'_, D>,
    paths: &[PathBuf],
) -> DocResult<Vec<D>> {
    paths
        .iter()
        .map(|path| {
            let document = ctx.engines().load(D::KIND, path)?;
            D::try_from_document(document)
                .map_err(|other| DocError::Load {
                    path: path.clone(),
                    reason: format!("expected {}, found {}", D::KIND, other.kind()),
                })
        })
        .collect()
}

/// Writes the current document to `output_path` in `format` (or the format its extension
/// implies). Available for every kind.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Convert;

impl<D: DocumentType + Clone> OperationHandler<D> for Convert {
    fn operation_name(&self) -> &'static str {
        "convert"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, D>, params: &ParamBag) -> DocResult<Value> {
        let output = ctx.resolve_path(&params.required_str("output_path")?)?;
        let format = match params.optional::<String>("format")? {
            Some(raw) => SaveFormat::parse(&raw)
                .ok_or_else(|| DocError::argument(format!("unknown format '{raw}'")))?,
            None => SaveFormat::from_path(&output),
        };
        let document: Document = ctx.document().clone().into_document();
        ctx.engines().save(&document, &output, format)?;
        Ok(json!({
            "output_path": output.display().to_string(),
            "format": format.as_str(),
        }))
    }
}
