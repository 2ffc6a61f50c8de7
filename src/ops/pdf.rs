// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};

use crate::dispatch::OperationContext;
use crate::engine::SaveFormat;
use crate::error::{DocError, DocResult};
use crate::model::{Annotation, AnnotationKind, Document, PdfDocument};
use crate::params::ParamBag;
use crate::registry::{HandlerRegistry, OperationHandler};

use super::common::{check_index, input_paths, load_inputs, text_param, Convert};

pub(crate) fn register(registry: &mut HandlerRegistry<PdfDocument>) {
    registry
        .register(GetText)
        .register(AddAnnotation)
        .register(Merge)
        .register(Split)
        .register(Convert);
}

struct GetText;

impl OperationHandler<PdfDocument> for GetText {
    fn operation_name(&self) -> &'static str {
        "get_text"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, PdfDocument>, params: &ParamBag) -> DocResult<Value> {
        let doc = ctx.document();
        let text = match params.optional::<usize>("page")? {
            Some(page) => {
                check_index("page", page, doc.pages.len())?;
                doc.pages[page].text.clone()
            }
            None => doc.pages.iter().map(|page| page.text.as_str()).collect::<Vec<_>>().join("\n"),
        };
        Ok(json!({ "text": text, "page_count": doc.pages.len() }))
    }
}

struct AddAnnotation;

impl OperationHandler<PdfDocument> for AddAnnotation {
    fn operation_name(&self) -> &'static str {
        "add_annotation"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, PdfDocument>, params: &ParamBag) -> DocResult<Value> {
        let page: usize = params.required("page")?;
        check_index("page", page, ctx.document().pages.len())?;
        let text = text_param(ctx, params, "text")?;
        let raw_kind = params.optional_or("kind", "note".to_owned())?;
        let kind = AnnotationKind::parse(&raw_kind).ok_or_else(|| {
            DocError::argument(format!(
                "unknown annotation kind '{raw_kind}' (expected note, highlight or free_text)"
            ))
        })?;
        let x = params.optional_or("x", 0.0)?;
        let y = params.optional_or("y", 0.0)?;
        let target = &ctx.document().pages[page];
        if !(0.0..=target.width).contains(&x) || !(0.0..=target.height).contains(&y) {
            return Err(DocError::argument(format!(
                "position ({x}, {y}) is outside the {}x{} page",
                target.width, target.height
            )));
        }
        let author = params
            .optional::<String>("author")?
            .filter(|author| !author.trim().is_empty())
            .or_else(|| (!ctx.identity().is_anonymous()).then(|| ctx.identity().to_string()));

        let annotations = &mut ctx.document_mut().pages[page].annotations;
        annotations.push(Annotation {
            kind,
            text,
            x,
            y,
            author,
        });
        let annotation_index = annotations.len() - 1;
        ctx.mark_modified();
        Ok(json!({ "page": page, "annotation_index": annotation_index }))
    }
}

struct Merge;

impl OperationHandler<PdfDocument> for Merge {
    fn operation_name(&self) -> &'static str {
        "merge"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, PdfDocument>, params: &ParamBag) -> DocResult<Value> {
        let paths = input_paths(ctx, params)?;
        let inputs = load_inputs(ctx, &paths)?;
        let total = inputs.len() as u64;

        for (done, (path, input)) in paths.iter().zip(inputs).enumerate() {
            ctx.document_mut().pages.extend(input.pages);
            ctx.report_progress(done as u64 + 1, Some(total), &format!("merged {}", path.display()));
        }
        ctx.mark_modified();
        Ok(json!({ "merged": total, "page_count": ctx.document().pages.len() }))
    }
}

/// Writes consecutive page chunks to `output_dir` as separate documents.
struct Split;

impl OperationHandler<PdfDocument> for Split {
    fn operation_name(&self) -> &'static str {
        "split"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, PdfDocument>, params: &ParamBag) -> DocResult<Value> {
        let output_dir = ctx.resolve_path(&params.required_str("output_dir")?)?;
        let pages_per_file: usize = params.optional_or("pages_per_file", 1)?;
        if pages_per_file == 0 {
            return Err(DocError::argument("pages_per_file must be at least 1"));
        }
        let doc = ctx.document();
        if doc.pages.is_empty() {
            return Err(DocError::argument("document has no pages to split"));
        }
        let stem = ctx
            .source_path()
            .and_then(|path| path.file_stem())
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
            .to_owned();

        let chunks = doc.pages.chunks(pages_per_file).collect::<Vec<_>>();
        let total = chunks.len() as u64;
        let mut files = Vec::with_capacity(chunks.len());
        for (n, pages) in chunks.into_iter().enumerate() {
            let part = Document::Pdf(PdfDocument {
                pages: pages.to_vec(),
                metadata: doc.metadata.clone(),
            });
            let path = output_dir.join(format!("{stem}_part{}.pdf", n + 1));
            ctx.engines().save(&part, &path, SaveFormat::Native)?;
            ctx.report_progress(n as u64 + 1, Some(total), &format!("wrote {}", path.display()));
            files.push(path.display().to_string());
        }
        Ok(json!({ "files": files }))
    }
}
