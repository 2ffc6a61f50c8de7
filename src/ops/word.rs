// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};

use crate::dispatch::OperationContext;
use crate::error::{DocError, DocResult};
use crate::model::{Comment, Paragraph, WordDocument};
use crate::params::ParamBag;
use crate::registry::{HandlerRegistry, OperationHandler};

use super::common::{
    check_index, input_paths, load_inputs, require_style_change, style_patch, text_param, Convert,
};

pub(crate) fn register(registry: &mut HandlerRegistry<WordDocument>) {
    registry
        .register(GetText)
        .register(AddParagraph)
        .register(ReplaceText)
        .register(Format)
        .register(AddComment)
        .register(Convert)
        .register(Merge);
}

struct GetText;

impl OperationHandler<WordDocument> for GetText {
    fn operation_name(&self) -> &'static str {
        "get_text"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let doc = ctx.document();
        let text = match params.optional::<usize>("paragraph")? {
            Some(index) => {
                check_index("paragraph", index, doc.paragraphs.len())?;
                doc.paragraphs[index].text.clone()
            }
            None => doc.text(),
        };
        Ok(json!({ "text": text, "paragraph_count": doc.paragraphs.len() }))
    }
}

struct AddParagraph;

impl OperationHandler<WordDocument> for AddParagraph {
    fn operation_name(&self) -> &'static str {
        "add_paragraph"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let text = text_param(ctx, params, "text")?;
        let (patch, warnings) = style_patch(params)?;
        let len = ctx.document().paragraphs.len();
        let index = params.optional_or("index", len)?;
        if index > len {
            return Err(DocError::argument(format!(
                "index {index} is out of range (document has {len} paragraphs)"
            )));
        }

        let mut paragraph = Paragraph::new(text);
        patch.apply(&mut paragraph.style);
        let doc = ctx.document_mut();
        doc.paragraphs.insert(index, paragraph);
        // Comments anchored at or after the insertion point move with their paragraph.
        for comment in doc.comments.iter_mut().filter(|c| c.paragraph_index >= index) {
            comment.paragraph_index += 1;
        }
        let count = doc.paragraphs.len();
        ctx.mark_modified();
        Ok(json!({ "index": index, "paragraph_count": count, "warnings": warnings }))
    }
}

struct ReplaceText;

impl OperationHandler<WordDocument> for ReplaceText {
    fn operation_name(&self) -> &'static str {
        "replace_text"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let find: String = params.required("find")?;
        if find.is_empty() {
            return Err(DocError::argument("'find' must not be empty"));
        }
        let replace = text_param(ctx, params, "replace")?;
        let use_regex = params.optional_or("regex", false)?;
        let match_case = params.optional_or("match_case", true)?;

        let pattern = if use_regex { find } else { regex::escape(&find) };
        let matcher: Regex = RegexBuilder::new(&pattern)
            .case_insensitive(!match_case)
            .build()
            .map_err(|err| DocError::argument(format!("invalid pattern: {err}")))?;
        // Literal replacements must not expand `$1` style references.
        let replacement = if use_regex { replace } else { replace.replace('$', "$$") };

        let mut replacements = 0usize;
        for paragraph in &mut ctx.document_mut().paragraphs {
            let hits = matcher.find_iter(&paragraph.text).count();
            if hits > 0 {
                paragraph.text = matcher.replace_all(&paragraph.text, replacement.as_str()).into_owned();
                replacements += hits;
            }
        }
        if replacements > 0 {
            ctx.mark_modified();
        }
        Ok(json!({ "replacements": replacements }))
    }
}

struct Format;

impl OperationHandler<WordDocument> for Format {
    fn operation_name(&self) -> &'static str {
        "format"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let (patch, warnings) = style_patch(params)?;
        require_style_change(&patch, &warnings, false)?;
        let len = ctx.document().paragraphs.len();
        let range = match params.optional::<usize>("paragraph")? {
            Some(index) => {
                check_index("paragraph", index, len)?;
                index..index + 1
            }
            None => 0..len,
        };

        let formatted = range.len();
        if !patch.is_empty() && formatted > 0 {
            for paragraph in &mut ctx.document_mut().paragraphs[range] {
                patch.apply(&mut paragraph.style);
            }
            ctx.mark_modified();
        }
        Ok(json!({ "formatted": formatted, "warnings": warnings }))
    }
}

struct AddComment;

impl OperationHandler<WordDocument> for AddComment {
    fn operation_name(&self) -> &'static str {
        "add_comment"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let paragraph_index: usize = params.required("paragraph")?;
        check_index("paragraph", paragraph_index, ctx.document().paragraphs.len())?;
        let text = text_param(ctx, params, "text")?;
        let author = params
            .optional::<String>("author")?
            .filter(|author| !author.trim().is_empty())
            .unwrap_or_else(|| ctx.identity().to_string());

        let doc = ctx.document_mut();
        doc.comments.push(Comment {
            paragraph_index,
            author,
            text,
        });
        let comment_index = doc.comments.len() - 1;
        ctx.mark_modified();
        Ok(json!({ "comment_index": comment_index }))
    }
}

struct Merge;

impl OperationHandler<WordDocument> for Merge {
    fn operation_name(&self) -> &'static str {
        "merge"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, WordDocument>, params: &ParamBag) -> DocResult<Value> {
        let paths = input_paths(ctx, params)?;
        let inputs = load_inputs(ctx, &paths)?;
        let total = inputs.len() as u64;

        for (done, (path, input)) in paths.iter().zip(inputs).enumerate() {
            let doc = ctx.document_mut();
            let offset = doc.paragraphs.len();
            doc.paragraphs.extend(input.paragraphs);
            doc.comments.extend(input.comments.into_iter().map(|mut comment| {
                comment.paragraph_index += offset;
                comment
            }));
            ctx.report_progress(done as u64 + 1, Some(total), &format!("merged {}", path.display()));
        }
        ctx.mark_modified();
        Ok(json!({
            "merged": total,
            "paragraph_count": ctx.document().paragraphs.len(),
        }))
    }
}
