// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};

use crate::dispatch::OperationContext;
use crate::error::{DocError, DocResult};
use crate::model::presentation::{SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::model::{Presentation, Shape, ShapeKind, Slide};
use crate::params::ParamBag;
use crate::registry::{HandlerRegistry, OperationHandler};

use super::common::{check_index, style_patch, Convert};

pub(crate) fn register(registry: &mut HandlerRegistry<Presentation>) {
    registry
        .register(AddSlide)
        .register(DeleteSlide)
        .register(AddShape)
        .register(ListSlides)
        .register(Convert);
}

struct AddSlide;

impl OperationHandler<Presentation> for AddSlide {
    fn operation_name(&self) -> &'static str {
        "add_slide"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Presentation>, params: &ParamBag) -> DocResult<Value> {
        let title = params.optional::<String>("title")?;
        let notes = params.optional::<String>("notes")?;
        for (name, text) in [("title", &title), ("notes", &notes)] {
            if let Some(text) = text {
                ctx.limits().check_text(name, text)?;
            }
        }
        let len = ctx.document().slides.len();
        let index = params.optional_or("index", len)?;
        if index > len {
            return Err(DocError::argument(format!(
                "index {index} is out of range (presentation has {len} slides)"
            )));
        }

        ctx.document_mut().slides.insert(
            index,
            Slide {
                title,
                notes,
                shapes: Vec::new(),
            },
        );
        ctx.mark_modified();
        Ok(json!({ "index": index, "slide_count": len + 1 }))
    }
}

struct DeleteSlide;

impl OperationHandler<Presentation> for DeleteSlide {
    fn operation_name(&self) -> &'static str {
        "delete_slide"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Presentation>, params: &ParamBag) -> DocResult<Value> {
        let index: usize = params.required("index")?;
        check_index("slide", index, ctx.document().slides.len())?;
        let removed = ctx.document_mut().slides.remove(index);
        ctx.mark_modified();
        Ok(json!({
            "deleted_title": removed.title,
            "slide_count": ctx.document().slides.len(),
        }))
    }
}

struct AddShape;

impl OperationHandler<Presentation> for AddShape {
    fn operation_name(&self) -> &'static str {
        "add_shape"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Presentation>, params: &ParamBag) -> DocResult<Value> {
        let slide: usize = params.required("slide")?;
        check_index("slide", slide, ctx.document().slides.len())?;
        let raw_kind = params.optional_or("kind", ShapeKind::TextBox.as_str().to_owned())?;
        let kind: ShapeKind = raw_kind.parse().map_err(|()| {
            DocError::argument(format!(
                "unknown shape kind '{raw_kind}' (expected one of {})",
                ShapeKind::NAMES.join(", ")
            ))
        })?;
        let text = params.optional_or("text", String::new())?;
        ctx.limits().check_text("text", &text)?;

        let x = params.optional_or("x", 100.0)?;
        let y = params.optional_or("y", 100.0)?;
        let width = params.optional_or("width", 200.0)?;
        let height = params.optional_or("height", 100.0)?;
        if x < 0.0 || y < 0.0 || width <= 0.0 || height < 0.0 {
            return Err(DocError::argument(
                "x and y must be non-negative, width positive and height non-negative",
            ));
        }
        if x + width > SLIDE_WIDTH || y + height > SLIDE_HEIGHT {
            return Err(DocError::argument(format!(
                "shape does not fit on the {SLIDE_WIDTH}x{SLIDE_HEIGHT} slide"
            )));
        }
        let (patch, warnings) = style_patch(params)?;

        let mut shape = Shape {
            kind,
            text,
            x,
            y,
            width,
            height,
            style: Default::default(),
        };
        patch.apply(&mut shape.style);
        let shapes = &mut ctx.document_mut().slides[slide].shapes;
        shapes.push(shape);
        let shape_index = shapes.len() - 1;
        ctx.mark_modified();
        Ok(json!({ "slide": slide, "shape_index": shape_index, "warnings": warnings }))
    }
}

struct ListSlides;

impl OperationHandler<Presentation> for ListSlides {
    fn operation_name(&self) -> &'static str {
        "list_slides"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Presentation>, _params: &ParamBag) -> DocResult<Value> {
        let slides = ctx
            .document()
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                json!({
                    "index": index,
                    "title": slide.title,
                    "shapes": slide.shapes.len(),
                    "text": slide.text_lines(),
                })
            })
            .collect::<Vec<_>>();
        Ok(json!({ "slide_count": slides.len(), "slides": slides }))
    }
}
