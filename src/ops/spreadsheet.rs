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
use crate::model::{CellRange, CellRef, CellValue, Workbook, Worksheet};
use crate::params::{json_type_name, ParamBag};
use crate::registry::{HandlerRegistry, OperationHandler};
use crate::session::parse_session_id;

use super::common::{require_style_change, style_patch, Convert};

/// Largest range a single `format` call may touch.
const MAX_FORMAT_CELLS: u64 = 100_000;
const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub(crate) fn register(registry: &mut HandlerRegistry<Workbook>) {
    registry
        .register(GetCell)
        .register(SetCell)
        .register(Format)
        .register(AddSheet)
        .register(Convert)
        .register(ImportSheet);
}

/// Index of the `sheet` parameter, or the first sheet when it is absent.
fn sheet_index(workbook: &Workbook, params: &ParamBag) -> DocResult<usize> {
    match params.optional::<String>("sheet")? {
        Some(name) => workbook.sheets.iter().position(|sheet| sheet.name == name).ok_or_else(|| {
            let known = workbook.sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
            DocError::argument(format!("no sheet named '{name}' (sheets: {})", known.join(", ")))
        }),
        None if workbook.sheets.is_empty() => Err(DocError::argument("workbook has no sheets")),
        None => Ok(0),
    }
}

fn cell_param(params: &ParamBag) -> DocResult<CellRef> {
    params
        .required_str("cell")?
        .parse()
        .map_err(|err: crate::model::CellRefError| DocError::argument(err.to_string()))
}

fn cell_value(params: &ParamBag) -> DocResult<CellValue> {
    let raw: Value = params.required("value")?;
    match raw {
        Value::Bool(value) => Ok(CellValue::Bool(value)),
        Value::Number(number) => number.as_f64().map(CellValue::Number).ok_or_else(|| {
            DocError::argument(format!("value {number} is not representable"))
        }),
        Value::String(text) => Ok(CellValue::Text(text)),
        other => Err(DocError::TypeMismatch {
            name: "value".to_owned(),
            expected: "a string, number or boolean",
            actual: json_type_name(&other),
        }),
    }
}

fn validate_sheet_name(name: &str) -> DocResult<()> {
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(DocError::argument(format!(
            "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if name.contains(FORBIDDEN_SHEET_CHARS) {
        return Err(DocError::argument(format!(
            "sheet name '{name}' contains one of [ ] : * ? / \\"
        )));
    }
    Ok(())
}

fn ensure_unique(workbook: &Workbook, name: &str) -> DocResult<()> {
    if workbook.sheets.iter().any(|sheet| sheet.name.eq_ignore_ascii_case(name)) {
        return Err(DocError::argument(format!("a sheet named '{name}' already exists")));
    }
    Ok(())
}

struct GetCell;

impl OperationHandler<Workbook> for GetCell {
    fn operation_name(&self) -> &'static str {
        "get_cell"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Workbook>, params: &ParamBag) -> DocResult<Value> {
        let cell_ref = cell_param(params)?;
        let workbook = ctx.document();
        let sheet = &workbook.sheets[sheet_index(workbook, params)?];
        let result = match sheet.cells.get(&cell_ref) {
            Some(cell) => json!({
                "sheet": sheet.name,
                "cell": cell_ref.to_string(),
                "value": cell.value.to_json(),
                "display": cell.value.display(),
                "style": cell.style,
                "number_format": cell.number_format,
            }),
            None => json!({
                "sheet": sheet.name,
                "cell": cell_ref.to_string(),
                "value": Value::Null,
                "display": "",
            }),
        };
        Ok(result)
    }
}

struct SetCell;

impl OperationHandler<Workbook> for SetCell {
    fn operation_name(&self) -> &'static str {
        "set_cell"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Workbook>, params: &ParamBag) -> DocResult<Value> {
        let cell_ref = cell_param(params)?;
        let value = cell_value(params)?;
        if let CellValue::Text(text) = &value {
            ctx.limits().check_text("value", text)?;
        }
        let number_format = params.optional::<String>("number_format")?;
        let index = sheet_index(ctx.document(), params)?;

        let sheet = &mut ctx.document_mut().sheets[index];
        let cell = sheet.cells.entry(cell_ref).or_default();
        cell.value = value;
        if number_format.is_some() {
            cell.number_format = number_format;
        }
        let sheet_name = sheet.name.clone();
        ctx.mark_modified();
        Ok(json!({ "sheet": sheet_name, "cell": cell_ref.to_string() }))
    }
}

struct Format;

impl OperationHandler<Workbook> for Format {
    fn operation_name(&self) -> &'static str {
        "format"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Workbook>, params: &ParamBag) -> DocResult<Value> {
        let range: CellRange = params
            .required_str("range")?
            .parse()
            .map_err(|err: crate::model::CellRefError| DocError::argument(err.to_string()))?;
        if range.cell_count() > MAX_FORMAT_CELLS {
            return Err(DocError::argument(format!(
                "range {range} covers {} cells (limit {MAX_FORMAT_CELLS})",
                range.cell_count()
            )));
        }
        let (patch, warnings) = style_patch(params)?;
        let number_format = params.optional::<String>("number_format")?;
        require_style_change(&patch, &warnings, number_format.is_some())?;
        let index = sheet_index(ctx.document(), params)?;

        if !patch.is_empty() || number_format.is_some() {
            let sheet = &mut ctx.document_mut().sheets[index];
            for cell_ref in range.cells() {
                let cell = sheet.cells.entry(cell_ref).or_default();
                patch.apply(&mut cell.style);
                if let Some(format) = &number_format {
                    cell.number_format = Some(format.clone());
                }
            }
            ctx.mark_modified();
        }
        Ok(json!({
            "range": range.to_string(),
            "cells": range.cell_count(),
            "warnings": warnings,
        }))
    }
}

struct AddSheet;

impl OperationHandler<Workbook> for AddSheet {
    fn operation_name(&self) -> &'static str {
        "add_sheet"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Workbook>, params: &ParamBag) -> DocResult<Value> {
        let name = params.required_str("name")?;
        validate_sheet_name(&name)?;
        ensure_unique(ctx.document(), &name)?;
        let len = ctx.document().sheets.len();
        let index = params.optional_or("index", len)?;
        if index > len {
            return Err(DocError::argument(format!(
                "index {index} is out of range (workbook has {len} sheets)"
            )));
        }

        ctx.document_mut().sheets.insert(index, Worksheet::new(name.clone()));
        ctx.mark_modified();
        Ok(json!({ "sheet": name, "index": index, "sheet_count": len + 1 }))
    }
}

/// Copies a sheet out of another spreadsheet session owned by the same caller.
struct ImportSheet;

impl OperationHandler<Workbook> for ImportSheet {
    fn operation_name(&self) -> &'static str {
        "import_sheet"
    }

    fn execute(&self, ctx: &mut OperationContext<'_, Workbook>, params: &ParamBag) -> DocResult<Value> {
        let source_id = parse_session_id(&params.required_str("source_session_id")?)?;
        let source_sheet = params.optional::<String>("sheet")?;

        let mut sheet = if ctx.session_id() == Some(&source_id) {
            pick_sheet(ctx.document(), source_sheet.as_deref())?.clone()
        } else {
            let snapshot = ctx.sessions().snapshot(&source_id, ctx.identity())?;
            let kind = snapshot.kind();
            let workbook = snapshot.get::<Workbook>().ok_or_else(|| {
                DocError::argument(format!("session '{source_id}' holds a {kind} document"))
            })?;
            pick_sheet(workbook, source_sheet.as_deref())?.clone()
        };

        if let Some(name) = params.optional::<String>("name")? {
            sheet.name = name;
        }
        validate_sheet_name(&sheet.name)?;
        ensure_unique(ctx.document(), &sheet.name)?;

        let (name, cells) = (sheet.name.clone(), sheet.cells.len());
        ctx.document_mut().sheets.push(sheet);
        ctx.mark_modified();
        Ok(json!({ "sheet": name, "cells": cells }))
    }
}

fn pick_sheet<'a>(workbook: &'a Workbook, name: Option<&str>) -> DocResult<&'a Worksheet> {
    match name {
        Some(name) => workbook
            .sheet(name)
            .ok_or_else(|| DocError::argument(format!("source has no sheet named '{name}'"))),
        None => workbook
            .sheets
            .first()
            .ok_or_else(|| DocError::argument("source workbook has no sheets")),
    }
}
