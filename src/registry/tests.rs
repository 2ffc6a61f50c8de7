// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};

use super::{HandlerRegistry, OperationHandler, Registries};
use crate::dispatch::OperationContext;
use crate::error::{DocError, DocResult};
use crate::model::{DocumentKind, Workbook, WordDocument};
use crate::params::ParamBag;

struct Named(&'static str);

impl OperationHandler<WordDocument> for Named {
    fn operation_name(&self) -> &'static str {
        self.0
    }

    fn execute(&self, _ctx: &mut OperationContext<'_, WordDocument>, _params: &ParamBag) -> DocResult<Value> {
        Ok(json!({ "handled_by": self.0 }))
    }
}

#[test]
fn resolves_registered_names_exactly() {
    let mut registry = HandlerRegistry::<WordDocument>::new();
    registry.register(Named("format")).register(Named("get_text"));

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("format").expect("resolve").operation_name(), "format");
    assert_eq!(registry.operation_names(), vec!["format", "get_text"]);

    let err = registry.resolve("Format").err().expect("case-sensitive");
    assert_eq!(err.code(), "UnknownOperation");
}

#[test]
fn unknown_names_carry_a_hint_but_never_fall_back() {
    let mut registry = HandlerRegistry::<WordDocument>::new();
    registry.register(Named("format"));

    let Err(DocError::UnknownOperation {
        kind,
        operation,
        suggestion,
    }) = registry.resolve("fromat")
    else {
        panic!("expected UnknownOperation");
    };
    assert_eq!(kind, DocumentKind::Word);
    assert_eq!(operation, "fromat");
    assert_eq!(suggestion.as_deref(), Some("format"));

    let Err(DocError::UnknownOperation { suggestion, .. }) = registry.resolve("explode") else {
        panic!("expected UnknownOperation");
    };
    assert_eq!(suggestion, None);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = HandlerRegistry::<WordDocument>::new();
    registry.register(Named("merge"));
    let err = registry.try_register(Named("merge")).err().expect("duplicate");
    assert_eq!(err.operation, "merge");
    assert_eq!(registry.len(), 1);
}

#[test]
#[should_panic(expected = "already registered")]
fn register_panics_on_duplicates() {
    let mut registry = HandlerRegistry::<WordDocument>::new();
    registry.register(Named("merge")).register(Named("merge"));
}

#[test]
fn empty_registry_rejects_everything() {
    let registry = HandlerRegistry::<Workbook>::new();
    assert!(registry.is_empty());
    assert_eq!(registry.kind(), DocumentKind::Spreadsheet);
    assert!(registry.resolve("format").is_err());
}

#[test]
fn builtin_registries_cover_every_kind() {
    let registries = Registries::builtin();
    for kind in DocumentKind::ALL {
        assert!(!registries.operation_names(kind).is_empty(), "{kind} has no operations");
    }
    assert!(registries.contains(DocumentKind::Spreadsheet, "format"));
    assert!(registries.contains(DocumentKind::Word, "convert"));
    assert!(!registries.contains(DocumentKind::Ocr, "convert"));
}
