// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};

use super::{
    DocumentSource, Dispatcher, InvokeRequest, NoProgress, PathPolicy, ProgressSink,
    RecordingProgress,
};
use crate::dispatch::OperationEnv;
use crate::engine::{Engines, WriteDurability};
use crate::error::DocError;
use crate::model::{Document, DocumentKind, Paragraph, SessionIdentity, WordDocument};
use crate::params::ParamBag;
use crate::registry::Registries;
use crate::session::{SessionConfig, SessionManager};
use crate::test_utils::{write_document, TempDir};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(Registries::builtin()),
        Arc::new(SessionManager::new(Engines::default(), SessionConfig::default())),
    )
}

fn owner() -> SessionIdentity {
    SessionIdentity::principal("owner")
}

fn request(kind: DocumentKind, operation: &str, source: Option<DocumentSource>, params: Value) -> InvokeRequest {
    InvokeRequest {
        kind,
        operation: operation.to_owned(),
        source,
        params: ParamBag::from_value(params).expect("params"),
        identity: owner(),
    }
}

fn no_progress() -> Arc<dyn ProgressSink> {
    Arc::new(NoProgress)
}

fn letter(lines: &[&str]) -> Document {
    let mut doc = WordDocument::default();
    doc.paragraphs.extend(lines.iter().map(|line| Paragraph::new(*line)));
    Document::Word(doc)
}

#[tokio::test]
async fn unknown_operations_fail_before_the_source_is_checked() {
    let err = dispatcher()
        .invoke(request(DocumentKind::Pdf, "explode", None, json!({})), no_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, DocError::UnknownOperation { kind: DocumentKind::Pdf, .. }), "{err:?}");
}

#[tokio::test]
async fn a_missing_source_is_an_argument_error() {
    let err = dispatcher()
        .invoke(
            request(DocumentKind::Word, "convert", None, json!({"output_path": "x.txt"})),
            no_progress(),
        )
        .await
        .unwrap_err();
    let DocError::Argument(message) = err else {
        panic!("expected ArgumentError, got {err:?}");
    };
    assert!(message.contains("session_id") && message.contains("input_path"), "{message}");
}

#[tokio::test]
async fn session_calls_mutate_the_resident_document_and_set_dirty() {
    let dispatcher = dispatcher();
    let id = dispatcher.sessions().open_document(letter(&["a"]), &owner(), None).expect("open");
    let source = Some(DocumentSource::Session(id.clone()));

    let outcome = dispatcher
        .invoke(request(DocumentKind::Word, "get_text", source.clone(), json!({})), no_progress())
        .await
        .expect("read");
    assert!(!outcome.modified);
    assert!(!dispatcher.sessions().session_info(&id, &owner()).expect("info").modified);

    let outcome = dispatcher
        .invoke(
            request(DocumentKind::Word, "add_paragraph", source.clone(), json!({"text": "b"})),
            no_progress(),
        )
        .await
        .expect("write");
    assert!(outcome.modified);
    assert_eq!(outcome.saved_to, None);
    assert!(dispatcher.sessions().session_info(&id, &owner()).expect("info").modified);

    let outcome = dispatcher
        .invoke(request(DocumentKind::Word, "get_text", source, json!({})), no_progress())
        .await
        .expect("read again");
    assert_eq!(outcome.result["text"], "a\nb");
}

#[tokio::test]
async fn session_errors_and_kind_mismatches_propagate() {
    let dispatcher = dispatcher();
    let id = dispatcher.sessions().open_document(letter(&[]), &owner(), None).expect("open");

    let err = dispatcher
        .invoke(
            request(DocumentKind::Spreadsheet, "get_cell", Some(DocumentSource::Session(id.clone())), json!({"cell": "A1"})),
            no_progress(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ArgumentError");

    let mut foreign = request(DocumentKind::Word, "get_text", Some(DocumentSource::Session(id.clone())), json!({}));
    foreign.identity = SessionIdentity::Anonymous;
    let err = dispatcher.invoke(foreign, no_progress()).await.unwrap_err();
    assert_eq!(err.code(), "AccessDenied");

    let err = dispatcher
        .invoke(
            request(DocumentKind::Word, "add_paragraph", Some(DocumentSource::Session(id)), json!({})),
            no_progress(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, DocError::MissingParameter { name: "text".to_owned() });
}

#[tokio::test]
async fn path_calls_save_modified_documents() {
    let tmp = TempDir::new("dispatch-path");
    let input = write_document(&tmp, "in.docx", &letter(&["a"]));
    let output = tmp.join("out.docx");
    let dispatcher = dispatcher();
    let engines = Engines::default();

    let outcome = dispatcher
        .invoke(
            request(
                DocumentKind::Word,
                "add_paragraph",
                Some(DocumentSource::Path {
                    input: input.clone(),
                    output: Some(output.clone()),
                }),
                json!({"text": "b"}),
            ),
            no_progress(),
        )
        .await
        .expect("invoke");
    assert_eq!(outcome.saved_to.as_ref(), Some(&output));
    assert_eq!(engines.load(DocumentKind::Word, &output).expect("load"), letter(&["a", "b"]));
    assert_eq!(engines.load(DocumentKind::Word, &input).expect("load"), letter(&["a"]));

    let outcome = dispatcher
        .invoke(
            request(
                DocumentKind::Word,
                "add_paragraph",
                Some(DocumentSource::Path {
                    input: input.clone(),
                    output: None,
                }),
                json!({"text": "c"}),
            ),
            no_progress(),
        )
        .await
        .expect("in place");
    assert_eq!(outcome.saved_to, Some(input.clone()));
    assert_eq!(engines.load(DocumentKind::Word, &input).expect("load"), letter(&["a", "c"]));
    assert!(dispatcher.sessions().is_empty());
}

#[tokio::test]
async fn read_only_path_calls_write_nothing() {
    let tmp = TempDir::new("dispatch-readonly");
    let input = write_document(&tmp, "in.docx", &letter(&["a"]));
    let before = std::fs::read(&input).expect("read");
    let outcome = dispatcher()
        .invoke(
            request(
                DocumentKind::Word,
                "get_text",
                Some(DocumentSource::Path {
                    input: input.clone(),
                    output: None,
                }),
                json!({}),
            ),
            no_progress(),
        )
        .await
        .expect("invoke");
    assert_eq!(outcome.saved_to, None);
    assert_eq!(std::fs::read(&input).expect("read"), before);
}

#[tokio::test]
async fn path_sources_follow_the_workspace_policy() {
    let tmp = TempDir::new("dispatch-policy");
    write_document(&tmp, "in.docx", &letter(&["a"]));
    let dispatcher = Dispatcher::with_env(
        Arc::new(Registries::builtin()),
        Arc::new(SessionManager::new(Engines::default(), SessionConfig::default())),
        OperationEnv {
            paths: PathPolicy::rooted(tmp.path()),
            ..OperationEnv::default()
        },
    );

    let outcome = dispatcher
        .invoke(
            request(
                DocumentKind::Word,
                "get_text",
                Some(DocumentSource::Path {
                    input: PathBuf::from("in.docx"),
                    output: None,
                }),
                json!({}),
            ),
            no_progress(),
        )
        .await
        .expect("relative input");
    assert_eq!(outcome.result["text"], "a");

    let err = dispatcher
        .invoke(
            request(
                DocumentKind::Word,
                "get_text",
                Some(DocumentSource::Path {
                    input: PathBuf::from("../in.docx"),
                    output: None,
                }),
                json!({}),
            ),
            no_progress(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ArgumentError");
}

#[tokio::test]
async fn progress_reaches_the_callers_sink() {
    let tmp = TempDir::new("dispatch-progress");
    let parts = ["p1.docx", "p2.docx", "p3.docx"]
        .into_iter()
        .map(|name| write_document(&tmp, name, &letter(&[name])).display().to_string())
        .collect::<Vec<_>>();
    let dispatcher = dispatcher();
    let id = dispatcher.sessions().open_document(letter(&[]), &owner(), None).expect("open");
    let progress = Arc::new(RecordingProgress::new());

    dispatcher
        .invoke(
            request(DocumentKind::Word, "merge", Some(DocumentSource::Session(id)), json!({"input_paths": parts})),
            progress.clone(),
        )
        .await
        .expect("merge");
    let events = progress.events();
    assert_eq!(events.iter().map(|e| e.progress).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(events.iter().all(|e| e.total == Some(3)));
}

#[tokio::test]
async fn oversized_csv_exports_are_rejected_and_the_session_survives() {
    let tmp = TempDir::new("dispatch-csv-limit");
    let dispatcher = Dispatcher::new(
        Arc::new(Registries::builtin()),
        Arc::new(SessionManager::new(
            Engines::reference(WriteDurability::BestEffort, 64 * 1024),
            SessionConfig::default(),
        )),
    );
    let id = dispatcher
        .sessions()
        .open_document(Document::blank(DocumentKind::Spreadsheet), &owner(), None)
        .expect("open");
    let on_session = || Some(DocumentSource::Session(id.clone()));

    dispatcher
        .invoke(
            request(DocumentKind::Spreadsheet, "set_cell", on_session(), json!({"cell": "XFD1048576", "value": 1})),
            no_progress(),
        )
        .await
        .expect("set far cell");

    let out = tmp.join("far.csv");
    let err = dispatcher
        .invoke(
            request(
                DocumentKind::Spreadsheet,
                "convert",
                on_session(),
                json!({"output_path": out.display().to_string()}),
            ),
            no_progress(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ArgumentError");
    assert!(!out.exists());

    let outcome = dispatcher
        .invoke(
            request(DocumentKind::Spreadsheet, "get_cell", on_session(), json!({"cell": "XFD1048576"})),
            no_progress(),
        )
        .await
        .expect("session still open");
    assert_eq!(outcome.result["value"], 1.0);
}
