// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use docdesk::dispatch::{DocumentSource, InvokeRequest, NoProgress, ProgressSink};
use docdesk::model::DocumentKind;
use docdesk::params::ParamBag;
use serde_json::{json, Value};

mod fixtures;
mod profiler;

use fixtures::{Case, TempDir};

fn request(kind: DocumentKind, operation: &str, source: DocumentSource, params: Value) -> InvokeRequest {
    InvokeRequest {
        kind,
        operation: operation.to_owned(),
        source: Some(source),
        params: ParamBag::from_value(params).expect("params"),
        identity: fixtures::owner(),
    }
}

// Benchmark identity (keep stable):
// - Group names in this file: `dispatch.session`, `dispatch.path`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `get_text_small`, `replace_medium`).
fn benches_dispatch(c: &mut Criterion) {
    let runtime = fixtures::runtime();
    let progress: Arc<dyn ProgressSink> = Arc::new(NoProgress);

    let mut group = c.benchmark_group("dispatch.session");
    for case in [Case::Small, Case::Medium, Case::Large] {
        let dispatcher = fixtures::dispatcher();
        let word = dispatcher
            .sessions()
            .open_document(fixtures::word(case), &fixtures::owner(), None)
            .expect("open word");
        let book = dispatcher
            .sessions()
            .open_document(fixtures::workbook(case), &fixtures::owner(), None)
            .expect("open workbook");

        group.bench_function(format!("get_text_{}", case.id()), |b| {
            b.iter(|| {
                let outcome = runtime
                    .block_on(dispatcher.invoke(
                        request(DocumentKind::Word, "get_text", DocumentSource::Session(word.clone()), json!({})),
                        progress.clone(),
                    ))
                    .expect("get_text");
                black_box(outcome.result)
            })
        });
        group.bench_function(format!("replace_{}", case.id()), |b| {
            b.iter(|| {
                let outcome = runtime
                    .block_on(dispatcher.invoke(
                        request(
                            DocumentKind::Word,
                            "replace_text",
                            DocumentSource::Session(word.clone()),
                            json!({"find": "fox", "replace": "fox", "regex": false}),
                        ),
                        progress.clone(),
                    ))
                    .expect("replace_text");
                black_box(outcome.modified)
            })
        });
        group.bench_function(format!("format_range_{}", case.id()), |b| {
            b.iter(|| {
                let outcome = runtime
                    .block_on(dispatcher.invoke(
                        request(
                            DocumentKind::Spreadsheet,
                            "format",
                            DocumentSource::Session(book.clone()),
                            json!({"range": "A1:D4", "italic": true}),
                        ),
                        progress.clone(),
                    ))
                    .expect("format");
                black_box(outcome.result)
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("dispatch.path");
    for case in [Case::Small, Case::Medium] {
        let dispatcher = fixtures::dispatcher();
        let tmp = TempDir::new("dispatch_path");
        let input = fixtures::write(&tmp, "input.docx", &fixtures::word(case));

        group.bench_function(format!("add_paragraph_{}", case.id()), |b| {
            b.iter_batched(
                || tmp.join("output.docx"),
                |output| {
                    let outcome = runtime
                        .block_on(dispatcher.invoke(
                            request(
                                DocumentKind::Word,
                                "add_paragraph",
                                DocumentSource::Path {
                                    input: input.clone(),
                                    output: Some(output),
                                },
                                json!({"text": "appended"}),
                            ),
                            progress.clone(),
                        ))
                        .expect("add_paragraph");
                    black_box(outcome.saved_to)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_dispatch
}
criterion_main!(benches);
