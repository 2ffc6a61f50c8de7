// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use docdesk::engine::Engines;
use docdesk::model::DocumentKind;
use docdesk::session::{SessionConfig, SessionManager};

mod fixtures;
mod profiler;

use fixtures::{Case, TempDir};

// Benchmark identity (keep stable):
// - Group name in this file: `sessions.lifecycle`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `open_close_small`, `evict_256`).
fn benches_sessions(c: &mut Criterion) {
    let runtime = fixtures::runtime();
    let mut group = c.benchmark_group("sessions.lifecycle");

    for case in [Case::Small, Case::Large] {
        let tmp = TempDir::new("sessions_open_close");
        let path = fixtures::write(&tmp, "book.xlsx", &fixtures::workbook(case));
        let sessions = SessionManager::new(Engines::default(), SessionConfig::default());

        group.bench_function(format!("open_close_{}", case.id()), |b| {
            b.iter(|| {
                runtime.block_on(async {
                    let id = sessions
                        .open_session(DocumentKind::Spreadsheet, &path, &fixtures::owner())
                        .await
                        .expect("open");
                    let outcome = sessions
                        .close_session(&id, &fixtures::owner(), false, None)
                        .await
                        .expect("close");
                    black_box(outcome)
                })
            })
        });
    }

    let sessions = SessionManager::new(Engines::default(), SessionConfig::default());
    let ids = (0..1024)
        .map(|_| {
            sessions
                .open_document(fixtures::word(Case::Small), &fixtures::owner(), None)
                .expect("open")
        })
        .collect::<Vec<_>>();
    group.bench_function("acquire_1024_open", |b| {
        let mut next = 0usize;
        b.iter(|| {
            let id = &ids[next % ids.len()];
            next += 1;
            runtime.block_on(async {
                let lease = sessions.acquire(id, &fixtures::owner()).await.expect("acquire");
                black_box(lease.kind())
            })
        })
    });
    group.bench_function("list_1024_open", |b| {
        b.iter(|| black_box(sessions.list_sessions(&fixtures::owner()).len()))
    });

    group.bench_function("evict_256", |b| {
        b.iter_batched(
            || {
                let sessions = SessionManager::new(
                    Engines::default(),
                    SessionConfig {
                        idle_timeout: Duration::from_secs(1),
                        ..SessionConfig::default()
                    },
                );
                for _ in 0..256 {
                    sessions
                        .open_document(fixtures::word(Case::Small), &fixtures::owner(), None)
                        .expect("open");
                }
                sessions
            },
            |sessions| black_box(sessions.evict_idle_at(Instant::now() + Duration::from_secs(5)).len()),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_sessions
}
criterion_main!(benches);
