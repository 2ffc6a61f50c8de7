// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use docdesk::dispatch::Dispatcher;
use docdesk::engine::{Engines, SaveFormat};
use docdesk::model::{
    Cell, CellRef, CellValue, Document, Paragraph, SessionIdentity, WordDocument, Workbook,
};
use docdesk::registry::Registries;
use docdesk::session::{SessionConfig, SessionManager};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("docdesk_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn size(self) -> usize {
        match self {
            Self::Small => 16,
            Self::Medium => 256,
            Self::Large => 4096,
        }
    }
}

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(Registries::builtin()),
        Arc::new(SessionManager::new(Engines::default(), SessionConfig::default())),
    )
}

pub fn owner() -> SessionIdentity {
    SessionIdentity::principal("bench")
}

pub fn word(case: Case) -> Document {
    let mut doc = WordDocument::default();
    doc.paragraphs.extend(
        (0..case.size()).map(|idx| Paragraph::new(format!("Paragraph {idx}: the quick brown fox"))),
    );
    Document::Word(doc)
}

pub fn workbook(case: Case) -> Document {
    let mut book = Workbook::default();
    let side = (case.size() as f64).sqrt() as u32;
    for row in 1..=side {
        for column in 1..=side {
            book.sheets[0].cells.insert(
                CellRef::new(row, column),
                Cell {
                    value: CellValue::Number(f64::from(row * side + column)),
                    ..Cell::default()
                },
            );
        }
    }
    Document::Spreadsheet(book)
}

pub fn write(dir: &TempDir, name: &str, document: &Document) -> PathBuf {
    let path = dir.join(name);
    Engines::default().save(document, &path, SaveFormat::Native).expect("write fixture");
    path
}
