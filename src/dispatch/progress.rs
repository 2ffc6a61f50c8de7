// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::{Mutex, PoisonError};

use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Receives progress notifications from long-running handlers.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: u64, total: Option<u64>, message: &str);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: u64, _total: Option<u64>, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ProgressEvent {
    pub progress: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub message: String,
}

/// Keeps every notification so it can be returned with the result.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, progress: u64, total: Option<u64>, message: &str) {
        tracing::debug!(progress, total, detail = message, "progress");
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(ProgressEvent {
            progress,
            total,
            message: message.to_owned(),
        });
    }
}

/// Records every notification and hands it to an async consumer as it happens.
///
/// Handlers run on the blocking pool; the unbounded sender never blocks them. The receiver
/// ends once the sink and every clone of its `Arc` are dropped.
#[derive(Debug)]
pub struct ForwardingProgress {
    recorded: RecordingProgress,
    sender: UnboundedSender<ProgressEvent>,
}

impl ForwardingProgress {
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = Self {
            recorded: RecordingProgress::new(),
            sender,
        };
        (sink, receiver)
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.recorded.events()
    }
}

impl ProgressSink for ForwardingProgress {
    fn report(&self, progress: u64, total: Option<u64>, message: &str) {
        self.recorded.report(progress, total, message);
        // A closed receiver means nobody is listening; the recorded copy still returns.
        let _ = self.sender.send(ProgressEvent {
            progress,
            total,
            message: message.to_owned(),
        });
    }
}
