// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Resident documents keyed by session id.
//!
//! Each session owns one document behind its own async mutex, so operations on one session
//! run strictly one at a time (FIFO) while different sessions proceed in parallel. The id
//! table itself sits behind a short synchronous lock that is never held across an await.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::engine::{Engines, SaveFormat};
use crate::error::{DocError, DocResult};
use crate::model::{Document, DocumentKind, DocumentType, SessionId, SessionIdentity};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sessions untouched for longer than this are evicted. `Duration::ZERO` disables eviction.
    pub idle_timeout: Duration,
    pub eviction_interval: Duration,
    /// Best-effort save of modified documents before eviction.
    pub save_on_evict: bool,
    pub max_sessions: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
            save_on_evict: false,
            max_sessions: None,
        }
    }
}

struct SessionEntry {
    id: SessionId,
    kind: DocumentKind,
    owner: SessionIdentity,
    source_path: Option<PathBuf>,
    opened_at: Instant,
    dirty: AtomicBool,
    last_touched: std::sync::Mutex<Instant>,
    // `None` once closed or evicted; waiters that raced the close see it and bail out.
    slot: Arc<Mutex<Option<Document>>>,
}

impl SessionEntry {
    fn touch(&self) {
        *self.last_touched.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn last_touched(&self) -> Instant {
        *self.last_touched.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn info(&self, now: Instant) -> SessionInfo {
        SessionInfo {
            session_id: self.id.to_string(),
            kind: self.kind,
            owner: self.owner.to_string(),
            source_path: self.source_path.as_ref().map(|path| path.display().to_string()),
            modified: self.is_dirty(),
            busy: self.slot.try_lock().is_err(),
            age_secs: now.saturating_duration_since(self.opened_at).as_secs(),
            idle_secs: now.saturating_duration_since(self.last_touched()).as_secs(),
        }
    }
}

/// A read-only view of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SessionInfo {
    pub session_id: String,
    pub kind: DocumentKind,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub modified: bool,
    /// An operation currently holds the document.
    pub busy: bool,
    pub age_secs: u64,
    pub idle_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseOutcome {
    pub saved_to: Option<PathBuf>,
    /// Modified content was dropped because the close did not save.
    pub discarded_changes: bool,
}

/// Exclusive access to one session's document for the duration of an operation.
///
/// Holding a lease keeps the session `InUse`: other acquires, closes and evictions of the same
/// session wait (or skip) until it is dropped. Dropping it touches the session.
pub struct DocumentLease {
    entry: Arc<SessionEntry>,
    document: OwnedMappedMutexGuard<Option<Document>, Document>,
}

impl std::fmt::Debug for DocumentLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLease")
            .field("session_id", &self.entry.id)
            .field("kind", &self.entry.kind)
            .finish_non_exhaustive()
    }
}

impl DocumentLease {
    pub fn session_id(&self) -> &SessionId {
        &self.entry.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.entry.kind
    }

    pub fn owner(&self) -> &SessionIdentity {
        &self.entry.owner
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.entry.source_path.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Typed access; a session of another kind is an argument error.
    pub fn get<T: DocumentType>(&self) -> DocResult<&T> {
        let kind = self.entry.kind;
        self.document.get::<T>().ok_or_else(|| kind_mismatch(&self.entry.id, kind, T::KIND))
    }

    pub fn get_mut<T: DocumentType>(&mut self) -> DocResult<&mut T> {
        let (id, kind) = (&self.entry.id, self.entry.kind);
        self.document.get_mut::<T>().ok_or_else(|| kind_mismatch(id, kind, T::KIND))
    }

    pub fn mark_modified(&self) {
        self.entry.dirty.store(true, Ordering::Release);
    }

    pub fn is_modified(&self) -> bool {
        self.entry.is_dirty()
    }
}

impl Drop for DocumentLease {
    fn drop(&mut self) {
        self.entry.touch();
    }
}

fn kind_mismatch(id: &SessionId, actual: DocumentKind, expected: DocumentKind) -> DocError {
    DocError::argument(format!("session '{id}' holds a {actual} document, not {expected}"))
}

/// Parses a client-supplied id. A malformed id cannot name a live session.
pub fn parse_session_id(raw: &str) -> DocResult<SessionId> {
    SessionId::new(raw.trim()).map_err(|_| DocError::SessionNotFound(raw.to_owned()))
}

pub struct SessionManager {
    engines: Engines,
    config: SessionConfig,
    sessions: RwLock<HashMap<SessionId, Arc<SessionEntry>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("sessions", &self.len())
            .finish()
    }
}

impl SessionManager {
    pub fn new(engines: Engines, config: SessionConfig) -> Self {
        Self {
            engines,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads `path` through the engine for `kind` and registers it under a fresh id.
    pub async fn open_session(
        &self,
        kind: DocumentKind,
        path: &Path,
        identity: &SessionIdentity,
    ) -> DocResult<SessionId> {
        self.check_capacity()?;
        let engines = self.engines.clone();
        let load_path = path.to_path_buf();
        let document = run_blocking(move || engines.load(kind, &load_path)).await?;
        self.insert(document, identity, Some(path.to_path_buf()))
    }

    /// Registers an already-constructed document.
    pub fn open_document(
        &self,
        document: Document,
        identity: &SessionIdentity,
        source_path: Option<PathBuf>,
    ) -> DocResult<SessionId> {
        self.check_capacity()?;
        self.insert(document, identity, source_path)
    }

    /// Waits for exclusive access to the session's document.
    pub async fn acquire(&self, id: &SessionId, identity: &SessionIdentity) -> DocResult<DocumentLease> {
        let entry = self.entry_for(id, identity)?;
        let guard = entry.slot.clone().lock_owned().await;
        let document = OwnedMutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| DocError::SessionNotFound(id.to_string()))?;
        entry.touch();
        Ok(DocumentLease { entry, document })
    }

    /// Closes the session, saving first when `save` is set and there is something to write.
    ///
    /// A failed save leaves the session open and unchanged. Without `save`, pending changes are
    /// discarded.
    pub async fn close_session(
        &self,
        id: &SessionId,
        identity: &SessionIdentity,
        save: bool,
        output_path: Option<&Path>,
    ) -> DocResult<CloseOutcome> {
        let entry = self.entry_for(id, identity)?;
        let mut guard = entry.slot.clone().lock_owned().await;
        if guard.is_none() {
            return Err(DocError::SessionNotFound(id.to_string()));
        }

        let dirty = entry.is_dirty();
        let mut outcome = CloseOutcome::default();
        if save && (dirty || output_path.is_some()) {
            let target = save_target(&entry, output_path)?;
            let format = SaveFormat::from_path(&target);
            guard = self.save_locked(guard, target.clone(), format).await?;
            outcome.saved_to = Some(target);
        } else if dirty {
            outcome.discarded_changes = true;
        }

        *guard = None;
        drop(guard);
        self.remove(&entry);
        info!(
            session = %id,
            kind = %entry.kind,
            saved = outcome.saved_to.is_some(),
            discarded_changes = outcome.discarded_changes,
            "session closed"
        );
        Ok(outcome)
    }

    /// Writes the document without closing the session.
    ///
    /// The dirty flag is cleared only when the write refreshed the source file itself.
    pub async fn save_session(
        &self,
        id: &SessionId,
        identity: &SessionIdentity,
        output_path: Option<&Path>,
        format: Option<SaveFormat>,
    ) -> DocResult<PathBuf> {
        let entry = self.entry_for(id, identity)?;
        let guard = entry.slot.clone().lock_owned().await;
        if guard.is_none() {
            return Err(DocError::SessionNotFound(id.to_string()));
        }
        let target = save_target(&entry, output_path)?;
        let format = format.unwrap_or_else(|| SaveFormat::from_path(&target));
        let guard = self.save_locked(guard, target.clone(), format).await?;
        if format == SaveFormat::Native && entry.source_path.as_deref() == Some(target.as_path()) {
            entry.dirty.store(false, Ordering::Release);
        }
        drop(guard);
        entry.touch();
        debug!(session = %id, path = %target.display(), format = %format, "session saved");
        Ok(target)
    }

    pub fn touch(&self, id: &SessionId, identity: &SessionIdentity) -> DocResult<()> {
        self.entry_for(id, identity)?.touch();
        Ok(())
    }

    pub fn session_info(&self, id: &SessionId, identity: &SessionIdentity) -> DocResult<SessionInfo> {
        Ok(self.entry_for(id, identity)?.info(Instant::now()))
    }

    /// Sessions owned by `identity`, ordered by id.
    pub fn list_sessions(&self, identity: &SessionIdentity) -> Vec<SessionInfo> {
        let now = Instant::now();
        let mut infos = self
            .read_table()
            .values()
            .filter(|entry| entry.owner.owns(identity))
            .map(|entry| entry.info(now))
            .collect::<Vec<_>>();
        infos.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        infos
    }

    /// Copies a resident document without waiting.
    ///
    /// Used by handlers that read from a second session while holding their own. A busy source
    /// is rejected instead of awaited so two sessions importing from each other cannot deadlock.
    pub fn snapshot(&self, id: &SessionId, identity: &SessionIdentity) -> DocResult<Document> {
        let entry = self.entry_for(id, identity)?;
        let guard = entry.slot.try_lock().map_err(|_| {
            DocError::argument(format!("session '{id}' is busy with another operation"))
        })?;
        let document = guard
            .as_ref()
            .cloned()
            .ok_or_else(|| DocError::SessionNotFound(id.to_string()))?;
        drop(guard);
        entry.touch();
        Ok(document)
    }

    /// Evicts every idle session using the wall clock.
    pub fn evict_idle(&self) -> Vec<SessionId> {
        self.evict_idle_at(Instant::now())
    }

    /// Evicts sessions idle for longer than the configured timeout as of `now`.
    ///
    /// Busy sessions are skipped. Returns the evicted ids.
    pub fn evict_idle_at(&self, now: Instant) -> Vec<SessionId> {
        let timeout = self.config.idle_timeout;
        if timeout.is_zero() {
            return Vec::new();
        }
        let is_idle = |entry: &SessionEntry| now.saturating_duration_since(entry.last_touched()) > timeout;

        let candidates = self
            .read_table()
            .values()
            .filter(|entry| is_idle(entry))
            .cloned()
            .collect::<Vec<_>>();

        let mut evicted = Vec::new();
        for entry in candidates {
            let Ok(mut guard) = entry.slot.try_lock() else {
                debug!(session = %entry.id, "skipping eviction of busy session");
                continue;
            };
            // An operation may have finished between the scan and the lock.
            if guard.is_none() || !is_idle(&entry) {
                continue;
            }
            if entry.is_dirty() {
                if self.config.save_on_evict {
                    self.save_before_evict(&entry, guard.as_ref());
                } else {
                    warn!(session = %entry.id, "evicting session with unsaved changes");
                }
            }
            *guard = None;
            drop(guard);
            self.remove(&entry);
            info!(session = %entry.id, kind = %entry.kind, "idle session evicted");
            evicted.push(entry.id.clone());
        }
        evicted
    }

    /// Sweeps idle sessions every `eviction_interval` until the manager is dropped.
    pub fn spawn_eviction_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let interval = self.config.eviction_interval.max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                if let Err(err) = run_blocking(move || Ok(manager.evict_idle())).await {
                    warn!(error = %err, "idle eviction sweep failed");
                }
            }
        })
    }

    fn save_before_evict(&self, entry: &SessionEntry, document: Option<&Document>) {
        let (Some(document), Some(path)) = (document, entry.source_path.as_deref()) else {
            warn!(session = %entry.id, "evicting modified session without a source path; changes dropped");
            return;
        };
        match self.engines.save(document, path, SaveFormat::from_path(path)) {
            Ok(()) => debug!(session = %entry.id, path = %path.display(), "saved before eviction"),
            Err(err) => warn!(session = %entry.id, error = %err, "save before eviction failed; changes dropped"),
        }
    }

    async fn save_locked(
        &self,
        guard: OwnedMutexGuard<Option<Document>>,
        target: PathBuf,
        format: SaveFormat,
    ) -> DocResult<OwnedMutexGuard<Option<Document>>> {
        let engines = self.engines.clone();
        run_blocking(move || {
            if let Some(document) = guard.as_ref() {
                engines.save(document, &target, format)?;
            }
            Ok(guard)
        })
        .await
    }

    fn check_capacity(&self) -> DocResult<()> {
        self.check_capacity_of(&self.read_table())
    }

    fn check_capacity_of(&self, table: &HashMap<SessionId, Arc<SessionEntry>>) -> DocResult<()> {
        match self.config.max_sessions {
            Some(limit) if table.len() >= limit => Err(DocError::SessionLimitReached { limit }),
            _ => Ok(()),
        }
    }

    fn insert(
        &self,
        document: Document,
        identity: &SessionIdentity,
        source_path: Option<PathBuf>,
    ) -> DocResult<SessionId> {
        let now = Instant::now();
        let kind = document.kind();
        let mut table = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        self.check_capacity_of(&table)?;

        let mut id = SessionId::generate();
        while table.contains_key(&id) {
            id = SessionId::generate();
        }
        let entry = SessionEntry {
            id: id.clone(),
            kind,
            owner: identity.clone(),
            source_path,
            opened_at: now,
            dirty: AtomicBool::new(false),
            last_touched: std::sync::Mutex::new(now),
            slot: Arc::new(Mutex::new(Some(document))),
        };
        table.insert(id.clone(), Arc::new(entry));
        drop(table);

        info!(session = %id, kind = %kind, owner = %identity, "session opened");
        Ok(id)
    }

    fn entry_for(&self, id: &SessionId, identity: &SessionIdentity) -> DocResult<Arc<SessionEntry>> {
        let entry = self
            .read_table()
            .get(id)
            .cloned()
            .ok_or_else(|| DocError::SessionNotFound(id.to_string()))?;
        if !entry.owner.owns(identity) {
            debug!(session = %id, caller = %identity, "session access denied");
            return Err(DocError::AccessDenied(id.to_string()));
        }
        Ok(entry)
    }

    fn remove(&self, entry: &Arc<SessionEntry>) {
        let mut table = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if table.get(&entry.id).is_some_and(|current| Arc::ptr_eq(current, entry)) {
            table.remove(&entry.id);
        }
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Arc<SessionEntry>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn save_target(entry: &SessionEntry, output_path: Option<&Path>) -> DocResult<PathBuf> {
    output_path
        .or(entry.source_path.as_deref())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            DocError::argument(format!(
                "session '{}' has no source file; pass output_path to save it",
                entry.id
            ))
        })
}

/// Runs blocking engine or handler work on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> DocResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> DocResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| DocError::Internal(format!("worker task failed: {err}")))?
}
