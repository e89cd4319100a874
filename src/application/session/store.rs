//! In-memory per-chat session store.
//!
//! Sessions live in a sharded map keyed by chat id; each one sits behind its
//! own mutex so rapid messages from one chat are serialized without blocking
//! other chats. Nothing is persisted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::entities::{FileMeta, Session, SessionState};

pub type SessionHandle = Arc<Mutex<Session>>;

/// Outcome of touching a chat's session
#[derive(Debug)]
pub enum Touch {
    Active(SessionHandle),
    /// The session had been idle past the TTL and is now gone
    Expired,
}

/// Outcome of offering an uploaded file to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accepted { count: usize },
    Processing,
    LimitReached { max: usize },
}

/// Why a run could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRejection {
    NoFiles,
    AlreadyProcessing,
}

/// Immutable snapshot handed to the processing worker
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub chat_id: i64,
    pub session_id: Uuid,
    pub files: Vec<FileMeta>,
}

pub struct SessionStore {
    sessions: DashMap<i64, SessionHandle>,
    ttl: Duration,
    max_files: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_files: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            max_files,
        }
    }

    /// Existing session for the chat, or a fresh `WaitingFiles` one
    pub fn get_or_create(&self, chat_id: i64) -> SessionHandle {
        self.sessions
            .entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    pub fn get(&self, chat_id: i64) -> Option<SessionHandle> {
        self.sessions.get(&chat_id).map(|s| s.clone())
    }

    pub fn reset(&self, chat_id: i64) {
        if self.sessions.remove(&chat_id).is_some() {
            tracing::debug!("Session for chat {} removed", chat_id);
        }
    }

    /// Replace whatever the chat had with a brand-new session
    pub fn restart(&self, chat_id: i64) -> SessionHandle {
        let fresh = Arc::new(Mutex::new(Session::new()));
        self.sessions.insert(chat_id, fresh.clone());
        fresh
    }

    /// Remove the chat's session only if it is still the instance `session_id`.
    ///
    /// A run finishing after `/stop` + `/start` must not wipe the newer session.
    pub fn reset_if_current(&self, chat_id: i64, session_id: Uuid) -> bool {
        self.sessions
            .remove_if(&chat_id, |_, handle| lock(handle).id == session_id)
            .is_some()
    }

    pub fn is_expired(&self, session: &Session) -> bool {
        session.idle_for(Utc::now()) >= self.ttl
    }

    pub fn set_state(&self, chat_id: i64, state: SessionState) {
        let handle = self.get_or_create(chat_id);
        lock(&handle).set_state(state);
    }

    /// Atomically move `expected` → `new`; false if the state was different
    pub fn compare_and_swap_state(&self, chat_id: i64, expected: SessionState, new: SessionState) -> bool {
        let Some(handle) = self.get(chat_id) else {
            return false;
        };
        let mut session = lock(&handle);
        if session.state != expected {
            tracing::debug!(
                "Chat {}: expected {} but session is {}",
                chat_id,
                expected.as_str(),
                session.state.as_str()
            );
            return false;
        }
        session.set_state(new);
        true
    }

    /// Expiry check, then activity refresh. Every inbound interaction goes through here.
    pub fn touch(&self, chat_id: i64) -> Touch {
        let handle = self.get_or_create(chat_id);
        let session_id = {
            let mut session = lock(&handle);
            if !self.is_expired(&session) {
                session.touch();
                return Touch::Active(handle.clone());
            }
            session.id
        };
        tracing::info!("Session for chat {} expired", chat_id);
        self.reset_if_current(chat_id, session_id);
        Touch::Expired
    }

    /// Admission control for uploads
    pub fn admit_file(&self, chat_id: i64, file: FileMeta) -> Admission {
        let handle = self.get_or_create(chat_id);
        let mut session = lock(&handle);
        if session.state == SessionState::Processing {
            return Admission::Processing;
        }
        if session.files.len() >= self.max_files {
            return Admission::LimitReached { max: self.max_files };
        }
        session.files.push(file);
        session.set_state(SessionState::ReadyToProcess);
        Admission::Accepted { count: session.files.len() }
    }

    /// Switch to `Processing` and snapshot the file list in one step
    pub fn begin_processing(&self, chat_id: i64) -> Result<RunTicket, ProcessRejection> {
        let handle = self.get_or_create(chat_id);
        let mut session = lock(&handle);
        if session.state == SessionState::Processing {
            return Err(ProcessRejection::AlreadyProcessing);
        }
        if session.files.is_empty() {
            tracing::debug!("Chat {}: nothing staged in {} state", chat_id, session.state.as_str());
            return Err(ProcessRejection::NoFiles);
        }
        session.set_state(SessionState::Processing);
        Ok(RunTicket {
            chat_id,
            session_id: session.id,
            files: session.files.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A panic while holding a session lock leaves plain data behind; keep using it
pub fn lock(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::minutes(30), 10)
    }

    fn file(n: usize) -> FileMeta {
        FileMeta::new(format!("file-{}", n), "result.json", 100)
    }

    #[test]
    fn test_new_session_waits_for_files() {
        let store = store();
        let handle = store.get_or_create(1);
        assert_eq!(lock(&handle).state, SessionState::WaitingFiles);
        assert!(lock(&handle).files.is_empty());
    }

    #[test]
    fn test_upload_moves_to_ready() {
        let store = store();
        assert_eq!(store.admit_file(1, file(1)), Admission::Accepted { count: 1 });
        assert_eq!(store.admit_file(1, file(2)), Admission::Accepted { count: 2 });

        let handle = store.get(1).unwrap();
        assert_eq!(lock(&handle).state, SessionState::ReadyToProcess);
    }

    #[test]
    fn test_upload_limit() {
        let store = store();
        for n in 0..10 {
            assert!(matches!(store.admit_file(1, file(n)), Admission::Accepted { .. }));
        }
        assert_eq!(store.admit_file(1, file(11)), Admission::LimitReached { max: 10 });
        assert_eq!(lock(&store.get(1).unwrap()).files.len(), 10);
    }

    #[test]
    fn test_begin_processing_requires_files() {
        let store = store();
        store.get_or_create(1);
        assert_eq!(store.begin_processing(1).unwrap_err(), ProcessRejection::NoFiles);
        assert_eq!(lock(&store.get(1).unwrap()).state, SessionState::WaitingFiles);
    }

    #[test]
    fn test_begin_processing_snapshots_and_blocks_uploads() {
        let store = store();
        store.admit_file(1, file(1));
        store.admit_file(1, file(2));

        let ticket = store.begin_processing(1).unwrap();
        assert_eq!(ticket.files.len(), 2);
        assert_eq!(ticket.files[0].file_id, "file-1");
        assert_eq!(lock(&store.get(1).unwrap()).state, SessionState::Processing);

        assert_eq!(store.admit_file(1, file(3)), Admission::Processing);
        assert_eq!(ticket.files.len(), 2);
        assert_eq!(store.begin_processing(1).unwrap_err(), ProcessRejection::AlreadyProcessing);
    }

    #[test]
    fn test_expired_session_is_removed_on_touch() {
        let store = store();
        let handle = store.get_or_create(1);
        lock(&handle).last_activity_at = Utc::now() - Duration::minutes(30);
        assert!(store.is_expired(&lock(&handle)));

        assert!(matches!(store.touch(1), Touch::Expired));
        assert!(store.get(1).is_none());
    }

    #[test]
    fn test_touch_refreshes_idle_clock() {
        let store = store();
        let handle = store.get_or_create(1);
        lock(&handle).last_activity_at = Utc::now() - Duration::minutes(29);

        assert!(matches!(store.touch(1), Touch::Active(_)));
        assert!(!store.is_expired(&lock(&handle)));
        assert!(lock(&handle).idle_for(Utc::now()) < Duration::minutes(1));
    }

    #[test]
    fn test_reset_if_current_spares_newer_session() {
        let store = store();
        let old_id = lock(&store.get_or_create(1)).id;
        store.restart(1);

        assert!(!store.reset_if_current(1, old_id));
        assert!(store.get(1).is_some());

        let new_id = lock(&store.get(1).unwrap()).id;
        assert!(store.reset_if_current(1, new_id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_compare_and_swap_state() {
        let store = store();
        store.get_or_create(1);
        assert!(!store.compare_and_swap_state(1, SessionState::ReadyToProcess, SessionState::Processing));
        assert!(store.compare_and_swap_state(1, SessionState::WaitingFiles, SessionState::ReadyToProcess));
        assert!(!store.compare_and_swap_state(2, SessionState::WaitingFiles, SessionState::ReadyToProcess));
    }

    #[test]
    fn test_set_state_creates_session() {
        let store = store();
        store.set_state(5, SessionState::ReadyToProcess);
        assert_eq!(lock(&store.get(5).unwrap()).state, SessionState::ReadyToProcess);
    }

    #[test]
    fn test_chats_are_isolated() {
        let store = store();
        store.admit_file(1, file(1));
        store.reset(2);
        assert_eq!(store.len(), 1);
        assert_eq!(lock(&store.get_or_create(2)).files.len(), 0);
    }
}
