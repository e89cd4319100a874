use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Where a chat is in the upload → process workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    WaitingFiles,
    ReadyToProcess,
    Processing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::WaitingFiles => "waiting_files",
            SessionState::ReadyToProcess => "ready_to_process",
            SessionState::Processing => "processing",
        }
    }
}

/// An uploaded export as announced by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_id: String,
    pub file_name: String,
    pub file_size: u64,
}

impl FileMeta {
    pub fn new(file_id: impl Into<String>, file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            file_size,
        }
    }
}

/// Per-chat upload session. Lives in memory only.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub state: SessionState,
    pub last_activity_at: DateTime<Utc>,
    pub files: Vec<FileMeta>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::WaitingFiles,
            last_activity_at: Utc::now(),
            files: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.touch();
    }

    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_activity_at)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
