//! Recording transport used by unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::application::errors::BotError;
use crate::domain::traits::{Bot, BotInfo, Keyboard, OutgoingDocument};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String, keyboard: Option<Keyboard> },
    Document { chat_id: i64, file_name: String, caption: Option<String>, size: usize, keyboard: Option<Keyboard> },
    CallbackAnswer { callback_id: String },
}

impl Sent {
    pub fn keyboard(&self) -> &Option<Keyboard> {
        static NONE: Option<Keyboard> = None;
        match self {
            Sent::Text { keyboard, .. } | Sent::Document { keyboard, .. } => keyboard,
            Sent::CallbackAnswer { .. } => &NONE,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingBot {
    sent: Mutex<Vec<Sent>>,
    files: HashMap<String, Vec<u8>>,
    fail_after: Option<usize>,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_id: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(file_id.to_string(), bytes);
        self
    }

    /// Chat sends start failing once this many have gone through
    pub fn failing_sends_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Everything except callback acknowledgements
    pub fn chat_output(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| !matches!(s, Sent::CallbackAnswer { .. }))
            .collect()
    }

    fn record(&self, item: Sent) -> Result<String, BotError> {
        let mut sent = self.sent.lock().unwrap();
        let delivered = sent.iter().filter(|s| !matches!(s, Sent::CallbackAnswer { .. })).count();
        if self.fail_after.is_some_and(|limit| delivered >= limit) {
            return Err(BotError::Api("Too Many Requests".to_string()));
        }
        sent.push(item);
        Ok(sent.len().to_string())
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<String, BotError> {
        self.record(Sent::Text { chat_id, text: text.to_string(), keyboard: None })
    }

    async fn send_with_keyboard(&self, chat_id: i64, text: &str, buttons: Keyboard) -> Result<String, BotError> {
        self.record(Sent::Text { chat_id, text: text.to_string(), keyboard: Some(buttons) })
    }

    async fn send_document(&self, chat_id: i64, document: OutgoingDocument, buttons: Option<Keyboard>) -> Result<String, BotError> {
        self.record(Sent::Document {
            chat_id,
            file_name: document.file_name,
            caption: document.caption,
            size: document.bytes.len(),
            keyboard: buttons,
        })
    }

    async fn answer_callback(&self, callback_id: &str, _text: Option<&str>) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent::CallbackAnswer { callback_id: callback_id.to_string() });
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| BotError::NotFound(format!("file {}", file_id)))
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "0".to_string(),
            name: "Recorder".to_string(),
            username: "roster_bot".to_string(),
        }
    }
}

/// An export with `count` distinct authors
pub fn export_with_participants(count: usize) -> Vec<u8> {
    let messages: Vec<_> = (0..count)
        .map(|n| json!({"type": "message", "from": format!("User {:03}", n), "text": "hello"}))
        .collect();
    json!({"name": "Test chat", "messages": messages}).to_string().into_bytes()
}
