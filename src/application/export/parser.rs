//! Telegram Desktop JSON export parser.
//!
//! Exports look roughly like this, but the exact shape drifts between client
//! versions, so the document is walked as a [`serde_json::Value`] tree and
//! every field is optional:
//!
//! ```json
//! {
//!   "name": "Chat Name",
//!   "messages": [
//!     {
//!       "id": 12345,
//!       "type": "message",
//!       "from": "Alice (@alice)",
//!       "text": "Hi @bob" | ["Hi ", {"type": "mention", "text": "@bob"}],
//!       "text_entities": [{"type": "text_link", "text": "here", "href": "https://t.me/news"}]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

use crate::application::errors::ExportError;
use crate::domain::entities::{EntrySet, ResultBundle, UserEntry, TME_BASE};
use crate::domain::rules::{dedup, dedup_people};

/// `@handle` with at least three word characters, not glued to a preceding word
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])@([A-Za-z0-9_]{3,})").expect("mention pattern is valid")
});

/// `t.me/<handle>` or `t.me/s/<handle>`, scheme optional
static TME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?t\.me/(?:s/)?([A-Za-z0-9_]{3,})").expect("t.me pattern is valid")
});

const SPAN_MENTION: &str = "mention";
const SPAN_TEXT_LINK: &str = "text_link";

/// Parser for Telegram Desktop JSON exports
#[derive(Debug, Default, Clone, Copy)]
pub struct TelegramExportParser;

impl TelegramExportParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ResultBundle, ExportError> {
        let bytes = std::fs::read(path).map_err(|e| ExportError::from(e).with_path(path))?;
        self.parse_slice(&bytes).map_err(|e| e.with_path(path))
    }

    pub fn parse_slice(&self, bytes: &[u8]) -> Result<ResultBundle, ExportError> {
        let root: Value = serde_json::from_slice(bytes)?;
        Ok(self.parse_value(&root))
    }

    /// Extract from an already decoded document. Never fails: a root without a
    /// `messages` array simply has no messages.
    pub fn parse_value(&self, root: &Value) -> ResultBundle {
        let mut collector = Collector::default();

        let messages = root.get("messages").and_then(Value::as_array);
        if let Some(messages) = messages {
            for msg in messages {
                collector.author(msg);
                collector.entities(msg);
                collector.text(msg);
            }
        }

        tracing::debug!(
            "Scanned {} messages: {} participants, {} mentions, {} channels before dedup",
            messages.map_or(0, Vec::len),
            collector.participants.len(),
            collector.mentions.len(),
            collector.channels.len()
        );

        collector.finish()
    }
}

/// Raw, not yet deduplicated findings
#[derive(Default)]
struct Collector {
    participants: EntrySet,
    mentions: EntrySet,
    channels: EntrySet,
}

impl Collector {
    fn author(&mut self, msg: &Value) {
        if !msg.is_object() {
            return;
        }
        let Some(from) = scalar_text(msg.get("from")) else {
            return;
        };
        if from.trim().is_empty() {
            return;
        }

        // "from" is usually just a display name, but sometimes carries the handle too
        let mut entry = UserEntry::new().with_display_name(from.clone());
        if let Some(handle) = first_mention(&from) {
            entry = entry
                .with_link(format!("{}{}", TME_BASE, handle))
                .with_username(handle);
        }
        self.participants.insert(entry);
    }

    fn entities(&mut self, msg: &Value) {
        let Some(entities) = msg.get("text_entities").and_then(Value::as_array) else {
            return;
        };
        for entity in entities {
            self.span(entity);
        }
    }

    fn text(&mut self, msg: &Value) {
        match msg.get("text") {
            Some(Value::String(text)) => self.scan_text(text),
            Some(Value::Array(parts)) => {
                let mut combined = String::new();
                for part in parts {
                    match part {
                        Value::String(s) => {
                            combined.push_str(s);
                            combined.push(' ');
                        }
                        Value::Object(_) => {
                            if let Some(t) = scalar_text(part.get("text")) {
                                combined.push_str(&t);
                                combined.push(' ');
                            }
                            self.span(part);
                        }
                        _ => {}
                    }
                }
                self.scan_text(&combined);
            }
            _ => {}
        }
    }

    /// Structured span: `mention` carries the handle in `text`, `text_link` the URL in `href`
    fn span(&mut self, span: &Value) {
        let Some(kind) = scalar_text(span.get("type")) else {
            return;
        };
        match kind.as_str() {
            SPAN_MENTION => {
                if let Some(handle) = scalar_text(span.get("text")).as_deref().and_then(first_mention) {
                    self.mentions.insert(UserEntry::from_handle(handle));
                }
            }
            SPAN_TEXT_LINK => {
                if let Some(handle) = scalar_text(span.get("href")).as_deref().and_then(first_channel) {
                    self.channels.insert(UserEntry::from_handle(handle));
                }
            }
            _ => {}
        }
    }

    /// Free-text fallback for mentions and links that came without spans
    fn scan_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        for caps in MENTION_RE.captures_iter(text) {
            self.mentions.insert(UserEntry::from_handle(&caps[1]));
        }
        for caps in TME_RE.captures_iter(text) {
            self.channels.insert(UserEntry::from_handle(&caps[1]));
        }
    }

    fn finish(self) -> ResultBundle {
        ResultBundle::new(
            dedup_people(&self.participants),
            dedup_people(&self.mentions),
            dedup(&self.channels),
        )
    }
}

fn first_mention(text: &str) -> Option<String> {
    MENTION_RE.captures(text).map(|caps| caps[1].to_string())
}

fn first_channel(url: &str) -> Option<String> {
    TME_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Text of a scalar node; `None` for null, arrays and objects
fn scalar_text(node: Option<&Value>) -> Option<String> {
    match node? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
