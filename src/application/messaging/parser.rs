//! Message parser - turns raw transport payloads into domain messages

use crate::domain::entities::{FileMeta, Message};
use crate::infrastructure::storage::DEFAULT_EXPORT_NAME;

/// Parses incoming payloads into structured [`Message`]s
#[derive(Debug, Clone)]
pub struct MessageParser {
    bot_username: String,
}

impl MessageParser {
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            bot_username: bot_username.into().trim_start_matches('@').to_lowercase(),
        }
    }

    /// Parse a text message; anything starting with `/` is a command
    pub fn parse(&self, chat_id: i64, text: impl Into<String>) -> Message {
        let text = text.into();
        let trimmed = text.trim();

        match trimmed.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => self.parse_command(chat_id, rest),
            _ => Message::from_text(chat_id, text),
        }
    }

    /// `/stop@this_bot arg` → `stop` with `["arg"]`. Commands addressed to
    /// another bot stay plain text.
    fn parse_command(&self, chat_id: i64, rest: &str) -> Message {
        let mut parts = rest.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let args = parts.map(str::to_string).collect();

        let name = match head.split_once('@') {
            Some((name, target)) if self.bot_username.is_empty() || target.eq_ignore_ascii_case(&self.bot_username) => name,
            Some(_) => return Message::from_text(chat_id, format!("/{}", rest)),
            None => head,
        };

        Message::from_command(chat_id, name.to_lowercase(), args)
    }

    /// Parse an uploaded document; a missing file name is treated as a JSON export
    pub fn parse_document(&self, chat_id: i64, file_id: impl Into<String>, file_name: Option<String>, file_size: Option<u64>) -> Message {
        let name = file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
        Message::from_document(chat_id, FileMeta::new(file_id, name, file_size.unwrap_or(0)))
    }

    /// Parse a callback query (inline button press)
    ///
    /// A press without data still has to be acknowledged, so it keeps its id
    /// and carries empty data.
    pub fn parse_callback(&self, chat_id: i64, callback_id: impl Into<String>, data: Option<String>) -> Message {
        Message::from_callback(chat_id, callback_id, data.unwrap_or_default())
    }
}
