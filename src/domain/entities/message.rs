use super::FileMeta;

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Document(FileMeta),
    CallbackData { callback_id: String, data: String },
    Empty,
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Command { .. } => "command",
            Content::Document(_) => "document",
            Content::CallbackData { .. } => "callback",
            Content::Empty => "empty",
        }
    }
}

/// Represents an incoming message, already stripped of transport details
#[derive(Debug, Clone)]
pub struct Message {
    pub chat_id: i64,
    pub content: Content,
}

impl Message {
    pub fn new(chat_id: i64, content: Content) -> Self {
        Self { chat_id, content }
    }

    pub fn from_text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::new(chat_id, Content::Text(text.into()))
    }

    pub fn from_command(chat_id: i64, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(chat_id, Content::Command { name: name.into(), args })
    }

    pub fn from_document(chat_id: i64, file: FileMeta) -> Self {
        Self::new(chat_id, Content::Document(file))
    }

    pub fn from_callback(chat_id: i64, callback_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(
            chat_id,
            Content::CallbackData {
                callback_id: callback_id.into(),
                data: data.into(),
            },
        )
    }
}
