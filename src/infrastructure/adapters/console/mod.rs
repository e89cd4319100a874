//! Console adapter for development/testing
//!
//! Lines typed on stdin act as one chat. `/file <path>` uploads a local export,
//! `/go`, `/help`, `/faq` and `/again` press the matching buttons. Documents
//! the bot sends are written to the output directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::errors::{BotError, StorageError};
use crate::application::messaging::MessageParser;
use crate::application::ui::callbacks;
use crate::domain::entities::Message;
use crate::domain::traits::{Bot, BotInfo, Keyboard, OutgoingDocument};
use crate::infrastructure::storage::safe_filename;

/// The single chat the console talks as
pub const CONSOLE_CHAT_ID: i64 = 1;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    output_dir: PathBuf,
}

impl ConsoleAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "export-roster-bot".to_string(),
                username: "console".to_string(),
            },
            output_dir: output_dir.into(),
        }
    }

    /// Map a typed line to the update a Telegram client would have sent
    pub fn to_message(parser: &MessageParser, line: &str) -> Option<Message> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(path) = line.strip_prefix("/file ") {
            let path = path.trim();
            let name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let size = std::fs::metadata(path).ok().map(|m| m.len());
            return Some(parser.parse_document(CONSOLE_CHAT_ID, path, name, size));
        }

        let button = match line {
            "/go" => Some(callbacks::START_PROCESS),
            "/help" => Some(callbacks::EXPORT_HELP),
            "/faq" => Some(callbacks::FAQ),
            "/again" => Some(callbacks::PROCESS_OTHER),
            _ => None,
        };
        match button {
            Some(data) => Some(parser.parse_callback(CONSOLE_CHAT_ID, "console", Some(data.to_string()))),
            None => Some(parser.parse(CONSOLE_CHAT_ID, line)),
        }
    }

    fn print_buttons(buttons: &Keyboard) {
        for row in buttons {
            let row_text: Vec<&str> = row.iter().map(|b| b.text.as_str()).collect();
            println!("  [Buttons] {}", row_text.join(" | "));
        }
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode), documents go to {}", self.output_dir.display());
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn send_message(&self, _chat_id: i64, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    async fn send_with_keyboard(&self, _chat_id: i64, text: &str, buttons: Keyboard) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Self::print_buttons(&buttons);
        Ok("console_msg".to_string())
    }

    async fn send_document(&self, _chat_id: i64, document: OutgoingDocument, buttons: Option<Keyboard>) -> Result<String, BotError> {
        let path = self.output_dir.join(safe_filename(&document.file_name));
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(StorageError::from)?;

        println!("[BOT] document saved to {}", path.display());
        if let Some(caption) = &document.caption {
            println!("[BOT] {}", caption);
        }
        if let Some(buttons) = &buttons {
            Self::print_buttons(buttons);
        }
        Ok(path.display().to_string())
    }

    async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> Result<(), BotError> {
        Ok(())
    }

    /// File ids are local paths in console mode
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        tokio::fs::read(file_id).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BotError::NotFound(format!("file {}", file_id)),
            _ => StorageError::from(e).into(),
        })
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Content;

    #[test]
    fn test_file_line_becomes_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        std::fs::write(&path, "{}").unwrap();

        let parser = MessageParser::new("console");
        let msg = ConsoleAdapter::to_message(&parser, &format!("/file {}", path.display())).unwrap();
        match msg.content {
            Content::Document(meta) => {
                assert_eq!(meta.file_name, "result.json");
                assert_eq!(meta.file_size, 2);
                assert_eq!(meta.file_id, path.display().to_string());
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_shortcuts_press_buttons() {
        let parser = MessageParser::new("console");
        let msg = ConsoleAdapter::to_message(&parser, "/go").unwrap();
        assert!(matches!(msg.content, Content::CallbackData { ref data, .. } if data == callbacks::START_PROCESS));

        assert!(ConsoleAdapter::to_message(&parser, "/start").unwrap().content.is_command());
        assert!(ConsoleAdapter::to_message(&parser, "   ").is_none());
    }

    #[tokio::test]
    async fn test_documents_land_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bot = ConsoleAdapter::new(dir.path());
        bot.start().await.unwrap();

        let doc = OutgoingDocument::new("participants_01.xlsx", vec![1, 2, 3]);
        bot.send_document(CONSOLE_CHAT_ID, doc, None).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("participants_01.xlsx")).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let bot = ConsoleAdapter::new("unused");
        let err = bot.download_file("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, BotError::NotFound(_)));
    }
}
