//! Telegram adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::Message as DomainMessage;
use crate::domain::traits::{Bot, BotInfo, Keyboard, OutgoingDocument};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// Every Bot API reply comes in this envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Api(format!(
                "{} failed: {}",
                method,
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_data: Option<String>,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(buttons: &Keyboard) -> Self {
        let inline_keyboard = buttons
            .iter()
            .map(|row| {
                row.iter()
                    .map(|btn| InlineKeyboardButton {
                        text: btn.text.clone(),
                        callback_data: btn.callback_data.clone(),
                    })
                    .collect()
            })
            .collect();
        Self { inline_keyboard }
    }
}

/// Convert a raw update into a domain message; updates without a chat are dropped
pub fn to_message(parser: &MessageParser, update: &Update) -> Option<DomainMessage> {
    if let Some(query) = &update.callback_query {
        let chat_id = query.message.as_ref()?.chat.id;
        return Some(parser.parse_callback(chat_id, query.id.clone(), query.data.clone()));
    }

    let msg = update.message.as_ref()?;
    let chat_id = msg.chat.id;
    if let Some(doc) = &msg.document {
        return Some(parser.parse_document(chat_id, doc.file_id.clone(), doc.file_name.clone(), doc.file_size));
    }
    match &msg.text {
        Some(text) => Some(parser.parse(chat_id, text.clone())),
        None => Some(DomainMessage::new(chat_id, crate::domain::entities::Content::Empty)),
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "export-roster-bot".to_string(),
                username: String::new(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", API_BASE, self.token, file_path)
    }

    async fn call<Req: Serialize + ?Sized, Res: DeserializeOwned>(&self, method: &str, request: &Req) -> Result<Res, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await?;

        let data: ApiResponse<Res> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        data.into_result(method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        let me: BotInfoResponse = self.call("getMe", &serde_json::json!({})).await?;
        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username.unwrap_or_default(),
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<&'static str>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> Option<i64> {
        updates.iter().map(|u| u.update_id + 1).max()
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: &'static str,
            description: &'static str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let request = SetMyCommandsRequest {
            commands: vec![
                Command { command: "start", description: "Start a new session" },
                Command { command: "stop", description: "Stop the current session" },
            ],
        };

        let _: bool = self.call("setMyCommands", &request).await?;
        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str, buttons: Option<&Keyboard>) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_markup: Option<InlineKeyboardMarkup>,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: buttons.map(InlineKeyboardMarkup::from),
        };
        let result: MessageResult = self.call("sendMessage", &request).await?;
        Ok(result.message_id.to_string())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", &self.token[..8.min(self.token.len())]);
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {} chars", chat_id, text.len());
        self.send_text(chat_id, text, None).await
    }

    async fn send_with_keyboard(&self, chat_id: i64, text: &str, buttons: Keyboard) -> Result<String, BotError> {
        tracing::debug!("Sending with keyboard to {}: {} chars", chat_id, text.len());
        self.send_text(chat_id, text, Some(&buttons)).await
    }

    async fn send_document(&self, chat_id: i64, document: OutgoingDocument, buttons: Option<Keyboard>) -> Result<String, BotError> {
        tracing::debug!("Sending document {} ({} bytes) to {}", document.file_name, document.bytes.len(), chat_id);

        let mime = if document.file_name.ends_with(".xlsx") {
            XLSX_MIME
        } else {
            "application/octet-stream"
        };
        let part = Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(mime)?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);
        if let Some(caption) = document.caption {
            form = form.text("caption", caption);
        }
        if let Some(buttons) = &buttons {
            let markup = serde_json::to_string(&InlineKeyboardMarkup::from(buttons))
                .map_err(|e| BotError::Parse(e.to_string()))?;
            form = form.text("reply_markup", markup);
        }

        let response = self.client
            .post(self.api_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let data: ApiResponse<MessageResult> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.into_result("sendDocument")?.message_id.to_string())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct AnswerRequest<'a> {
            callback_query_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
        }

        let request = AnswerRequest {
            callback_query_id: callback_id,
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        #[derive(Serialize)]
        struct GetFileRequest<'a> {
            file_id: &'a str,
        }

        #[derive(Deserialize)]
        struct FileResult {
            file_path: Option<String>,
        }

        let file: FileResult = self.call("getFile", &GetFileRequest { file_id }).await?;
        let path = file
            .file_path
            .ok_or_else(|| BotError::NotFound(format!("file {} has no download path", file_id)))?;

        let response = self.client.get(self.file_url(&path)).send().await?;
        if !response.status().is_success() {
            return Err(BotError::Network(format!("File download error: {}", response.status())));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ui::{callbacks, keyboards};
    use crate::domain::entities::Content;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_document_update() {
        let parser = MessageParser::new("roster_bot");
        let upd = update(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "chat": {"id": 77},
                "document": {"file_id": "BQAC", "file_name": "result.json", "file_size": 2048}
            }
        }));

        let msg = to_message(&parser, &upd).unwrap();
        assert_eq!(msg.chat_id, 77);
        match msg.content {
            Content::Document(meta) => {
                assert_eq!(meta.file_id, "BQAC");
                assert_eq!(meta.file_name, "result.json");
                assert_eq!(meta.file_size, 2048);
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_callback_update_uses_message_chat() {
        let parser = MessageParser::new("roster_bot");
        let upd = update(json!({
            "update_id": 11,
            "callback_query": {
                "id": "cbq",
                "data": "FAQ",
                "message": {"message_id": 5, "chat": {"id": -100}}
            }
        }));

        let msg = to_message(&parser, &upd).unwrap();
        assert_eq!(msg.chat_id, -100);
        assert_eq!(
            msg.content,
            Content::CallbackData { callback_id: "cbq".into(), data: "FAQ".into() }
        );
    }

    #[test]
    fn test_callback_without_message_is_dropped() {
        let parser = MessageParser::new("roster_bot");
        let upd = update(json!({"update_id": 12, "callback_query": {"id": "cbq", "data": "FAQ"}}));
        assert!(to_message(&parser, &upd).is_none());
    }

    #[test]
    fn test_text_update_parses_commands() {
        let parser = MessageParser::new("roster_bot");
        let upd = update(json!({
            "update_id": 13,
            "message": {"message_id": 2, "chat": {"id": 1}, "text": "/start"}
        }));
        assert!(to_message(&parser, &upd).unwrap().content.is_command());
    }

    #[test]
    fn test_next_offset() {
        let updates = vec![
            update(json!({"update_id": 3})),
            update(json!({"update_id": 9})),
        ];
        assert_eq!(TelegramAdapter::get_next_offset(&updates), Some(10));
        assert_eq!(TelegramAdapter::get_next_offset(&[]), None);
    }

    #[test]
    fn test_keyboard_markup_serialization() {
        let markup = InlineKeyboardMarkup::from(&keyboards::process_other_menu());
        let value = serde_json::to_value(&markup).unwrap();
        let button = &value["inline_keyboard"][0][0];
        assert_eq!(button["callback_data"], callbacks::PROCESS_OTHER);
        assert_eq!(button["text"], "Process another chat");
    }

    #[test]
    fn test_api_error_envelope() {
        let resp: ApiResponse<MessageResult> =
            serde_json::from_value(json!({"ok": false, "description": "Bad Request: chat not found"})).unwrap();
        let err = resp.into_result("sendMessage").unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }
}
