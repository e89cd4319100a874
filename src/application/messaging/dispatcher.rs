//! Message dispatcher - routes inbound updates through the session state machine

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::application::services::{ProcessingService, RunReport};
use crate::application::session::{lock, Admission, ProcessRejection, SessionHandle, SessionStore, Touch};
use crate::application::ui::{callbacks, keyboards, texts};
use crate::domain::entities::{Content, FileMeta, Message, SessionState};
use crate::domain::traits::Bot;

const EXPORT_EXTENSION: &str = ".json";

/// What handling an update led to
#[derive(Debug)]
pub enum Dispatched {
    Handled,
    /// A processing run was started in the background
    RunStarted(JoinHandle<RunReport>),
}

/// Message dispatcher - one instance serves all chats
pub struct MessageDispatcher {
    bot: Arc<dyn Bot>,
    store: Arc<SessionStore>,
    processor: Arc<ProcessingService>,
}

impl MessageDispatcher {
    pub fn new(bot: Arc<dyn Bot>, store: Arc<SessionStore>, processor: Arc<ProcessingService>) -> Self {
        Self { bot, store, processor }
    }

    /// Handle an update, logging instead of propagating failures
    pub async fn dispatch(&self, message: Message) -> Option<JoinHandle<RunReport>> {
        let chat_id = message.chat_id;
        let kind = message.content.kind();
        match self.handle(message).await {
            Ok(Dispatched::RunStarted(handle)) => Some(handle),
            Ok(Dispatched::Handled) => None,
            Err(e) => {
                tracing::error!("Failed to handle {} update for chat {}: {}", kind, chat_id, e);
                None
            }
        }
    }

    pub async fn handle(&self, message: Message) -> Result<Dispatched, BotError> {
        let chat_id = message.chat_id;
        tracing::debug!("Chat {}: {} update", chat_id, message.content.kind());

        match message.content {
            Content::Command { name, .. } => match name.as_str() {
                "start" => self.handle_start(chat_id).await,
                "stop" => self.handle_stop(chat_id).await,
                _ => self.handle_other(chat_id).await,
            },
            Content::Document(file) => self.handle_document(chat_id, file).await,
            Content::CallbackData { callback_id, data } => self.handle_callback(chat_id, &callback_id, &data).await,
            Content::Text(_) | Content::Empty => self.handle_other(chat_id).await,
        }
    }

    async fn handle_start(&self, chat_id: i64) -> Result<Dispatched, BotError> {
        self.store.restart(chat_id);
        tracing::debug!("Chat {} started a session ({} active)", chat_id, self.store.len());
        self.send_start(chat_id).await
    }

    async fn handle_stop(&self, chat_id: i64) -> Result<Dispatched, BotError> {
        self.store.reset(chat_id);
        tracing::info!("Chat {} stopped its session", chat_id);
        self.bot
            .send_with_keyboard(chat_id, &texts::stopped(), keyboards::start_menu())
            .await?;
        Ok(Dispatched::Handled)
    }

    async fn handle_other(&self, chat_id: i64) -> Result<Dispatched, BotError> {
        self.touch_or_expire(chat_id).await?;
        Ok(Dispatched::Handled)
    }

    async fn handle_document(&self, chat_id: i64, file: FileMeta) -> Result<Dispatched, BotError> {
        let Some(session) = self.touch_or_expire(chat_id).await? else {
            return Ok(Dispatched::Handled);
        };

        if lock(&session).state == SessionState::Processing {
            self.bot.send_message(chat_id, &texts::already_processing()).await?;
            return Ok(Dispatched::Handled);
        }

        if !file.file_name.to_lowercase().ends_with(EXPORT_EXTENSION) {
            tracing::debug!("Chat {}: rejected {}", chat_id, file.file_name);
            self.bot.send_message(chat_id, &texts::unsupported_format()).await?;
            return Ok(Dispatched::Handled);
        }

        let file_name = file.file_name.clone();
        match self.store.admit_file(chat_id, file) {
            Admission::Accepted { count } => {
                tracing::info!("Chat {}: accepted {} ({} staged)", chat_id, file_name, count);
                self.bot
                    .send_with_keyboard(chat_id, &texts::file_accepted(count), keyboards::ready_menu())
                    .await?;
            }
            Admission::Processing => {
                self.bot.send_message(chat_id, &texts::already_processing()).await?;
            }
            Admission::LimitReached { max } => {
                self.bot
                    .send_with_keyboard(chat_id, &texts::too_many_files(max), keyboards::process_other_menu())
                    .await?;
            }
        }
        Ok(Dispatched::Handled)
    }

    async fn handle_callback(&self, chat_id: i64, callback_id: &str, data: &str) -> Result<Dispatched, BotError> {
        self.bot.answer_callback(callback_id, None).await?;

        if self.touch_or_expire(chat_id).await?.is_none() && data != callbacks::RESTART {
            return Ok(Dispatched::Handled);
        }

        match data {
            "" => Ok(Dispatched::Handled),
            callbacks::EXPORT_HELP => {
                self.bot
                    .send_with_keyboard(chat_id, &texts::export_help(), keyboards::start_menu())
                    .await?;
                Ok(Dispatched::Handled)
            }
            callbacks::FAQ => {
                self.bot
                    .send_with_keyboard(chat_id, &texts::faq(), keyboards::start_menu())
                    .await?;
                Ok(Dispatched::Handled)
            }
            callbacks::START_PROCESS => self.start_processing(chat_id).await,
            callbacks::PROCESS_OTHER | callbacks::RESTART => self.handle_start(chat_id).await,
            unknown => {
                tracing::debug!("Chat {}: unknown callback {:?}", chat_id, unknown);
                self.bot.send_message(chat_id, &texts::unknown_command()).await?;
                Ok(Dispatched::Handled)
            }
        }
    }

    async fn start_processing(&self, chat_id: i64) -> Result<Dispatched, BotError> {
        let ticket = match self.store.begin_processing(chat_id) {
            Ok(ticket) => ticket,
            Err(ProcessRejection::NoFiles) => {
                self.bot
                    .send_with_keyboard(chat_id, &texts::no_files(), keyboards::start_menu())
                    .await?;
                return Ok(Dispatched::Handled);
            }
            Err(ProcessRejection::AlreadyProcessing) => {
                self.bot.send_message(chat_id, &texts::run_in_progress()).await?;
                return Ok(Dispatched::Handled);
            }
        };

        let total = ticket.files.len();
        tracing::info!("Chat {}: processing {} file(s)", chat_id, total);
        if let Err(e) = self.bot.send_message(chat_id, &texts::processing_started(total)).await {
            tracing::warn!("Failed to announce run for chat {}: {}", chat_id, e);
        }

        Ok(Dispatched::RunStarted(self.processor.spawn(ticket)))
    }

    async fn send_start(&self, chat_id: i64) -> Result<Dispatched, BotError> {
        self.bot
            .send_with_keyboard(chat_id, &texts::start(), keyboards::start_menu())
            .await?;
        Ok(Dispatched::Handled)
    }

    /// Refresh the chat's session, or tell the user it has expired
    async fn touch_or_expire(&self, chat_id: i64) -> Result<Option<SessionHandle>, BotError> {
        match self.store.touch(chat_id) {
            Touch::Active(handle) => Ok(Some(handle)),
            Touch::Expired => {
                self.bot
                    .send_with_keyboard(chat_id, &texts::expired(), keyboards::restart_menu())
                    .await?;
                Ok(None)
            }
        }
    }
}
