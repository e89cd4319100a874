//! Processing runs: download, parse and deliver each staged export in order.
//!
//! A run is spawned as its own task and never reports back to the handler
//! that started it. Every outcome ends with the session removed and the run's
//! scratch directory deleted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::application::export::TelegramExportParser;
use crate::application::formatters::format_report;
use crate::application::session::{RunTicket, SessionStore};
use crate::application::ui::{keyboards, texts};
use crate::domain::entities::{FileMeta, ResultBundle};
use crate::domain::traits::{Bot, OutgoingDocument};
use crate::infrastructure::config::Config;
use crate::infrastructure::spreadsheet::render_workbook;
use crate::infrastructure::storage::{indexed_filename, ScratchDir};

/// Telegram rejects longer message texts
const MESSAGE_TEXT_LIMIT: usize = 4096;

/// Knobs for a processing run
#[derive(Debug, Clone)]
pub struct ProcessingSettings {
    /// Files with at most this many participants are answered with text
    pub text_threshold_max: usize,
    /// Pause between deliveries of consecutive files
    pub delivery_pause: Duration,
    pub scratch_root: Option<PathBuf>,
    pub scratch_prefix: String,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ProcessingSettings {
    fn from(config: &Config) -> Self {
        Self {
            text_threshold_max: config.limits.text_threshold_max,
            delivery_pause: config.limits.delivery_pause(),
            scratch_root: config.storage.scratch_dir.clone(),
            scratch_prefix: config.storage.prefix.clone(),
        }
    }
}

/// How a single file's result is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Text,
    Spreadsheet,
}

/// What was delivered for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text { file_name: String, participants: usize },
    Spreadsheet { file_name: String, document_name: String, participants: usize },
}

/// Summary of a finished run
#[derive(Debug, Default)]
pub struct RunReport {
    pub chat_id: i64,
    pub deliveries: Vec<Delivery>,
    pub error: Option<String>,
    pub scratch_dir: Option<PathBuf>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub struct ProcessingService {
    bot: Arc<dyn Bot>,
    store: Arc<SessionStore>,
    parser: TelegramExportParser,
    settings: ProcessingSettings,
}

impl ProcessingService {
    pub fn new(bot: Arc<dyn Bot>, store: Arc<SessionStore>, settings: ProcessingSettings) -> Self {
        Self {
            bot,
            store,
            parser: TelegramExportParser::new(),
            settings,
        }
    }

    /// Threshold routing: `<= text_threshold_max` participants go out as text
    pub fn route(&self, participants: usize) -> Route {
        if participants <= self.settings.text_threshold_max {
            Route::Text
        } else {
            Route::Spreadsheet
        }
    }

    /// Start a detached run. Dropping the handle does not cancel it.
    pub fn spawn(self: &Arc<Self>, ticket: RunTicket) -> JoinHandle<RunReport> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(ticket).await })
    }

    pub async fn run(&self, ticket: RunTicket) -> RunReport {
        let chat_id = ticket.chat_id;
        let mut report = RunReport {
            chat_id,
            ..RunReport::default()
        };
        let mut scratch: Option<ScratchDir> = None;

        tracing::info!("Run for chat {} started with {} file(s)", chat_id, ticket.files.len());

        match self.process_files(&ticket, &mut scratch, &mut report).await {
            Ok(()) => {
                tracing::info!("Run for chat {} finished, {} result(s) delivered", chat_id, report.deliveries.len());
            }
            Err(e) => {
                tracing::error!("Processing error for chat {}: {}", chat_id, e);
                report.error = Some(e.to_string());
                if let Err(notify_err) = self.bot
                    .send_with_keyboard(chat_id, &texts::processing_failed(), keyboards::process_other_menu())
                    .await
                {
                    tracing::warn!("Failed to send failure notice to chat {}: {}", chat_id, notify_err);
                }
            }
        }

        self.store.reset_if_current(chat_id, ticket.session_id);

        if let Some(mut dir) = scratch {
            report.scratch_dir = Some(dir.path().to_path_buf());
            if let Err(e) = dir.cleanup() {
                tracing::warn!("Failed to remove scratch dir {}: {}", dir.path().display(), e);
            }
        }

        report
    }

    async fn process_files(
        &self,
        ticket: &RunTicket,
        scratch: &mut Option<ScratchDir>,
        report: &mut RunReport,
    ) -> Result<(), BotError> {
        let prefix = format!("{}{}-", self.settings.scratch_prefix, ticket.chat_id);
        let dir = scratch.insert(ScratchDir::create(self.settings.scratch_root.as_deref(), &prefix)?);

        let total = ticket.files.len();
        for (offset, meta) in ticket.files.iter().enumerate() {
            let index = offset + 1;
            let is_last = index == total;

            let delivery = self.process_file(dir, ticket.chat_id, meta, index, total).await?;
            report.deliveries.push(delivery);

            if !is_last && !self.settings.delivery_pause.is_zero() {
                tokio::time::sleep(self.settings.delivery_pause).await;
            }
        }

        Ok(())
    }

    async fn process_file(
        &self,
        dir: &ScratchDir,
        chat_id: i64,
        meta: &FileMeta,
        index: usize,
        total: usize,
    ) -> Result<Delivery, BotError> {
        let is_last = index == total;

        let bytes = self.bot.download_file(&meta.file_id).await?;
        let path = dir.write(&indexed_filename(index, &meta.file_name), &bytes).await?;
        tracing::debug!("Chat {}: file {}/{} saved to {}", chat_id, index, total, path.display());

        let bundle = self.parse(path).await?;
        let participants = bundle.participants.len();
        let mentions = bundle.mentions.len();
        let after = is_last.then(keyboards::process_other_menu);

        if self.route(participants) == Route::Text {
            let text = format!(
                "{}\n\n{}",
                texts::file_progress(index, total),
                format_report(&[meta.file_name.as_str()], &bundle)
            );
            let length = text.chars().count();
            if length <= MESSAGE_TEXT_LIMIT {
                match after {
                    Some(keyboard) => self.bot.send_with_keyboard(chat_id, &text, keyboard).await?,
                    None => self.bot.send_message(chat_id, &text).await?,
                };
                return Ok(Delivery::Text {
                    file_name: meta.file_name.clone(),
                    participants,
                });
            }
            tracing::info!(
                "Chat {}: report for {} is {} chars, sending a workbook instead",
                chat_id,
                meta.file_name,
                length
            );
        }

        let workbook = render_workbook(&bundle, Utc::now())?;
        let document_name = format!("participants_{:02}.xlsx", index);
        dir.write(&document_name, &workbook).await?;

        let caption = texts::spreadsheet_caption(index, total, &meta.file_name, participants, mentions);
        let document = OutgoingDocument::new(document_name.clone(), workbook).with_caption(caption);
        self.bot.send_document(chat_id, document, after).await?;
        Ok(Delivery::Spreadsheet {
            file_name: meta.file_name.clone(),
            document_name,
            participants,
        })
    }

    async fn parse(&self, path: PathBuf) -> Result<ResultBundle, BotError> {
        let parser = self.parser;
        let bundle = tokio::task::spawn_blocking(move || parser.parse_file(&path))
            .await
            .map_err(|e| BotError::Internal(format!("parser task failed: {}", e)))??;
        Ok(bundle)
    }
}
