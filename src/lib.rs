//! Telegram bot that turns chat-history exports into participant rosters.
//!
//! Users upload Telegram Desktop JSON exports; the bot extracts authors,
//! `@mentions` and `t.me` channel links and answers with a text report or an
//! Excel workbook.

pub mod application;
pub mod domain;
pub mod infrastructure;
