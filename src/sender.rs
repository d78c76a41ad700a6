//! Outbound message dispatch.
//!
//! The scheduler and handlers talk to Telegram through the [`MessageSender`]
//! trait so tests can substitute a recording fake. The real implementation
//! wraps a teloxide [`Bot`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `chat_id`. `markdown` selects Telegram Markdown
    /// rendering. Errors carry the transport's description; the scheduler
    /// classifies permanent failures by substring.
    async fn send(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }
        request
            .await
            .with_context(|| format!("failed to send message to chat {chat_id}"))?;
        Ok(())
    }
}
