use crate::chat::ChatService;
use anyhow::Result;
use serenity::prelude::*;
use std::sync::Arc;

mod commands;
mod handler;
mod util;

use handler::Handler;

pub const DISCORD_MAX_LEN: usize = 2000;

pub struct Bot {
    token: String,
    chat: Arc<ChatService>,
}

impl Bot {
    pub fn new(token: &str, chat: Arc<ChatService>) -> Self {
        Self {
            token: token.to_string(),
            chat,
        }
    }

    pub async fn start(self) -> Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = Handler {
            chat: self.chat,
            bot_id: Arc::new(RwLock::new(None)),
        };

        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await?;

        client.start().await?;

        Ok(())
    }
}
