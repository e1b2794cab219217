use super::commands::{
    Command, FAILURE_REPLY, GREETING, HELP_TEXT, ModeArg, mode_reply, parse_command,
};
use super::util::{split_message, strip_mention};
use super::DISCORD_MAX_LEN;
use crate::chat::{ChatService, SessionId};
use serenity::{
    async_trait,
    model::{channel::Message, gateway::Ready, id::UserId},
    prelude::*,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub(super) struct Handler {
    pub chat: Arc<ChatService>,
    pub bot_id: Arc<RwLock<Option<UserId>>>,
}

/// Produces the reply for one inbound message: a command result, or a chat
/// turn. Chat failures become the in-character failure line.
pub(super) async fn answer(chat: &ChatService, session_id: SessionId, content: &str) -> String {
    let Some(command) = parse_command(content) else {
        return match chat.respond(session_id, content).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat error in session {}: {}", session_id, e);
                FAILURE_REPLY.to_string()
            }
        };
    };

    match command {
        Command::Start | Command::Reset => {
            chat.reset(session_id).await;
            GREETING.to_string()
        }
        Command::Help => HELP_TEXT.to_string(),
        Command::Mode(ModeArg::Toggle) => {
            let mode = chat.toggle_mode(session_id).await;
            mode_reply(mode).to_string()
        }
        Command::Mode(ModeArg::Set(mode)) => {
            chat.set_mode(session_id, mode).await;
            mode_reply(mode).to_string()
        }
        Command::Mode(ModeArg::Invalid(arg)) => {
            format!("Unknown mode `{}`. Use `/mode normal` or `/mode analysis`.", arg)
        }
        Command::Unknown(name) => {
            warn!("Unknown command /{} in session {}", name, session_id);
            format!("I do not know `/{}`. Try `/help`.", name)
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(bot_id) = *self.bot_id.read().await else {
            return;
        };

        let is_direct = msg.guild_id.is_none();
        if !is_direct && !msg.mentions.iter().any(|u| u.id == bot_id) {
            return;
        }

        let content = strip_mention(&msg.content, bot_id.get());
        if content.is_empty() {
            return;
        }

        let session_id = msg.channel_id.get();
        let typing = msg.channel_id.start_typing(&ctx.http);
        let reply = answer(&self.chat, session_id, &content).await;
        typing.stop();

        let chunks = split_message(&reply, DISCORD_MAX_LEN);
        for (i, chunk) in chunks.iter().enumerate() {
            let result = if i == 0 {
                msg.reply(&ctx, chunk).await
            } else {
                msg.channel_id.say(&ctx.http, chunk).await
            };
            if let Err(e) = result {
                error!("Failed to send message chunk {}: {}", i, e);
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Bot connected as {}", ready.user.name);
        *self.bot_id.write().await = Some(ready.user.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatMode, PromptComposer, SessionStore};
    use crate::llm::ModelError;
    use crate::llm::testing::ScriptedModel;

    fn chat_with(model: Arc<ScriptedModel>) -> ChatService {
        ChatService::new(model, SessionStore::new(), PromptComposer::default(), 0.7, 300)
    }

    #[tokio::test]
    async fn chat_text_goes_to_the_model() {
        let model = Arc::new(ScriptedModel::new(["Shadows."]));
        let chat = chat_with(model.clone());

        assert_eq!(answer(&chat, 1, "what are you?").await, "Shadows.");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn model_error_becomes_in_character_reply() {
        let model = Arc::new(ScriptedModel::default());
        model.push_error(ModelError::Timeout(60));
        let chat = chat_with(model);

        assert_eq!(answer(&chat, 1, "hello?").await, FAILURE_REPLY);
    }

    #[tokio::test]
    async fn start_resets_the_session() {
        let model = Arc::new(ScriptedModel::new(["first"]));
        let chat = chat_with(model.clone());
        answer(&chat, 2, "remember me").await;
        answer(&chat, 2, "/mode analysis").await;

        assert_eq!(answer(&chat, 2, "/start").await, GREETING);

        let session = chat.store().snapshot(2).await.unwrap();
        assert!(session.is_empty());
        assert_eq!(session.mode, ChatMode::Normal);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn mode_commands_update_the_session() {
        let chat = chat_with(Arc::new(ScriptedModel::default()));

        assert_eq!(
            answer(&chat, 3, "/mode").await,
            mode_reply(ChatMode::Analysis)
        );
        assert_eq!(
            chat.store().snapshot(3).await.unwrap().mode,
            ChatMode::Analysis
        );

        assert_eq!(
            answer(&chat, 3, "/mode normal").await,
            mode_reply(ChatMode::Normal)
        );
        assert!(answer(&chat, 3, "/mode loud").await.contains("Unknown mode"));
        assert!(answer(&chat, 3, "/broadcast hi").await.contains("/help"));
        assert_eq!(answer(&chat, 3, "/help").await, HELP_TEXT);
    }
}
