use super::types::{ChatMessage, LanguageModel, ModelError, ModelRequest, Role};
use async_trait::async_trait;
use rig::{
    client::CompletionClient,
    completion::{Chat, Message},
};
use std::time::Duration;
use tracing::debug;

pub struct RigModel<C: CompletionClient> {
    client: C,
    model: String,
    timeout: Duration,
}

impl<C: CompletionClient> RigModel<C> {
    pub fn new(client: C, model: &str, timeout: Duration) -> Self {
        Self {
            client,
            model: model.to_string(),
            timeout,
        }
    }
}

/// A request reshaped for rig's chat API: system text, prior turns, and
/// the final user prompt.
#[derive(Debug, PartialEq)]
struct ChatParts<'a> {
    preamble: String,
    history: Vec<&'a ChatMessage>,
    prompt: &'a str,
}

fn split_request(messages: &[ChatMessage]) -> Result<ChatParts<'_>, ModelError> {
    let (last, rest) = messages.split_last().ok_or(ModelError::NoPrompt)?;
    if last.role != Role::User {
        return Err(ModelError::NoPrompt);
    }

    let preamble = rest
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let history = rest.iter().filter(|m| m.role != Role::System).collect();

    Ok(ChatParts {
        preamble,
        history,
        prompt: &last.content,
    })
}

fn to_rig_message(message: &ChatMessage) -> Message {
    match message.role {
        Role::Assistant => Message::assistant(message.content.clone()),
        _ => Message::user(message.content.clone()),
    }
}

#[async_trait]
impl<C> LanguageModel for RigModel<C>
where
    C: CompletionClient + Send + Sync,
    C::CompletionModel: 'static,
{
    async fn complete(&self, request: ModelRequest) -> Result<String, ModelError> {
        let parts = split_request(&request.messages)?;
        let history: Vec<Message> = parts.history.iter().map(|m| to_rig_message(m)).collect();

        let mut builder = self
            .client
            .agent(&self.model)
            .preamble(&parts.preamble)
            .temperature(request.temperature);
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        let agent = builder.build();

        debug!(
            "Sending {} history messages to model {}",
            history.len(),
            self.model
        );

        bounded(self.timeout, agent.chat(parts.prompt.to_string(), history)).await
    }
}

async fn bounded<F, E>(timeout: Duration, reply: F) -> Result<String, ModelError>
where
    F: Future<Output = Result<String, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, reply).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ModelError::Request(e.to_string())),
        Err(_) => Err(ModelError::Timeout(timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_system_history_and_prompt() {
        let messages = vec![
            ChatMessage::system("persona"),
            ChatMessage::user("hello"),
            ChatMessage::assistant("greetings"),
            ChatMessage::user("who are you?"),
        ];

        let parts = split_request(&messages).unwrap();

        assert_eq!(parts.preamble, "persona");
        assert_eq!(parts.history, vec![&messages[1], &messages[2]]);
        assert_eq!(parts.prompt, "who are you?");
    }

    #[test]
    fn rejects_request_without_trailing_user_message() {
        assert!(matches!(split_request(&[]), Err(ModelError::NoPrompt)));

        let messages = vec![ChatMessage::system("persona"), ChatMessage::assistant("hi")];
        assert!(matches!(
            split_request(&messages),
            Err(ModelError::NoPrompt)
        ));
    }

    #[tokio::test]
    async fn stalled_reply_times_out() {
        let stalled = std::future::pending::<Result<String, String>>();

        let result = bounded(Duration::from_millis(20), stalled).await;

        assert!(matches!(result, Err(ModelError::Timeout(_))));
    }

    #[tokio::test]
    async fn provider_errors_and_replies_pass_through() {
        let failed = bounded(Duration::from_secs(5), async {
            Err::<String, _>("rate limited")
        })
        .await;
        assert!(matches!(failed, Err(ModelError::Request(msg)) if msg == "rate limited"));

        let ok = bounded(Duration::from_secs(5), async { Ok::<_, String>("hi".to_string()) }).await;
        assert_eq!(ok.unwrap(), "hi");
    }
}
