use crate::agent::AgentError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ResponseFormat,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// The shape of reply an agent expects from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFormat {
    #[default]
    Text,
    /// Ask the endpoint to constrain the reply to a single JSON object.
    JsonObject,
}

/// A single system + user exchange sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub reply_format: ReplyFormat,
}

impl CompletionRequest {
    pub fn text(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            reply_format: ReplyFormat::Text,
        }
    }

    pub fn json(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            reply_format: ReplyFormat::JsonObject,
            ..Self::text(system_prompt, user_prompt)
        }
    }
}

/// A generic client for interacting with an LLM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-streaming chat completion call and returns the text
    /// of the first choice. A reply without content comes back as an empty string.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AgentError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "openai/gpt-4.1-mini").
    /// * `temperature` - Sampling temperature sent with every request.
    /// * `timeout` - Upper bound on a single call; expiry is reported as [`AgentError::Timeout`].
    pub fn new(config: OpenAIConfig, model: String, temperature: f32, timeout: Duration) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            temperature,
            timeout,
        }
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .temperature(self.temperature)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user_prompt)
                    .build()?
                    .into(),
            ]);
        if request.reply_format == ReplyFormat::JsonObject {
            args.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = args.build()?;

        debug!(model = %self.model, format = ?request.reply_format, "Sending chat completion");
        let response: CreateChatCompletionResponse =
            tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
                .await
                .map_err(|_| AgentError::Timeout(self.timeout))??;

        Ok(first_choice_text(&response))
    }
}

fn first_choice_text(response: &CreateChatCompletionResponse) -> String {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_request_keeps_prompts() {
        let request = CompletionRequest::json("system", "user");
        assert_eq!(request.system_prompt, "system");
        assert_eq!(request.user_prompt, "user");
        assert_eq!(request.reply_format, ReplyFormat::JsonObject);
        assert_eq!(
            CompletionRequest::text("a", "b").reply_format,
            ReplyFormat::Text
        );
    }

    #[test]
    fn first_choice_text_trims_and_tolerates_missing_content() {
        let response: CreateChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "test",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "  hello  " },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        assert_eq!(first_choice_text(&response), "hello");

        let empty: CreateChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 0,
            "model": "test",
            "choices": []
        }))
        .unwrap();
        assert_eq!(first_choice_text(&empty), "");
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accepts connections and holds them open without ever replying.
        let server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let timeout = Duration::from_millis(300);
        let config = OpenAIConfig::new()
            .with_api_key("test-token")
            .with_api_base(format!("http://{addr}"));
        let client = OpenAICompatibleClient::new(config, "test-model".into(), 0.0, timeout);

        let started = std::time::Instant::now();
        let err = client
            .complete(CompletionRequest::text("system", "user"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Timeout(t) if t == timeout), "{err:?}");
        assert_eq!(err.to_string(), "Model request timed out after 300ms");
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
