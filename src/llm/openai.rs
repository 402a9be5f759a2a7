use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};
use backoff::ExponentialBackoffBuilder;

use super::{GenerateRequest, GenerateResponse, Provider};

const GOOGLE_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Chat-completions provider for any OpenAI-compatible endpoint.
///
/// Gemini is reached through Google's OpenAI-compatible surface, so one
/// implementation covers Google, OpenAI and Ollama.
pub struct OpenAICompatProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
}

impl OpenAICompatProvider {
    pub fn google(api_key: &str) -> Self {
        Self::with_base("google", api_key, GOOGLE_OPENAI_BASE)
    }

    pub fn openai(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: single_attempt(Client::with_config(config)),
            provider_name: "openai".to_string(),
        }
    }

    pub fn ollama(base_url: &str) -> Self {
        Self::with_base(
            "ollama",
            "ollama",
            &format!("{}/v1", base_url.trim_end_matches('/')),
        )
    }

    pub fn with_base(provider_name: &str, api_key: &str, api_base: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self {
            client: single_attempt(Client::with_config(config)),
            provider_name: provider_name.to_string(),
        }
    }
}

/// async-openai retries 5xx and 429 responses for up to 15 minutes by default.
/// A zero elapsed-time budget turns every failure into a final one.
fn single_attempt(client: Client<OpenAIConfig>) -> Client<OpenAIConfig> {
    client.with_backoff(
        ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build(),
    )
}

fn build_messages(req: &GenerateRequest) -> Vec<ChatCompletionRequestMessage> {
    vec![ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(req.prompt.clone()),
            name: None,
        },
    )]
}

#[async_trait::async_trait]
impl Provider for OpenAICompatProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: req.model.clone(),
            messages: build_messages(req),
            ..Default::default()
        };

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let finish_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason)
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default();

        let (input_tokens, output_tokens) = match &response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => (0, 0),
        };

        Ok(GenerateResponse {
            content,
            model: response.model,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}
