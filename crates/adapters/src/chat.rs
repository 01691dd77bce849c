use std::time::Duration;

use log::warn;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};

use yae_core::config::{Config, LlmConfig};
use yae_core::model::{ChatModel, ChatModelError, ChatRequest};

use crate::base_url::check_base_url;
use crate::error::AdapterError;

/// Builds the gateway for a named profile from the config. Construction
/// fails before any request when the profile is unknown, malformed, or
/// (for hosted endpoints) has no resolvable API key.
pub fn create_chat_adapter(
    config: &Config,
    profile_name: &str,
) -> Result<Box<dyn ChatModel>, AdapterError> {
    let profile = config.get_llm_profile(profile_name).ok_or_else(|| {
        AdapterError::InvalidConfig(format!("unknown LLM profile `{}`", profile_name))
    })?;
    create_chat_adapter_from_profile(profile_name, profile)
}

pub fn create_chat_adapter_from_profile(
    profile_name: &str,
    profile: &LlmConfig,
) -> Result<Box<dyn ChatModel>, AdapterError> {
    let fmt = profile.interface_format.trim().to_lowercase();
    let timeout = profile.timeout.max(1);

    match fmt.as_str() {
        "openai" => Ok(Box::new(OpenAiChatAdapter::new(
            resolve_base_url(&profile.base_url, "https://api.openai.com/v1"),
            Some(require_api_key(profile_name, profile)?),
            profile.model_name.clone(),
            profile.max_tokens,
            profile.temperature,
            timeout,
        )?)),
        "deepseek" => Ok(Box::new(OpenAiChatAdapter::new(
            resolve_base_url(&profile.base_url, "https://api.deepseek.com/v1"),
            Some(require_api_key(profile_name, profile)?),
            profile.model_name.clone(),
            profile.max_tokens,
            profile.temperature,
            timeout,
        )?)),
        // local endpoint, no credential needed
        "ollama" => Ok(Box::new(OpenAiChatAdapter::new(
            resolve_base_url(&profile.base_url, "http://localhost:11434/v1"),
            profile.resolve_api_key(),
            profile.model_name.clone(),
            profile.max_tokens,
            profile.temperature,
            timeout,
        )?)),
        other => Err(AdapterError::InvalidConfig(format!(
            "unknown interface_format: {}",
            other
        ))),
    }
}

fn require_api_key(profile_name: &str, profile: &LlmConfig) -> Result<String, AdapterError> {
    profile
        .resolve_api_key()
        .ok_or_else(|| AdapterError::MissingApiKey(profile_name.to_string()))
}

fn resolve_base_url(base_url: &str, default: &str) -> String {
    let raw = if base_url.trim().is_empty() {
        default.to_string()
    } else {
        base_url.to_string()
    };
    check_base_url(&raw)
}

/// One blocking POST to `{base_url}/chat/completions` per call. No
/// retry and no streaming: a failed call surfaces immediately and the
/// operator re-triggers the action.
pub struct OpenAiChatAdapter {
    client: Client,
    url: String,
    api_key: Option<String>,
    model_name: String,
    max_tokens: Option<u32>,
    default_temperature: f32,
}

impl OpenAiChatAdapter {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model_name: String,
        max_tokens: u32,
        temperature: f32,
        timeout: u64,
    ) -> Result<Self, AdapterError> {
        if base_url.trim().is_empty() {
            return Err(AdapterError::InvalidConfig(
                "base_url must not be empty".to_string(),
            ));
        }

        if model_name.trim().is_empty() {
            return Err(AdapterError::InvalidConfig(
                "model_name must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model_name,
            max_tokens: if max_tokens == 0 {
                None
            } else {
                Some(max_tokens)
            },
            default_temperature: temperature,
        })
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model_name,
            messages: request
                .messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            max_tokens: self.max_tokens,
            temperature: request.temperature.unwrap_or(self.default_temperature),
            response_format: if request.json_mode {
                Some(ResponseFormat {
                    kind: "json_object",
                })
            } else {
                None
            },
        }
    }

    fn complete_once(&self, request: &ChatRequest) -> Result<String, AdapterError> {
        if request.messages.is_empty() {
            return Err(AdapterError::InvalidConfig(
                "messages must not be empty".to_string(),
            ));
        }

        let body = self.build_body(request);

        let mut http_request = self.client.post(&self.url).header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                http_request = http_request.bearer_auth(key);
            }
        }

        let response = http_request.json(&body).send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            warn!("chat completion returned status {status}: {body}");
            return Err(AdapterError::HttpStatus { status, body });
        }

        let parsed: ChatCompletionResponse = response.json()?;
        extract_choice_content(parsed).ok_or(AdapterError::EmptyResponse)
    }
}

impl ChatModel for OpenAiChatAdapter {
    fn complete(&self, request: &ChatRequest) -> Result<String, ChatModelError> {
        self.complete_once(request).map_err(ChatModelError::new)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_choice_content(response: ChatCompletionResponse) -> Option<String> {
    for choice in response.choices {
        if let Some(message) = choice.message {
            if let Some(content) = message.content {
                if !content.trim().is_empty() {
                    return Some(content);
                }
            }
        }
        if let Some(content) = choice.content {
            if !content.trim().is_empty() {
                return Some(content);
            }
        }
    }
    None
}
