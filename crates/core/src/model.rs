use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Opaque transport error at the model seam. The stage services only
/// need to surface the message; the concrete HTTP error type stays in
/// the adapter crate.
pub struct ChatModelError(Box<dyn StdError + Send + Sync + 'static>);

impl ChatModelError {
    pub fn new<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Box::new(source))
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }

    pub fn as_inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for ChatModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ChatModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for ChatModelError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One completion call. `temperature: None` leaves the choice to the
/// configured profile default; `json_mode` asks the endpoint for a JSON
/// object response.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            json_mode: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// The single seam between the stage services and whatever talks to the
/// model. Production uses the HTTP adapter; tests plug in scripted
/// stand-ins.
pub trait ChatModel: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, ChatModelError>;
}

/// Strips a surrounding markdown code fence (with an optional language
/// tag) from a model reply and trims whitespace. Replies without a fence
/// pass through trimmed.
pub fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let without_open = match trimmed.find('\n') {
        Some(index) => &trimmed[index + 1..],
        None => return String::new(),
    };

    let without_close = without_open
        .strip_suffix("```")
        .unwrap_or(without_open);

    without_close.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn plain_text_passes_through_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn json_fence_is_removed() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn bare_fence_is_removed() {
        let fenced = "```\n本文です\n```";
        assert_eq!(strip_code_fences(fenced), "本文です");
    }

    #[test]
    fn fence_without_newline_is_empty() {
        assert_eq!(strip_code_fences("```"), "");
    }

    #[test]
    fn request_builders_set_fields() {
        let request = ChatRequest::new(vec![ChatMessage::user("質問")])
            .with_temperature(0.3)
            .with_json_mode(true);
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.json_mode);
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn model_error_preserves_message() {
        let error = ChatModelError::new(io::Error::other("接続エラー"));
        assert_eq!(error.to_string(), "接続エラー");
        assert!(error.as_inner().is::<io::Error>());
    }
}
