//! OpenAI 互換エンドポイント向けのブロッキング HTTP アダプタ。
//!
//! `yae_core` のサービス層は [`ChatModel`] だけを知り、HTTP の詳細は
//! このクレートに閉じる。

mod base_url;
mod chat;
mod error;

pub use base_url::check_base_url;
pub use chat::{create_chat_adapter, create_chat_adapter_from_profile, OpenAiChatAdapter};
pub use error::AdapterError;

pub use yae_core::model::{ChatMessage, ChatModel, ChatModelError, ChatRequest, Role};
