//! OpenAI 兼容接口的聊天后端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点（默认 Groq 的 OpenAI 兼容端点）
//! - 超时沿用 HTTP 客户端的默认值

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::infrastructure::chat_backend::{ChatBackend, ChatRequest};

/// OpenAI 兼容聊天后端
///
/// 唯一持有 HTTP 客户端的类型，生命周期跟随一次出题会话。
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
}

impl OpenAiChat {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let model = request.model.as_str();
        debug!("调用 LLM API，模型: {}", model);
        debug!(
            "用户消息长度: {} 字符, max_tokens: {}",
            request.user_message.len(),
            request.max_tokens
        );

        let build_failed = |e: async_openai::error::OpenAIError| LlmError::RequestBuildFailed {
            model: model.to_string(),
            source: Box::new(e),
        };

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_message.as_str())
            .build()
            .map_err(build_failed)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message.as_str())
            .build()
            .map_err(build_failed)?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败 (模型: {}): {}", model, e);
            LlmError::api_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: model.to_string(),
            })?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: model.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl ChatBackend for OpenAiChat {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(self.send(request))
    }
}
