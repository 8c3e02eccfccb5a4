//! 聊天补全后端 - 基础设施层
//!
//! 只暴露"发一次 chat completion 请求"的能力，不认识题目和文本块

use futures::future::BoxFuture;

use crate::error::LlmError;

/// 一次聊天补全请求
///
/// 对应 OpenAI 兼容接口的 `{model, messages[system, user], temperature, max_tokens}`
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system_message: String,
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 聊天补全后端
///
/// 职责：
/// - 把一次请求发给某个模型，返回响应文本（已去除首尾空白）
/// - 不重试、不切换模型
/// - 不解析响应内容
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<String, LlmError>>;
}

impl<T: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<T> {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        (**self).complete(request)
    }
}

impl<T: ChatBackend + ?Sized> ChatBackend for Box<T> {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        (**self).complete(request)
    }
}
