//! 按脚本应答的聊天后端
//!
//! 不访问网络，按顺序返回预先设定的响应，或由闭包根据请求生成响应。
//! 用于离线演练和测试，同时记录收到的每个请求。

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::error::LlmError;
use crate::infrastructure::chat_backend::{ChatBackend, ChatRequest};

/// 一次脚本化应答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// 返回这段文本
    Text(String),
    /// 模拟传输层失败
    Fail(String),
}

impl ScriptedReply {
    pub fn text(content: impl Into<String>) -> Self {
        ScriptedReply::Text(content.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

type Responder = Box<dyn Fn(&ChatRequest) -> ScriptedReply + Send + Sync>;

pub struct ScriptedBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    responder: Option<Responder>,
    default_reply: ScriptedReply,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    /// 依次返回 `replies`，用完后返回失败
    pub fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            responder: None,
            default_reply: ScriptedReply::fail("脚本响应已用完"),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一个响应
    pub fn always(reply: ScriptedReply) -> Self {
        Self {
            default_reply: reply,
            ..Self::with_replies(Vec::new())
        }
    }

    /// 由闭包根据请求决定响应
    pub fn from_fn(responder: impl Fn(&ChatRequest) -> ScriptedReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::with_replies(Vec::new())
        }
    }

    /// 已收到的请求（按顺序）
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn next_reply(&self, request: &ChatRequest) -> ScriptedReply {
        if let Some(responder) = &self.responder {
            return responder(request);
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl ChatBackend for ScriptedBackend {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        let reply = self.next_reply(request);

        Box::pin(async move {
            match reply {
                ScriptedReply::Text(content) => Ok(content.trim().to_string()),
                ScriptedReply::Fail(message) => Err(LlmError::api_failed(
                    request.model.as_str(),
                    std::io::Error::new(std::io::ErrorKind::Other, message),
                )),
            }
        })
    }
}
