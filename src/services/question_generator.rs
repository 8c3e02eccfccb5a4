//! 出题服务 - 业务能力层
//!
//! 只负责"给一段文本出 N 道单选题"，不关心分块和汇总
//!
//! ## 模型降级
//! 按配置顺序逐个尝试模型，每个模型只试一次。传输失败或响应格式不对都视为该模型
//! 失败，换下一个；全部失败时返回 [`QuestionOutcome::Exhausted`]，不返回错误。

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::error::{LlmError, ParseError};
use crate::infrastructure::{ChatBackend, ChatRequest};
use crate::models::question::{GeneratedQuestion, RawQuestion};
use crate::services::response_normalizer::parse_json_array;

const SYSTEM_MESSAGE: &str =
    "You are a quiz generator that always responds with valid JSON containing multiple choice questions.";

/// 单个模型失败的原因
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Transport(#[from] LlmError),
    #[error(transparent)]
    Malformed(#[from] ParseError),
}

#[derive(Debug)]
pub struct ModelFailure {
    pub model: String,
    pub error: AttemptError,
}

/// 一次出题调用的结果
#[derive(Debug)]
pub enum QuestionOutcome {
    /// 某个模型给出了合法结果
    Generated {
        model: String,
        questions: Vec<GeneratedQuestion>,
    },
    /// 所有模型都失败了
    Exhausted { failures: Vec<ModelFailure> },
}

impl QuestionOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, QuestionOutcome::Exhausted { .. })
    }

    /// 失败时为空列表
    pub fn into_questions(self) -> Vec<GeneratedQuestion> {
        match self {
            QuestionOutcome::Generated { questions, .. } => questions,
            QuestionOutcome::Exhausted { .. } => Vec::new(),
        }
    }
}

/// 出题服务
///
/// 职责：
/// - 为一段文本构建出题 prompt
/// - 按顺序尝试模型，校验响应结构
/// - 不出现文本块序号
/// - 不关心总题数
pub struct QuestionGenerator {
    backend: Arc<dyn ChatBackend>,
    models: Vec<String>,
    temperature: f32,
    base_tokens: u32,
    tokens_per_question: u32,
    max_tokens_cap: u32,
}

impl QuestionGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, config: &GenerationConfig) -> Self {
        Self {
            backend,
            models: config.models.clone(),
            temperature: config.question_temperature,
            base_tokens: config.base_tokens,
            tokens_per_question: config.tokens_per_question,
            max_tokens_cap: config.max_tokens_cap,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// 请求的 token 预算：`base + per_question × count`，不超过上限
    pub fn token_budget(&self, count: usize) -> u32 {
        let per_question = u64::from(self.tokens_per_question).saturating_mul(count as u64);
        let budget = u64::from(self.base_tokens).saturating_add(per_question);
        budget.min(u64::from(self.max_tokens_cap)) as u32
    }

    /// 为 `text` 生成 `count` 道题（`count` 应大于 0）
    ///
    /// 返回的题目数由模型决定，可能多于或少于 `count`，由调用方截断。
    pub async fn generate(&self, text: &str, count: usize) -> QuestionOutcome {
        let (user_message, system_message) = self.build_messages(text, count);
        let max_tokens = self.token_budget(count);
        let mut failures = Vec::with_capacity(self.models.len());

        debug!(
            "出题请求: 文本 {} 个字符, 题数 {}, max_tokens {}",
            text.chars().count(),
            count,
            max_tokens
        );

        for model in &self.models {
            info!("🤖 尝试模型 {} 生成 {} 道题", model, count);

            let request = ChatRequest {
                model: model.clone(),
                system_message: system_message.clone(),
                user_message: user_message.clone(),
                temperature: self.temperature,
                max_tokens,
            };

            match self.try_model(&request).await {
                Ok(questions) => {
                    info!("✓ 模型 {} 生成了 {} 道题", model, questions.len());
                    return QuestionOutcome::Generated {
                        model: model.clone(),
                        questions,
                    };
                }
                Err(error) => {
                    warn!("⚠️ 模型 {} 失败，尝试下一个: {}", model, error);
                    failures.push(ModelFailure {
                        model: model.clone(),
                        error,
                    });
                }
            }
        }

        warn!("❌ 所有模型都未能生成题目 (共尝试 {} 个)", failures.len());
        QuestionOutcome::Exhausted { failures }
    }

    async fn try_model(&self, request: &ChatRequest) -> Result<Vec<GeneratedQuestion>, AttemptError> {
        let response = self.backend.complete(request).await?;
        Ok(parse_questions(&response)?)
    }

    /// 构建出题消息
    ///
    /// 返回 (user_message, system_message)
    fn build_messages(&self, text: &str, count: usize) -> (String, String) {
        let user_message = format!(
            r#"Generate exactly {count} multiple choice questions from this text. For each question, provide 4 options and mark the correct answer.

Text to generate questions from:
{text}

Respond in this exact JSON format with no additional text:
[
    {{
        "question": "What is...",
        "options": {{
            "a": "First option",
            "b": "Second option",
            "c": "Third option",
            "d": "Fourth option"
        }},
        "answer": "a"
    }}
]"#
        );

        (user_message, SYSTEM_MESSAGE.to_string())
    }
}

/// 解析出题响应
///
/// 任何一道题结构不对，或列表为空，整个响应都视为格式错误。
pub fn parse_questions(response: &str) -> Result<Vec<GeneratedQuestion>, ParseError> {
    let raw: Vec<RawQuestion> = parse_json_array(response)?;
    if raw.is_empty() {
        return Err(ParseError::WrongShape {
            reason: "题目列表为空".to_string(),
        });
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, q)| {
            GeneratedQuestion::try_from(q).map_err(|reason| ParseError::WrongShape {
                reason: format!("第 {} 题: {}", i + 1, reason),
            })
        })
        .collect()
}
