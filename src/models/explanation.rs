use serde::{Deserialize, Serialize};

use crate::models::question::GeneratedQuestion;

/// 请求解析时提交给模型的一道题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationItem {
    /// 调用方分配的题目 ID，模型必须原样返回
    pub question_id: i64,
    pub question_text: String,
    pub options: Vec<ExplanationOption>,
    /// 正确选项的文本，用于兜底解析
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationOption {
    pub text: String,
    pub is_correct: bool,
}

impl ExplanationItem {
    pub fn from_question(question_id: i64, question: &GeneratedQuestion) -> Self {
        Self {
            question_id,
            question_text: question.text.clone(),
            options: question
                .options()
                .iter()
                .map(|o| ExplanationOption {
                    text: o.text.clone(),
                    is_correct: o.is_correct,
                })
                .collect(),
            correct_answer: question.correct_option().text.clone(),
        }
    }
}

/// 解析的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Model,
    /// 模型漏掉了该题
    MissingFallback,
    /// 整个请求失败
    FailureFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub question_id: i64,
    pub explanation: String,
    pub key_concepts: Vec<String>,
    pub source: ExplanationSource,
}

impl ExplanationRecord {
    /// 模型没有返回该题时的兜底解析
    pub fn missing(item: &ExplanationItem) -> Self {
        Self {
            question_id: item.question_id,
            explanation: format!(
                "The correct answer is '{}'. This is based on the content provided; see the source material for details.",
                item.correct_answer
            ),
            key_concepts: vec![
                "Review the material".to_string(),
                "Study the context".to_string(),
            ],
            source: ExplanationSource::MissingFallback,
        }
    }

    /// 请求整体失败时的兜底解析
    pub fn failed(item: &ExplanationItem) -> Self {
        Self {
            question_id: item.question_id,
            explanation: format!(
                "The correct answer is '{}'. For a detailed explanation, please review the source material.",
                item.correct_answer
            ),
            key_concepts: vec![
                "Study the content".to_string(),
                "Review definitions".to_string(),
            ],
            source: ExplanationSource::FailureFallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source != ExplanationSource::Model
    }
}

/// 模型返回的解析原始结构
#[derive(Debug, Clone, Deserialize)]
pub struct RawExplanation {
    pub question_id: i64,
    pub explanation: String,
    #[serde(default)]
    pub key_concepts: Vec<String>,
}
