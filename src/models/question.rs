use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 选项标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::A => "a",
            OptionKey::B => "b",
            OptionKey::C => "c",
            OptionKey::D => "d",
        }
    }

    /// 0-based 位置
    pub fn index(&self) -> usize {
        match self {
            OptionKey::A => 0,
            OptionKey::B => 1,
            OptionKey::C => 2,
            OptionKey::D => 3,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = String;

    /// 忽略大小写和首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(OptionKey::A),
            "b" => Ok(OptionKey::B),
            "c" => Ok(OptionKey::C),
            "d" => Ok(OptionKey::D),
            other => Err(format!("无效的选项标签: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub key: OptionKey,
    pub text: String,
    pub is_correct: bool,
}

/// 生成的单选题
///
/// 固定 4 个选项（a–d），只能由 [`GeneratedQuestion::new`] 或
/// `TryFrom<RawQuestion>` 构造，因此恰好有一个选项 `is_correct`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuestion {
    pub text: String,
    options: [AnswerOption; 4],
}

impl GeneratedQuestion {
    /// 按 a–d 顺序的四个选项文本和正确选项构造题目
    pub fn new(text: impl Into<String>, option_texts: [String; 4], answer: OptionKey) -> Self {
        let [a, b, c, d] = option_texts;
        let make = |key: OptionKey, text: String| AnswerOption {
            key,
            text,
            is_correct: key == answer,
        };
        Self {
            text: text.into(),
            options: [
                make(OptionKey::A, a),
                make(OptionKey::B, b),
                make(OptionKey::C, c),
                make(OptionKey::D, d),
            ],
        }
    }

    pub fn options(&self) -> &[AnswerOption; 4] {
        &self.options
    }

    pub fn correct_option(&self) -> &AnswerOption {
        // new() 保证恰好有一个正确选项
        self.options
            .iter()
            .find(|o| o.is_correct)
            .unwrap_or(&self.options[0])
    }

    pub fn answer(&self) -> OptionKey {
        self.correct_option().key
    }
}

/// 模型返回的题目原始结构
///
/// `{question, options: {a, b, c, d}, answer}`
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub answer: String,
}

impl TryFrom<RawQuestion> for GeneratedQuestion {
    type Error = String;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let text = raw.question.trim();
        if text.is_empty() {
            return Err("题干为空".to_string());
        }

        let mut slots: [Option<String>; 4] = Default::default();
        for (key, value) in raw.options {
            let key: OptionKey = key.parse()?;
            let value = value.trim();
            if value.is_empty() {
                return Err(format!("选项 {} 内容为空", key));
            }
            if slots[key.index()].replace(value.to_string()).is_some() {
                return Err(format!("选项 {} 重复", key));
            }
        }

        let [a, b, c, d] = slots;
        let option_texts = match (a, b, c, d) {
            (Some(a), Some(b), Some(c), Some(d)) => [a, b, c, d],
            _ => return Err("选项必须恰好包含 a、b、c、d 四项".to_string()),
        };

        let answer: OptionKey = raw.answer.parse()?;
        Ok(GeneratedQuestion::new(text, option_texts, answer))
    }
}

/// 测验是直接整篇出题还是分块出题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Direct,
    Chunked,
}

/// 一次出题请求的结果
///
/// 组装完成后不再修改；`questions.len() <= requested`。
#[derive(Debug, Clone, Serialize)]
pub struct QuizBatch {
    pub requested: usize,
    pub mode: GenerationMode,
    pub questions: Vec<GeneratedQuestion>,
    /// 参与出题的文本块数量
    pub chunks_total: usize,
    /// 没有产出任何题目的文本块数量
    pub chunks_failed: usize,
}

impl QuizBatch {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 实际生成数是否少于请求数
    pub fn is_short(&self) -> bool {
        self.questions.len() < self.requested
    }
}
