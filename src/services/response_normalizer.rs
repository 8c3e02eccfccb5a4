//! 模型响应规范化
//!
//! 约定：先去掉已知的 markdown 代码块标记（```json、```），再按 JSON 数组解析。
//! 任何不符合约定的输入都返回 [`ParseError`]，不会 panic。

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::ParseError;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("代码块正则必须合法"))
}

/// 去掉代码块标记和首尾空白
pub fn strip_code_fences(raw: &str) -> String {
    fence_regex().replace_all(raw, "").trim().to_string()
}

/// 把响应解析为 `Vec<T>`
///
/// - 去掉标记后为空 → `EmptyContent`
/// - 不是合法 JSON → `InvalidJson`
/// - 顶层不是数组，或元素结构不对 → `WrongShape`
pub fn parse_json_array<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, ParseError> {
    let content = strip_code_fences(raw);
    if content.is_empty() {
        return Err(ParseError::EmptyContent);
    }

    let value: JsonValue =
        serde_json::from_str(&content).map_err(|source| ParseError::InvalidJson { source })?;

    if !value.is_array() {
        return Err(ParseError::WrongShape {
            reason: format!("顶层应为数组，实际为 {}", json_kind(&value)),
        });
    }

    serde_json::from_value(value).map_err(|e| ParseError::WrongShape {
        reason: e.to_string(),
    })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "布尔值",
        JsonValue::Number(_) => "数字",
        JsonValue::String(_) => "字符串",
        JsonValue::Array(_) => "数组",
        JsonValue::Object(_) => "对象",
    }
}
