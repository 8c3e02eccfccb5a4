//! 解析服务 - 业务能力层
//!
//! 一次请求为一组题目生成解析。题目 ID 由调用方分配，模型返回的 ID 只用来对号入座：
//! 不在输入里的 ID 直接丢弃，输入里有但模型漏掉的 ID 用模板补齐，不再重新请求。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::infrastructure::{ChatBackend, ChatRequest};
use crate::models::explanation::{
    ExplanationItem, ExplanationRecord, ExplanationSource, RawExplanation,
};
use crate::services::response_normalizer::parse_json_array;
use crate::utils::logging::truncate_chars;

const SYSTEM_MESSAGE: &str =
    "You are an educational assistant. Always respond with valid JSON format.";

const MAX_KEY_CONCEPTS: usize = 3;

/// 解析服务
///
/// 职责：
/// - 把一组题目合并成一次请求
/// - 保证输出 ID 集合与输入完全一致
/// - 请求失败时整体退回模板解析
pub struct ExplanationGenerator {
    backend: Arc<dyn ChatBackend>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    context_chars: usize,
}

impl ExplanationGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, config: &GenerationConfig) -> Self {
        Self {
            backend,
            model: config.explanation_model().to_string(),
            temperature: config.explanation_temperature,
            max_tokens: config.explanation_max_tokens,
            context_chars: config.explanation_context_chars,
        }
    }

    /// 为 `items` 生成解析，输出顺序与输入一致
    ///
    /// `context` 为原文，超过上限时只取开头部分。
    pub async fn explain(
        &self,
        items: &[ExplanationItem],
        context: Option<&str>,
    ) -> Vec<ExplanationRecord> {
        if items.is_empty() {
            return Vec::new();
        }

        info!("📝 为 {} 道题生成解析，模型: {}", items.len(), self.model);

        let context = context
            .map(|c| truncate_chars(c, self.context_chars))
            .filter(|c| !c.trim().is_empty());
        if let Some(c) = context {
            debug!("解析上下文 {} 个字符", c.chars().count());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            system_message: SYSTEM_MESSAGE.to_string(),
            user_message: build_prompt(items, context),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = match self.backend.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ 解析请求失败，全部使用模板解析: {}", e);
                return items.iter().map(ExplanationRecord::failed).collect();
            }
        };

        let raw: Vec<JsonValue> = match parse_json_array(&response) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("⚠️ 解析响应无法解析，全部使用模板解析: {}", e);
                return items.iter().map(ExplanationRecord::failed).collect();
            }
        };

        reconcile(items, raw)
    }
}

/// 按输入 ID 对齐模型返回的解析
///
/// 数组中结构不对的元素单独丢弃，对应题目按"漏掉"处理。
fn reconcile(items: &[ExplanationItem], raw: Vec<JsonValue>) -> Vec<ExplanationRecord> {
    let wanted: HashSet<i64> = items.iter().map(|i| i.question_id).collect();
    let mut by_id: HashMap<i64, RawExplanation> = HashMap::with_capacity(items.len());

    for (i, value) in raw.into_iter().enumerate() {
        let explanation: RawExplanation = match serde_json::from_value(value) {
            Ok(explanation) => explanation,
            Err(e) => {
                warn!("第 {} 条解析结构不对，已忽略: {}", i + 1, e);
                continue;
            }
        };
        if !wanted.contains(&explanation.question_id) {
            warn!("模型返回了未知的题目 ID {}，已忽略", explanation.question_id);
            continue;
        }
        by_id.entry(explanation.question_id).or_insert(explanation);
    }

    let mut missing = 0;
    let records: Vec<ExplanationRecord> = items
        .iter()
        .map(|item| match by_id.remove(&item.question_id) {
            Some(raw) => ExplanationRecord {
                question_id: item.question_id,
                explanation: raw.explanation.trim().to_string(),
                key_concepts: raw
                    .key_concepts
                    .into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .take(MAX_KEY_CONCEPTS)
                    .collect(),
                source: ExplanationSource::Model,
            },
            None => {
                missing += 1;
                ExplanationRecord::missing(item)
            }
        })
        .collect();

    if missing > 0 {
        warn!("⚠️ 模型漏掉了 {} 道题的解析，已用模板补齐", missing);
    }
    records
}

fn build_prompt(items: &[ExplanationItem], context: Option<&str>) -> String {
    let context_section = context
        .map(|c| format!("\n\nOriginal PDF Content (for context):\n{}", c))
        .unwrap_or_default();

    let mut questions_text = String::new();
    for item in items {
        questions_text.push_str(&format!(
            "\nQuestion ID {}: {}\n",
            item.question_id, item.question_text
        ));
        for (i, option) in item.options.iter().enumerate() {
            let label = char::from(b'a' + (i % 26) as u8);
            let status = if option.is_correct {
                " ✓ CORRECT ANSWER"
            } else {
                ""
            };
            questions_text.push_str(&format!("   {}) {}{}\n", label, option.text, status));
        }
    }

    let example_id = items[0].question_id;

    format!(
        r#"You are an educational AI assistant. Provide clear, helpful explanations for the following quiz questions and their correct answers.

IMPORTANT: Use the exact Question IDs provided. Do not change or renumber them.

For each question, explain:
1. Why the correct answer is right
2. Why the other options are wrong (briefly)
3. Key concepts or facts that help understand the answer

Make explanations educational and easy to understand.{context_section}

Questions to explain:{questions_text}

Return your response as a JSON array where each explanation object has:
- "question_id": the EXACT question ID from above (as integer)
- "explanation": detailed explanation text
- "key_concepts": array of 2-3 key concepts related to this question

You MUST use the exact question IDs provided above. Example format:
[
  {{
    "question_id": {example_id},
    "explanation": "The correct answer is X because...",
    "key_concepts": ["concept1", "concept2"]
  }}
]

Respond with ONLY the JSON array, no additional text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{ScriptedBackend, ScriptedReply};
    use crate::models::explanation::ExplanationOption;

    fn item(id: i64) -> ExplanationItem {
        ExplanationItem {
            question_id: id,
            question_text: format!("Question {}?", id),
            options: vec![
                ExplanationOption {
                    text: "right".to_string(),
                    is_correct: true,
                },
                ExplanationOption {
                    text: "wrong".to_string(),
                    is_correct: false,
                },
            ],
            correct_answer: "right".to_string(),
        }
    }

    fn explainer(backend: Arc<ScriptedBackend>) -> ExplanationGenerator {
        ExplanationGenerator::new(backend, &GenerationConfig::default())
    }

    #[tokio::test]
    async fn test_missing_ids_are_filled() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text(
            r#"```json
            [
              {"question_id": 10, "explanation": "Because ten.", "key_concepts": ["a", "b"]},
              {"question_id": 12, "explanation": "Because twelve.", "key_concepts": ["c"]}
            ]
            ```"#,
        )));
        let items = vec![item(10), item(11), item(12)];
        let records = explainer(backend.clone()).explain(&items, None).await;

        let ids: Vec<i64> = records.iter().map(|r| r.question_id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(records[0].source, ExplanationSource::Model);
        assert_eq!(records[0].explanation, "Because ten.");
        assert_eq!(records[1].source, ExplanationSource::MissingFallback);
        assert!(records[1].explanation.contains("source material"));
        assert!(records[1].explanation.contains("'right'"));
        assert_eq!(records[2].key_concepts, vec!["c"]);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_duplicate_ids_ignored() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text(
            r#"[
              {"question_id": 99, "explanation": "invented", "key_concepts": []},
              {"question_id": 1, "explanation": "first", "key_concepts": ["k1", "k2", "k3", "k4"]},
              {"question_id": 1, "explanation": "second", "key_concepts": []}
            ]"#,
        )));
        let records = explainer(backend).explain(&[item(1)], None).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].explanation, "first");
        assert_eq!(records[0].key_concepts.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_entry_only_affects_its_question() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text(
            r#"[
              {"question_id": 10, "explanation": "Because ten.", "key_concepts": ["a"]},
              {"question_id": 11, "explanation": "Because eleven.", "key_concepts": null},
              {"question_id": "12x", "explanation": "bad id"},
              {"question_id": 12, "explanation": "Because twelve."}
            ]"#,
        )));
        let items = vec![item(10), item(11), item(12)];
        let records = explainer(backend).explain(&items, None).await;

        let sources: Vec<(i64, ExplanationSource)> =
            records.iter().map(|r| (r.question_id, r.source)).collect();
        assert_eq!(
            sources,
            vec![
                (10, ExplanationSource::Model),
                (11, ExplanationSource::MissingFallback),
                (12, ExplanationSource::Model),
            ]
        );
        assert_eq!(records[2].explanation, "Because twelve.");
        assert!(records[2].key_concepts.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_for_all() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::fail("401")));
        let records = explainer(backend).explain(&[item(1), item(2)], None).await;

        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.source == ExplanationSource::FailureFallback));
        assert!(records[0].explanation.contains("review the source material"));
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back_for_all() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text(
            "Here are the explanations you asked for.",
        )));
        let records = explainer(backend).explain(&[item(5)], None).await;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_fallback());
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("[]")));
        let records = explainer(backend.clone()).explain(&[], Some("ctx")).await;
        assert!(records.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_carries_ids_and_truncated_context() {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("[]")));
        let context = format!("{}{}", "x".repeat(3000), "TAIL_MARKER");
        explainer(backend.clone())
            .explain(&[item(42)], Some(&context))
            .await;

        let calls = backend.calls();
        let prompt = &calls[0].user_message;
        assert!(prompt.contains("Question ID 42: Question 42?"));
        assert!(prompt.contains("a) right ✓ CORRECT ANSWER"));
        assert!(prompt.contains("\"question_id\": 42"));
        assert!(!prompt.contains("TAIL_MARKER"));
        assert_eq!(calls[0].max_tokens, 1500);
        assert_eq!(calls[0].model, "llama-3.1-8b-instant");
    }
}
