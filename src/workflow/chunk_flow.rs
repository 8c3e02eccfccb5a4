//! 文本块处理流程 - 流程层
//!
//! 核心职责：定义"一个文本块"的完整处理流程
//!
//! 流程顺序：
//! 1. 按配额请求出题（出题服务内部负责模型降级）
//! 2. 截断到配额
//! 3. 全部模型失败 → 记为失败块，由编排层继续下一块

use tracing::{debug, info, warn};

use crate::models::question::GeneratedQuestion;
use crate::planning::TextChunk;
use crate::services::{QuestionGenerator, QuestionOutcome};
use crate::utils::logging::truncate_text;
use crate::workflow::chunk_ctx::ChunkCtx;

/// 文本块处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkResult {
    /// 生成了题目（数量不超过配额）
    Produced(Vec<GeneratedQuestion>),
    /// 没有产出任何题目
    Failed,
}

/// 文本块处理流程
///
/// - 编排单个文本块的出题
/// - 不持有 HTTP 客户端，只依赖出题服务
/// - 不关心总题数和其他文本块
pub struct ChunkFlow {
    generator: QuestionGenerator,
    verbose_logging: bool,
}

impl ChunkFlow {
    pub fn new(generator: QuestionGenerator, verbose_logging: bool) -> Self {
        Self {
            generator,
            verbose_logging,
        }
    }

    pub async fn run(&self, chunk: &TextChunk<'_>, quota: usize, ctx: &ChunkCtx) -> ChunkResult {
        if self.verbose_logging {
            debug!("{} 内容: {}", ctx, truncate_text(chunk.text, 80));
        }

        let mut questions = match self.generator.generate(chunk.text, quota).await {
            QuestionOutcome::Generated { questions, .. } => questions,
            QuestionOutcome::Exhausted { failures } => {
                warn!(
                    "{} ⚠️ 未能生成题目 ({} 个模型均失败)",
                    ctx,
                    failures.len()
                );
                return ChunkResult::Failed;
            }
        };

        if questions.len() > quota {
            debug!(
                "{} 模型返回 {} 道题，截断到配额 {}",
                ctx,
                questions.len(),
                quota
            );
            questions.truncate(quota);
        }

        info!("{} ✓ 生成 {} 道题", ctx, questions.len());
        ChunkResult::Produced(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::infrastructure::{ScriptedBackend, ScriptedReply};
    use std::sync::Arc;

    fn questions_json(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"question": "Q{i}", "options": {{"a": "1", "b": "2", "c": "3", "d": "4"}}, "answer": "a"}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    fn flow(reply: ScriptedReply) -> ChunkFlow {
        let backend = Arc::new(ScriptedBackend::always(reply));
        ChunkFlow::new(
            QuestionGenerator::new(backend, &GenerationConfig::default()),
            true,
        )
    }

    fn chunk(text: &str) -> TextChunk<'_> {
        TextChunk {
            index: 0,
            span: 0..text.chars().count(),
            text,
        }
    }

    #[tokio::test]
    async fn test_truncates_to_quota() {
        let flow = flow(ScriptedReply::text(questions_json(7)));
        let ctx = ChunkCtx::new("doc", 1, 0..10);
        let result = flow.run(&chunk("some chunk text"), 5, &ctx).await;

        match result {
            ChunkResult::Produced(questions) => {
                assert_eq!(questions.len(), 5);
                assert_eq!(questions[4].text, "Q4");
            }
            ChunkResult::Failed => panic!("应该生成题目"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_is_failed() {
        let flow = flow(ScriptedReply::fail("timeout"));
        let ctx = ChunkCtx::new("doc", 2, 10..20);
        assert_eq!(
            flow.run(&chunk("text"), 3, &ctx).await,
            ChunkResult::Failed
        );
    }

    #[test]
    fn test_ctx_display() {
        let ctx = ChunkCtx::new("notes", 3, 4600..7100);
        assert_eq!(ctx.to_string(), "[文档 ID#notes 文本块#3 字符#4600..7100]");
    }
}
