//! 出题管线 - 编排层
//!
//! 对外的出题入口：校验请求、选择直接出题或分块出题、把"什么都没生成"变成可报告的错误。

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::error::{AppResult, BusinessError};
use crate::infrastructure::ChatBackend;
use crate::models::document::SourceDocument;
use crate::models::explanation::{ExplanationItem, ExplanationRecord};
use crate::models::question::{GeneratedQuestion, GenerationMode, QuizBatch};
use crate::orchestrator::quiz_assembler::QuizAssembler;
use crate::planning::{BatchPlanner, TextChunk, TextChunker};
use crate::services::{ExplanationGenerator, QuestionGenerator};
use crate::workflow::{ChunkCtx, ChunkFlow, ChunkResult};

/// 出题管线
///
/// 一次出题会话内复用；所有参数来自构造时传入的 [`GenerationConfig`]。
pub struct QuizPipeline {
    chunker: TextChunker,
    planner: BatchPlanner,
    flow: ChunkFlow,
    explainer: ExplanationGenerator,
    max_questions: usize,
}

impl QuizPipeline {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        config: &GenerationConfig,
        verbose_logging: bool,
    ) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            chunker: TextChunker::from_config(config)?,
            planner: BatchPlanner::from_config(config),
            flow: ChunkFlow::new(
                QuestionGenerator::new(backend.clone(), config),
                verbose_logging,
            ),
            explainer: ExplanationGenerator::new(backend, config),
            max_questions: config.max_questions_per_request,
        })
    }

    /// 为文档生成 `count` 道题
    ///
    /// 生成数少于 `count` 时仍返回 `Ok`；一道都没有生成时返回错误。
    pub async fn generate(&self, document: &SourceDocument, count: usize) -> AppResult<QuizBatch> {
        if count == 0 || count > self.max_questions {
            return Err(BusinessError::InvalidQuestionCount {
                requested: count,
                max: self.max_questions,
            }
            .into());
        }

        let text_chars = document.char_len();
        info!(
            "📄 文档 {} 共 {} 个字符，请求 {} 道题",
            document.id, text_chars, count
        );

        let batch = if self.planner.should_bypass_chunking(count, text_chars) {
            self.generate_direct(document, count).await?
        } else {
            let batch = QuizAssembler::new(&self.planner, &self.flow)
                .assemble(&document.id, self.chunker.chunks(&document.text), count)
                .await;
            if batch.chunks_total == 0 {
                return Err(BusinessError::EmptyDocument {
                    document_id: document.id.clone(),
                    chars: text_chars,
                }
                .into());
            }
            batch
        };

        if batch.is_empty() {
            return Err(BusinessError::NoQuestionsGenerated { requested: count }.into());
        }
        if batch.is_short() {
            warn!(
                "⚠️ 只生成了 {}/{} 道题",
                batch.len(),
                batch.requested
            );
        } else {
            info!("✅ 成功生成 {} 道题", batch.len());
        }

        Ok(batch)
    }

    /// 整篇文本一次出题
    async fn generate_direct(&self, document: &SourceDocument, count: usize) -> AppResult<QuizBatch> {
        let text = document.text.trim();
        if text.is_empty() {
            return Err(BusinessError::EmptyDocument {
                document_id: document.id.clone(),
                chars: 0,
            }
            .into());
        }

        info!("⚡ 文本较短，直接整篇出题");

        let chunk = TextChunk {
            index: 0,
            span: 0..document.char_len(),
            text,
        };
        let ctx = ChunkCtx::new(document.id.as_str(), 1, chunk.span.clone());

        let (questions, chunks_failed) = match self.flow.run(&chunk, count, &ctx).await {
            ChunkResult::Produced(questions) => (questions, 0),
            ChunkResult::Failed => (Vec::new(), 1),
        };

        Ok(QuizBatch {
            requested: count,
            mode: GenerationMode::Direct,
            questions,
            chunks_total: 1,
            chunks_failed,
        })
    }

    /// 为题目生成解析，题目 ID 为 1-based 题号
    pub async fn explain(
        &self,
        questions: &[GeneratedQuestion],
        context: Option<&str>,
    ) -> Vec<ExplanationRecord> {
        let items: Vec<ExplanationItem> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| ExplanationItem::from_question(i as i64 + 1, q))
            .collect();
        self.explainer.explain(&items, context).await
    }
}
