//! 测验组装器 - 编排层
//!
//! ## 职责
//!
//! - 按顺序遍历文本块（`Iterator<Item = TextChunk>`）
//! - 向 `BatchPlanner` 查询每块配额
//! - 委托 `ChunkFlow` 处理单个文本块
//! - 按原顺序拼接题目，凑够目标数就停止
//!
//! 失败的文本块只计数，不中断遍历。最终题数可能少于目标数，这不是错误。

use tracing::info;

use crate::models::question::{GenerationMode, QuizBatch};
use crate::planning::{BatchPlanner, TextChunk};
use crate::utils::logging::{log_chunk_start, log_chunks_complete};
use crate::workflow::{ChunkCtx, ChunkFlow, ChunkResult};

pub struct QuizAssembler<'a> {
    planner: &'a BatchPlanner,
    flow: &'a ChunkFlow,
}

impl<'a> QuizAssembler<'a> {
    pub fn new(planner: &'a BatchPlanner, flow: &'a ChunkFlow) -> Self {
        Self { planner, flow }
    }

    /// 逐块出题，直到凑够 `target` 道或文本块用完
    pub async fn assemble<'t>(
        &self,
        document_id: &str,
        chunks: impl Iterator<Item = TextChunk<'t>>,
        target: usize,
    ) -> QuizBatch {
        let mut questions = Vec::with_capacity(target);
        let mut chunks_total = 0;
        let mut chunks_failed = 0;

        info!(
            "📦 分块出题: 目标 {} 道，每块 {} 道",
            target,
            self.planner.per_chunk_quota(target)
        );

        for chunk in chunks {
            if questions.len() >= target {
                break;
            }

            chunks_total += 1;
            let quota = self.planner.quota_for(target, questions.len());
            let ctx = ChunkCtx::new(document_id, chunk.index + 1, chunk.span.clone());
            log_chunk_start(&ctx, quota, questions.len(), target);

            match self.flow.run(&chunk, quota, &ctx).await {
                ChunkResult::Produced(mut produced) => {
                    produced.truncate(target - questions.len());
                    questions.extend(produced);
                }
                ChunkResult::Failed => chunks_failed += 1,
            }

            if questions.len() >= target {
                break;
            }
        }

        log_chunks_complete(chunks_total, chunks_failed, questions.len(), target);

        QuizBatch {
            requested: target,
            mode: GenerationMode::Chunked,
            questions,
            chunks_total,
            chunks_failed,
        }
    }
}
