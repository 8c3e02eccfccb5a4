//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、启动信息、创建模型后端
//! 2. **加载文档**：PDF / 纯文本 → `SourceDocument`
//! 3. **出题**：委托 `QuizPipeline`
//! 4. **解析**（可选）：为生成的题目补充解析
//! 5. **输出**：写出测验 JSON，打印最终统计

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ChatBackend, OpenAiChat};
use crate::models::explanation::ExplanationRecord;
use crate::models::loaders::load_source_document;
use crate::models::question::{GeneratedQuestion, GenerationMode};
use crate::orchestrator::pipeline::QuizPipeline;
use crate::utils::logging::{append_log_line, init_log_file, log_startup, print_final_stats};

/// 一次运行的输出
#[derive(Debug, Clone, Serialize)]
pub struct QuizReport {
    pub document_id: String,
    pub title: String,
    pub requested: usize,
    pub generated: usize,
    pub mode: GenerationMode,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub questions: Vec<GeneratedQuestion>,
    pub explanations: Vec<ExplanationRecord>,
}

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: QuizPipeline,
}

impl App {
    /// 初始化应用，使用 OpenAI 兼容接口
    pub fn initialize(config: Config) -> AppResult<Self> {
        let backend = Arc::new(OpenAiChat::new(&config));
        Self::with_backend(config, backend)
    }

    /// 使用指定的模型后端初始化应用
    pub fn with_backend(config: Config, backend: Arc<dyn ChatBackend>) -> AppResult<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let pipeline = QuizPipeline::new(backend, &config.generation, config.verbose_logging)?;

        Ok(Self { config, pipeline })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<QuizReport> {
        info!("\n📁 正在加载文档: {}", self.config.document_path);
        let document = load_source_document(Path::new(&self.config.document_path)).await?;
        info!(
            "✓ 文档加载完成: {} ({} 个字符)",
            document.title,
            document.char_len()
        );

        let batch = self
            .pipeline
            .generate(&document, self.config.num_questions)
            .await?;

        let explanations = if self.config.with_explanations {
            info!("\n💡 正在生成题目解析...");
            self.pipeline
                .explain(&batch.questions, Some(document.text.as_str()))
                .await
        } else {
            Vec::new()
        };

        let report = QuizReport {
            document_id: document.id,
            title: document.title,
            requested: batch.requested,
            generated: batch.len(),
            mode: batch.mode,
            chunks_total: batch.chunks_total,
            chunks_failed: batch.chunks_failed,
            questions: batch.questions,
            explanations,
        };

        self.write_report(&report).await?;

        let explained = report
            .explanations
            .iter()
            .filter(|r| !r.is_fallback())
            .count();
        append_log_line(
            &self.config.output_log_file,
            &format!(
                "文档 {}: 生成 {}/{} 道题，失败块 {}/{}，模型解析 {}",
                report.document_id,
                report.generated,
                report.requested,
                report.chunks_failed,
                report.chunks_total,
                explained
            ),
        )?;

        print_final_stats(
            report.requested,
            report.generated,
            explained,
            &self.config.output_file,
            &self.config.output_log_file,
        );

        Ok(report)
    }

    /// 写出测验 JSON
    async fn write_report(&self, report: &QuizReport) -> AppResult<()> {
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.config.output_file, json)
            .await
            .map_err(|e| AppError::file_write_failed(&self.config.output_file, e))?;
        Ok(())
    }
}
