//! # PDF Quiz Gen
//!
//! 从 PDF 文本生成单选题测验的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有模型客户端，只暴露能力
//! - `ChatBackend` - 一次对话补全的抽象
//! - `OpenAiChat` - OpenAI 兼容接口实现
//! - `ScriptedBackend` - 按脚本应答，用于测试（`mock` feature）
//!
//! ### ② 规划层（Planning）
//! - `planning/` - 纯算法，不做 IO
//! - `TextChunker` - 带重叠的定长切块
//! - `BatchPlanner` - 每块配额与是否跳过切块
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuestionGenerator` - 多模型降级出题
//! - `ExplanationGenerator` - 批量生成解析，失败时兜底
//! - `grading` - 作答评分与统计
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个文本块"的完整处理流程
//! - `ChunkCtx` - 上下文封装（document_id + 文本块序号）
//! - `ChunkFlow` - 流程编排（出题 → 截断到配额）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，加载文档、写出结果
//! - `orchestrator/pipeline` - 直接出题 / 分块出题
//! - `orchestrator/quiz_assembler` - 遍历文本块，拼接题目
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod planning;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, GenerationConfig};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChatBackend, ChatRequest, OpenAiChat};
#[cfg(any(test, feature = "mock"))]
pub use infrastructure::{ScriptedBackend, ScriptedReply};
pub use models::{ExplanationRecord, GeneratedQuestion, QuizBatch, SourceDocument};
pub use orchestrator::{App, QuizPipeline, QuizReport};
pub use planning::{BatchPlanner, TextChunk, TextChunker};
pub use workflow::{ChunkCtx, ChunkFlow, ChunkResult};
