//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责出题会话的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 加载文档、写出测验 JSON
//! - 输出全局统计信息
//!
//! ### `pipeline` - 出题管线
//! - 校验题目数量
//! - 短文本直接出题，长文本交给组装器
//! - 空文档、零产出转成错误
//! - 为题目生成解析
//!
//! ### `quiz_assembler` - 测验组装器
//! - 按顺序遍历文本块，查询每块配额
//! - 拼接题目，凑够即停
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一篇文档)
//!     ↓
//! pipeline (直接 / 分块)
//!     ↓
//! quiz_assembler (处理 Iterator<TextChunk>)
//!     ↓
//! workflow::ChunkFlow (处理单个 TextChunk)
//!     ↓
//! services (能力层：出题 / 解析 / 评分)
//!     ↓
//! infrastructure (基础设施：ChatBackend)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管 IO，pipeline 管策略，quiz_assembler 管遍历
//! 2. **资源隔离**：只有编排层创建模型后端
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod app;
pub mod pipeline;
pub mod quiz_assembler;

// 重新导出主要类型
pub use app::{App, QuizReport};
pub use pipeline::QuizPipeline;
pub use quiz_assembler::QuizAssembler;
