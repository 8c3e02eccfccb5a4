/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::workflow::ChunkCtx;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n出题日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    writeln!(file, "{}", line).map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - PDF 出题模式");
    info!("📄 文档: {}", config.document_path);
    info!("📝 题目数量: {}", config.num_questions);
    info!("🤖 出题模型: {}", config.generation.models.join(" → "));
    if config.with_explanations {
        info!("💡 解析模型: {}", config.generation.explanation_model());
    }
    info!("{}", "=".repeat(60));

    if config.llm_api_key.is_empty() {
        warn!("⚠️ 未设置 LLM_API_KEY，调用模型将会失败");
    }
}

/// 记录文本块开始处理
///
/// # 参数
/// - `ctx`: 文本块上下文
/// - `quota`: 本块配额
/// - `generated`: 已生成题数
/// - `target`: 目标题数
pub fn log_chunk_start(ctx: &ChunkCtx, quota: usize, generated: usize, target: usize) {
    info!("\n{}", "─".repeat(60));
    info!("{} 📝 本块请求 {} 道题 (已有 {}/{})", ctx, quota, generated, target);
}

/// 记录分块出题完成信息
pub fn log_chunks_complete(total: usize, failed: usize, generated: usize, target: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 分块出题完成: 处理 {} 块，失败 {} 块，生成 {}/{} 道题",
        total, failed, generated, target
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `requested`: 请求题数
/// - `generated`: 实际生成题数
/// - `explained`: 由模型生成的解析数
/// - `output_file`: 测验输出路径
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    requested: usize,
    generated: usize,
    explained: usize,
    output_file: &str,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 出题完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 生成: {}/{}", generated, requested);
    if generated < requested {
        info!("⚠️ 缺少: {}", requested - generated);
    }
    info!("💡 模型解析: {}", explained);
    info!("{}", "=".repeat(60));
    info!("\n测验已保存至: {}", output_file);
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        truncate_chars(text, max_len).to_string() + "..."
    } else {
        text.to_string()
    }
}

/// 取前 `max_chars` 个字符（按字符而非字节）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
