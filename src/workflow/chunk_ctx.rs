//! 文本块处理上下文
//!
//! 封装"我正在处理哪篇文档的第几个文本块"这一信息

use std::fmt::Display;
use std::ops::Range;

/// 文本块处理上下文
#[derive(Debug, Clone)]
pub struct ChunkCtx {
    /// 文档ID
    pub document_id: String,

    /// 文本块序号（从1开始，仅用于日志显示）
    pub chunk_number: usize,

    /// 文本块在原文中的字符范围
    pub span: Range<usize>,
}

impl ChunkCtx {
    pub fn new(document_id: impl Into<String>, chunk_number: usize, span: Range<usize>) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_number,
            span,
        }
    }
}

impl Display for ChunkCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 ID#{} 文本块#{} 字符#{}..{}]",
            self.document_id, self.chunk_number, self.span.start, self.span.end
        )
    }
}
