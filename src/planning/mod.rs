//! 规划层（Planning）
//!
//! 纯算法，不做 IO：把原文切成文本块、给每个文本块分配题目配额。

pub mod batch_planner;
pub mod text_chunker;

pub use batch_planner::BatchPlanner;
pub use text_chunker::{Chunks, TextChunk, TextChunker};
