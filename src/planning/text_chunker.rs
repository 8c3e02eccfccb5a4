//! 文本分块
//!
//! 把整篇原文切成相互重叠的文本块，逐块交给出题服务。
//! 所有偏移量都按字符（Unicode 标量）计算，不会切断多字节字符。

use std::iter::FusedIterator;
use std::ops::Range;

use crate::config::GenerationConfig;
use crate::error::{AppError, AppResult};

/// 一个文本块
///
/// `span` 是原始（未去空白）范围的字符偏移，`text` 是去掉首尾空白后的内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk<'a> {
    /// 在输出序列中的序号（从 0 开始，连续）
    pub index: usize,
    pub span: Range<usize>,
    pub text: &'a str,
}

impl TextChunk<'_> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// 文本分块器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
    min_chunk_chars: usize,
}

impl TextChunker {
    /// `overlap` 必须小于 `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize, min_chunk_chars: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::invalid_config("chunk_size", "必须大于 0"));
        }
        if overlap >= chunk_size {
            return Err(AppError::invalid_config(
                "chunk_overlap",
                format!("重叠 {} 必须小于块大小 {}", overlap, chunk_size),
            ));
        }
        Ok(Self {
            chunk_size,
            overlap,
            min_chunk_chars,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> AppResult<Self> {
        Self::new(
            config.chunk_size,
            config.chunk_overlap,
            config.min_chunk_chars,
        )
    }

    /// 惰性切分 `text`
    ///
    /// 第 k 个原始块从 `k * (chunk_size - overlap)` 开始，最后一块一定到达文本末尾。
    /// 去掉首尾空白后不足 `min_chunk_chars` 个字符的块会被跳过。
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            chunk_size: self.chunk_size,
            step: self.chunk_size - self.overlap,
            min_chunk_chars: self.min_chunk_chars,
            next_byte: 0,
            next_char: 0,
            emitted: 0,
            done: false,
        }
    }
}

/// [`TextChunker::chunks`] 返回的迭代器，只能遍历一次
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    chunk_size: usize,
    step: usize,
    min_chunk_chars: usize,
    next_byte: usize,
    next_char: usize,
    emitted: usize,
    done: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = TextChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let rest = &self.text[self.next_byte..];
            if rest.is_empty() {
                self.done = true;
                break;
            }

            let start_char = self.next_char;
            let (raw, char_len) = match rest.char_indices().nth(self.chunk_size) {
                Some((end, _)) => (&rest[..end], self.chunk_size),
                None => {
                    self.done = true;
                    (rest, rest.chars().count())
                }
            };

            if !self.done {
                // rest 比 chunk_size 长，所以第 step 个字符一定存在
                let step_bytes = rest
                    .char_indices()
                    .nth(self.step)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                self.next_byte += step_bytes;
                self.next_char += self.step;
            }

            let trimmed = raw.trim();
            if trimmed.chars().count() < self.min_chunk_chars {
                continue;
            }

            let chunk = TextChunk {
                index: self.emitted,
                span: start_char..start_char + char_len,
                text: trimmed,
            };
            self.emitted += 1;
            return Some(chunk);
        }
        None
    }
}

impl FusedIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// 不含空白的确定性文本，块永远不会因为去空白而变短
    fn dense_text(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    fn default_chunker() -> TextChunker {
        TextChunker::from_config(&GenerationConfig::default()).unwrap()
    }

    #[test]
    fn test_spans_cover_text_with_exact_overlap() {
        let chunker = TextChunker::new(50, 10, 1).unwrap();
        for len in [1usize, 49, 50, 51, 89, 90, 91, 137, 500, 1001] {
            let text = dense_text(len);
            let chunks: Vec<_> = chunker.chunks(&text).collect();

            assert!(!chunks.is_empty(), "len={}", len);
            assert_eq!(chunks[0].span.start, 0);
            assert_eq!(chunks.last().unwrap().span.end, len, "len={}", len);

            for pair in chunks.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(b.span.start <= a.span.end, "出现空隙 len={}", len);
                assert_eq!(a.span.end - b.span.start, 10, "len={}", len);
            }
        }
    }

    #[test]
    fn test_default_sizes() {
        let text = dense_text(10_000);
        let chunks: Vec<_> = default_chunker().chunks(&text).collect();

        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].span, 0..2500);
        assert_eq!(chunks[1].span, 2300..4800);
        assert_eq!(chunks[4].span, 9200..10_000);
        assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i));
    }

    #[test]
    fn test_short_text_single_chunk() {
        let text = format!("  {}  ", dense_text(300));
        let chunks: Vec<_> = default_chunker().chunks(&text).collect();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].span, 0..304);
        assert_eq!(chunks[0].text.len(), 300);
    }

    #[test]
    fn test_too_short_text_yields_nothing() {
        assert_eq!(default_chunker().chunks("").count(), 0);
        assert_eq!(default_chunker().chunks(&dense_text(99)).count(), 0);
        assert_eq!(default_chunker().chunks(&dense_text(100)).count(), 1);

        let padded = format!("{}{}", " ".repeat(500), dense_text(40));
        assert_eq!(default_chunker().chunks(&padded).count(), 0);
    }

    #[test]
    fn test_whitespace_chunks_are_skipped() {
        let chunker = TextChunker::new(100, 20, 30).unwrap();
        let text = format!("{}{}{}", dense_text(100), " ".repeat(300), dense_text(100));
        let chunks: Vec<_> = chunker.chunks(&text).collect();

        assert!(chunks.iter().all(|c| c.char_len() >= 30));
        assert_eq!(chunks.last().unwrap().span.end, 500);
        assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i));
    }

    #[test]
    fn test_rechunking_is_identical() {
        let text = dense_text(7_777);
        let chunker = default_chunker();
        let first: Vec<_> = chunker.chunks(&text).collect();
        let second: Vec<_> = chunker.chunks(&text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let chunker = TextChunker::new(10, 2, 1).unwrap();
        let text: String = "所有权借用生命周期".repeat(3);
        let chunks: Vec<_> = chunker.chunks(&text).collect();

        let total = text.chars().count();
        assert_eq!(chunks.last().unwrap().span.end, total);
        for chunk in &chunks {
            let expected: String = text
                .chars()
                .skip(chunk.span.start)
                .take(chunk.span.len())
                .collect();
            assert_eq!(chunk.text, expected.trim());
        }
    }

    #[test]
    fn test_fused_after_end() {
        let text = dense_text(120);
        let mut chunks = default_chunker().chunks(&text);
        assert!(chunks.next().is_some());
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_rejects_bad_overlap() {
        assert!(TextChunker::new(100, 100, 10).is_err());
        assert!(TextChunker::new(0, 0, 10).is_err());
    }
}
