use serde::{Deserialize, Serialize};

/// 从 PDF 中提取出的原文
///
/// 创建后不再修改，`id` 由外部（持久层）分配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
        }
    }

    /// 按字符计的长度
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
