//! 配额规划
//!
//! 决定每个文本块请求多少道题，以及什么时候不分块直接出题。

use crate::config::{GenerationConfig, QuotaTiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    tiers: QuotaTiers,
    direct_max_questions: usize,
    direct_max_chars: usize,
}

impl BatchPlanner {
    pub fn new(tiers: QuotaTiers, direct_max_questions: usize, direct_max_chars: usize) -> Self {
        Self {
            tiers,
            direct_max_questions,
            direct_max_chars,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.tiers,
            config.direct_max_questions,
            config.direct_max_chars,
        )
    }

    /// 按总题数分档得到每块配额
    ///
    /// 默认：`Q <= 20` → `min(10, Q)`；`20 < Q <= 50` → 15；`Q > 50` → 20
    pub fn per_chunk_quota(&self, total: usize) -> usize {
        let tiers = &self.tiers;
        if total <= tiers.small_max {
            tiers.small_quota.min(total)
        } else if total <= tiers.medium_max {
            tiers.medium_quota
        } else {
            tiers.large_quota
        }
    }

    /// 当前文本块的配额，不超过剩余需要的题数
    pub fn quota_for(&self, total: usize, generated_so_far: usize) -> usize {
        let remaining = total.saturating_sub(generated_so_far);
        self.per_chunk_quota(total).min(remaining)
    }

    /// 题目少且原文短时跳过分块，整篇一次出题
    pub fn should_bypass_chunking(&self, total: usize, text_chars: usize) -> bool {
        total <= self.direct_max_questions && text_chars <= self.direct_max_chars
    }
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
