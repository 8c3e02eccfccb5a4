use serde::{Deserialize, Serialize};

/// 一道题的作答
///
/// `question_id` 是题目在测验中的 1-based 序号，`option_index` 是 0-based 选项位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: usize,
    pub option_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub question_id: usize,
    pub question_text: String,
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
}

/// 一次作答的评分结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptResult {
    pub score: usize,
    pub total_questions: usize,
    /// 保留两位小数
    pub percentage: f64,
    pub results: Vec<AnswerResult>,
}

/// 单个测验的作答统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAnalytics {
    pub total_questions: usize,
    pub total_attempts: usize,
    pub average_score: f64,
    pub average_percentage: f64,
    pub pass_rate: f64,
    pub highest_score: usize,
    pub lowest_score: usize,
}
