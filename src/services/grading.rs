//! 评分服务 - 业务能力层
//!
//! 给一次作答打分，并汇总一个测验的所有作答分数。只做计算，不做存储。

use std::collections::HashSet;

use tracing::debug;

use crate::error::{AppResult, BusinessError};
use crate::models::attempt::{AnswerResult, AttemptResult, QuizAnalytics, SubmittedAnswer};
use crate::models::question::GeneratedQuestion;

/// 及格线：得分不低于总题数的 60%
pub const PASSING_THRESHOLD: f64 = 0.6;

/// 为一次作答评分
///
/// `answers` 中的 `question_id` 是 1-based 题号，同一题重复作答时只计第一次。
/// 总分母是测验的全部题数，而不是作答的题数。
pub fn grade_attempt(
    questions: &[GeneratedQuestion],
    answers: &[SubmittedAnswer],
) -> AppResult<AttemptResult> {
    if answers.is_empty() {
        return Err(BusinessError::EmptyAnswers.into());
    }

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(answers.len());

    for answer in answers {
        let question = answer
            .question_id
            .checked_sub(1)
            .and_then(|i| questions.get(i))
            .ok_or(BusinessError::UnknownQuestion {
                question_id: answer.question_id,
            })?;

        let selected = question
            .options()
            .get(answer.option_index)
            .ok_or(BusinessError::UnknownOption {
                question_id: answer.question_id,
                option_index: answer.option_index,
            })?;

        if !seen.insert(answer.question_id) {
            debug!("题目 {} 重复作答，忽略", answer.question_id);
            continue;
        }

        results.push(AnswerResult {
            question_id: answer.question_id,
            question_text: question.text.clone(),
            selected_option: selected.text.clone(),
            correct_option: question.correct_option().text.clone(),
            is_correct: selected.is_correct,
        });
    }

    let score = results.iter().filter(|r| r.is_correct).count();
    let total_questions = questions.len();
    let percentage = if total_questions == 0 {
        0.0
    } else {
        round_to(score as f64 / total_questions as f64 * 100.0, 2)
    };

    Ok(AttemptResult {
        score,
        total_questions,
        percentage,
        results,
    })
}

impl QuizAnalytics {
    /// 汇总一个测验所有作答的分数
    pub fn from_scores(total_questions: usize, scores: &[usize]) -> Self {
        if scores.is_empty() {
            return Self {
                total_questions,
                total_attempts: 0,
                average_score: 0.0,
                average_percentage: 0.0,
                pass_rate: 0.0,
                highest_score: 0,
                lowest_score: 0,
            };
        }

        let attempts = scores.len() as f64;
        let average_score = scores.iter().sum::<usize>() as f64 / attempts;
        let average_percentage = if total_questions == 0 {
            0.0
        } else {
            average_score / total_questions as f64 * 100.0
        };

        let passing_score = total_questions as f64 * PASSING_THRESHOLD;
        let passed = scores
            .iter()
            .filter(|&&s| s as f64 >= passing_score)
            .count();

        Self {
            total_questions,
            total_attempts: scores.len(),
            average_score: round_to(average_score, 1),
            average_percentage: round_to(average_percentage, 1),
            pass_rate: round_to(passed as f64 / attempts * 100.0, 1),
            highest_score: scores.iter().copied().max().unwrap_or(0),
            lowest_score: scores.iter().copied().min().unwrap_or(0),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::question::OptionKey;

    fn quiz() -> Vec<GeneratedQuestion> {
        let opts = || ["w".to_string(), "x".to_string(), "y".to_string(), "z".to_string()];
        vec![
            GeneratedQuestion::new("Q1", opts(), OptionKey::A),
            GeneratedQuestion::new("Q2", opts(), OptionKey::C),
            GeneratedQuestion::new("Q3", opts(), OptionKey::D),
        ]
    }

    fn answer(question_id: usize, option_index: usize) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            option_index,
        }
    }

    #[test]
    fn test_grade_attempt() {
        let result = grade_attempt(&quiz(), &[answer(1, 0), answer(2, 1)]).unwrap();

        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.percentage, 33.33);
        assert!(result.results[0].is_correct);
        assert_eq!(result.results[1].selected_option, "x");
        assert_eq!(result.results[1].correct_option, "y");
    }

    #[test]
    fn test_duplicate_answer_counts_once() {
        let result = grade_attempt(&quiz(), &[answer(1, 0), answer(1, 0)]).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_grade_rejects_unknown_ids() {
        let err = grade_attempt(&quiz(), &[answer(4, 0)]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(BusinessError::UnknownQuestion { question_id: 4 })
        ));

        let err = grade_attempt(&quiz(), &[answer(0, 0)]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(BusinessError::UnknownQuestion { .. })
        ));

        let err = grade_attempt(&quiz(), &[answer(2, 4)]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(BusinessError::UnknownOption { .. })
        ));

        let err = grade_attempt(&quiz(), &[]).unwrap_err();
        assert!(matches!(err, AppError::Business(BusinessError::EmptyAnswers)));
    }

    #[test]
    fn test_analytics() {
        let analytics = QuizAnalytics::from_scores(10, &[6, 8, 3, 10]);

        assert_eq!(analytics.total_attempts, 4);
        assert_eq!(analytics.average_score, 6.8);
        assert_eq!(analytics.average_percentage, 67.5);
        assert_eq!(analytics.pass_rate, 75.0);
        assert_eq!(analytics.highest_score, 10);
        assert_eq!(analytics.lowest_score, 3);
    }

    #[test]
    fn test_analytics_without_attempts() {
        let analytics = QuizAnalytics::from_scores(5, &[]);
        assert_eq!(analytics.total_attempts, 0);
        assert_eq!(analytics.average_score, 0.0);
        assert_eq!(analytics.highest_score, 0);
    }
}
