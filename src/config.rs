use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待出题的文档路径（PDF 或纯文本）
    pub document_path: String,
    /// 请求生成的题目数量
    pub num_questions: usize,
    /// 是否为生成的题目请求解析
    pub with_explanations: bool,
    /// 测验结果输出文件（JSON）
    pub output_file: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    // --- 出题参数 ---
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_path: "document.pdf".to_string(),
            num_questions: 5,
            with_explanations: false,
            output_file: "quiz.json".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

/// 出题流程的全部可调参数
///
/// 默认值都是经验值，没有硬性约束，只有 `validate` 里检查的几条必须成立。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// 每个文本块的字符数
    pub chunk_size: usize,
    /// 相邻文本块重叠的字符数
    pub chunk_overlap: usize,
    /// 去掉首尾空白后少于该字符数的文本块会被丢弃
    pub min_chunk_chars: usize,
    /// 题目数不超过该值且文本足够短时，不分块直接出题
    pub direct_max_questions: usize,
    pub direct_max_chars: usize,
    /// 每块配额分档
    pub tiers: QuotaTiers,
    /// 出题请求的 token 预算：base + per_question × count，封顶 cap
    pub base_tokens: u32,
    pub tokens_per_question: u32,
    pub max_tokens_cap: u32,
    pub question_temperature: f32,
    /// 按顺序尝试的出题模型
    pub models: Vec<String>,
    /// 解析模型，未设置时使用第一个出题模型
    pub explanation_model: Option<String>,
    pub explanation_temperature: f32,
    pub explanation_max_tokens: u32,
    /// 解析请求中附带的原文上下文上限（字符）
    pub explanation_context_chars: usize,
    /// 单次请求允许的最大题目数
    pub max_questions_per_request: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2500,
            chunk_overlap: 200,
            min_chunk_chars: 100,
            direct_max_questions: 5,
            direct_max_chars: 3000,
            tiers: QuotaTiers::default(),
            base_tokens: 200,
            tokens_per_question: 100,
            max_tokens_cap: 2000,
            question_temperature: 0.7,
            models: vec![
                "llama-3.1-8b-instant".to_string(),
                "gemma2-9b-it".to_string(),
                "llama-3.1-70b-versatile".to_string(),
                "llama3-8b-8192".to_string(),
            ],
            explanation_model: None,
            explanation_temperature: 0.3,
            explanation_max_tokens: 1500,
            explanation_context_chars: 3000,
            max_questions_per_request: 200,
        }
    }
}

impl GenerationConfig {
    /// 实际使用的解析模型
    pub fn explanation_model(&self) -> &str {
        self.explanation_model
            .as_deref()
            .or_else(|| self.models.first().map(String::as_str))
            .unwrap_or_default()
    }

    /// 检查参数之间的约束
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::invalid_config("chunk_size", "必须大于 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::invalid_config(
                "chunk_overlap",
                format!(
                    "重叠 {} 必须小于块大小 {}",
                    self.chunk_overlap, self.chunk_size
                ),
            ));
        }
        if self.models.is_empty() {
            return Err(AppError::invalid_config("models", "至少需要一个模型"));
        }
        if self.max_questions_per_request == 0 {
            return Err(AppError::invalid_config(
                "max_questions_per_request",
                "必须大于 0",
            ));
        }
        Ok(())
    }
}

/// 每块配额分档
///
/// `Q <= small_max` 时每块 `min(small_quota, Q)`，`Q <= medium_max` 时每块
/// `medium_quota`，更大时每块 `large_quota`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuotaTiers {
    pub small_max: usize,
    pub small_quota: usize,
    pub medium_max: usize,
    pub medium_quota: usize,
    pub large_quota: usize,
}

impl Default for QuotaTiers {
    fn default() -> Self {
        Self {
            small_max: 20,
            small_quota: 10,
            medium_max: 50,
            medium_quota: 15,
            large_quota: 20,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 若设置了 `QUIZ_CONFIG_FILE`，先读取该 TOML 文件作为基础，再用环境变量覆盖。
    pub fn from_env() -> AppResult<Self> {
        let mut config = match std::env::var("QUIZ_CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.generation.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(&display, e))?;
        Self::from_toml_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: display,
                source: Box::new(e),
            })
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 按变量名返回取值，便于测试时注入。
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(v) = lookup("DOCUMENT_PATH") {
            self.document_path = v;
        }
        if let Some(v) = lookup("NUM_QUESTIONS") {
            self.num_questions = parse_env("NUM_QUESTIONS", &v, "usize")?;
        }
        if let Some(v) = lookup("WITH_EXPLANATIONS") {
            self.with_explanations = parse_env("WITH_EXPLANATIONS", &v, "bool")?;
        }
        if let Some(v) = lookup("OUTPUT_FILE") {
            self.output_file = v;
        }
        if let Some(v) = lookup("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_env("VERBOSE_LOGGING", &v, "bool")?;
        }
        if let Some(v) = lookup("LLM_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODELS") {
            self.generation.models = v
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("LLM_EXPLANATION_MODEL") {
            let model = v.trim();
            self.generation.explanation_model =
                (!model.is_empty()).then(|| model.to_string());
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(var_name: &str, value: &str, expected_type: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AppError::Config(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_generation_constants() {
        let config = GenerationConfig::default();
        assert_eq!(config.chunk_size, 2500);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.min_chunk_chars, 100);
        assert_eq!(config.models.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[
                ("NUM_QUESTIONS", "30"),
                ("GROQ_API_KEY", "gsk_test"),
                ("LLM_MODELS", "model-a, model-b,,"),
                ("WITH_EXPLANATIONS", "true"),
            ]))
            .unwrap();

        assert_eq!(config.num_questions, 30);
        assert_eq!(config.llm_api_key, "gsk_test");
        assert_eq!(config.generation.models, vec!["model-a", "model-b"]);
        assert!(config.with_explanations);
    }

    #[test]
    fn test_explanation_model_follows_question_models() {
        assert_eq!(
            GenerationConfig::default().explanation_model(),
            "llama-3.1-8b-instant"
        );

        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[("LLM_MODELS", "gpt-4o-mini,gpt-4o")]))
            .unwrap();
        assert_eq!(config.generation.explanation_model(), "gpt-4o-mini");

        config
            .apply_env(lookup_from(&[("LLM_EXPLANATION_MODEL", "gpt-4o")]))
            .unwrap();
        assert_eq!(config.generation.explanation_model(), "gpt-4o");

        let config = Config::from_toml_str(
            r#"
            [generation]
            models = ["mixtral-8x7b"]
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.explanation_model(), "mixtral-8x7b");
    }

    #[test]
    fn test_llm_api_key_takes_precedence() {
        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[
                ("LLM_API_KEY", "primary"),
                ("GROQ_API_KEY", "secondary"),
            ]))
            .unwrap();
        assert_eq!(config.llm_api_key, "primary");
    }

    #[test]
    fn test_apply_env_rejects_bad_number() {
        let mut config = Config::default();
        let err = config
            .apply_env(lookup_from(&[("NUM_QUESTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::EnvVarParseFailed { .. })
        ));
    }

    #[test]
    fn test_toml_partial_config() {
        let config = Config::from_toml_str(
            r#"
            num_questions = 12

            [generation]
            chunk_size = 1000
            chunk_overlap = 100

            [generation.tiers]
            small_quota = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.num_questions, 12);
        assert_eq!(config.generation.chunk_size, 1000);
        assert_eq!(config.generation.min_chunk_chars, 100);
        assert_eq!(config.generation.tiers.small_quota, 8);
        assert_eq!(config.generation.tiers.medium_quota, 15);
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let config = GenerationConfig {
            chunk_size: 200,
            chunk_overlap: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            models: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
