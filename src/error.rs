use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 模型响应解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败 (模型: {model}): {source}")]
    RequestBuildFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 模型响应解析错误
///
/// 由 `response_normalizer` 产生，调用方把它当作"这个模型没给出可用结果"。
#[derive(Debug, Error)]
pub enum ParseError {
    /// 去掉代码块标记后内容为空
    #[error("响应内容为空")]
    EmptyContent,
    /// 不是合法 JSON
    #[error("JSON解析失败: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    /// JSON 合法但结构不符合约定
    #[error("响应结构不符合约定: {reason}")]
    WrongShape { reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// PDF 文本提取失败
    #[error("PDF文本提取失败 ({path}): {message}")]
    PdfExtractFailed { path: String, message: String },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 不支持的文件类型
    #[error("不支持的文件类型: {path}")]
    UnsupportedType { path: String },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 请求的题目数量不合法
    #[error("题目数量必须在 1 到 {max} 之间，实际为 {requested}")]
    InvalidQuestionCount { requested: usize, max: usize },
    /// 文档中没有可用的文本块
    #[error("文档 {document_id} 没有足够的文本用于出题 (共 {chars} 个字符)")]
    EmptyDocument { document_id: String, chars: usize },
    /// 所有文本块都没有生成题目
    #[error("未能生成任何题目 (请求 {requested} 道)")]
    NoQuestionsGenerated { requested: usize },
    /// 作答中引用了不存在的题目
    #[error("题目 {question_id} 不属于该测验")]
    UnknownQuestion { question_id: usize },
    /// 作答中引用了不存在的选项
    #[error("选项 {option_index} 不属于题目 {question_id}")]
    UnknownOption {
        question_id: usize,
        option_index: usize,
    },
    /// 没有提交任何作答
    #[error("没有提交任何答案")]
    EmptyAnswers,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(ParseError::InvalidJson { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置项不合法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 出错的模型名称
    pub fn model(&self) -> &str {
        match self {
            LlmError::RequestBuildFailed { model, .. }
            | LlmError::ApiCallFailed { model, .. }
            | LlmError::EmptyResponse { model }
            | LlmError::EmptyContent { model } => model,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
