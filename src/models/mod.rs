pub mod attempt;
pub mod document;
pub mod explanation;
pub mod loaders;
pub mod question;

pub use attempt::{AnswerResult, AttemptResult, QuizAnalytics, SubmittedAnswer};
pub use document::SourceDocument;
pub use explanation::{ExplanationItem, ExplanationRecord, ExplanationSource};
pub use loaders::load_source_document;
pub use question::{AnswerOption, GeneratedQuestion, GenerationMode, OptionKey, QuizBatch};
