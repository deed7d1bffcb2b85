pub mod compose;
pub mod error;
pub mod profile;
pub mod prompt;
pub mod record;
pub mod sanitize;
pub mod select;
pub mod vendor;

pub use compose::compose_answer;
pub use error::ContextError;
pub use profile::Profile;
pub use prompt::{build_prompt, PromptOptions, PromptPair, FALLBACK_ANSWER, MODEL_FAILURE_ANSWER};
pub use record::{categories, load_records, parse_records, ComplianceRecord};
pub use sanitize::{is_safe_question, sanitize_question, validate_question};
pub use select::{relevance_score, select_relevant, SelectOptions};
pub use vendor::{is_vendor_directed, QuestionType};
