use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::prompt::PromptOptions;
use crate::select::{
    SelectOptions, DEFAULT_CATEGORIES, EXTENDED_CATEGORIES, KEY_PHRASES, QUESTION_STOPWORDS,
};

/// Named selector/prompt tunings.
///
/// - `Chatbot`: wide context (10 records) for the conversational endpoint.
/// - `Standard`: 5 records, same scoring as `Chatbot`.
/// - `Strict`: 3 records, stopwords, phrase bonuses, extended category list
///   and a deterministic generic temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Chatbot,
    Standard,
    Strict,
}

impl Profile {
    pub fn select_options(self) -> SelectOptions {
        match self {
            Profile::Chatbot => SelectOptions::default()
                .with_limit(10)
                .with_categories(DEFAULT_CATEGORIES),
            Profile::Standard => SelectOptions::default()
                .with_limit(5)
                .with_categories(DEFAULT_CATEGORIES),
            Profile::Strict => SelectOptions::default()
                .with_limit(3)
                .with_categories(EXTENDED_CATEGORIES)
                .with_stopwords(QUESTION_STOPWORDS)
                .with_phrases(KEY_PHRASES),
        }
    }

    pub fn prompt_options(self) -> PromptOptions {
        match self {
            Profile::Strict => PromptOptions {
                generic_temperature: 0.0,
                ..PromptOptions::default()
            },
            Profile::Chatbot | Profile::Standard => PromptOptions::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Chatbot => "chatbot",
            Profile::Standard => "standard",
            Profile::Strict => "strict",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatbot" => Ok(Profile::Chatbot),
            "standard" => Ok(Profile::Standard),
            "strict" => Ok(Profile::Strict),
            other => Err(ContextError::UnknownProfile(other.to_string())),
        }
    }
}
