use serde::{Deserialize, Serialize};

/// Second-person phrases that mark a question as addressed to the vendor
/// itself rather than asking about a framework in general.
pub const VENDOR_PHRASES: &[&str] = &[
    "how does your company",
    "do you have",
    "are you compliant with",
    "how is your data handled",
    "what measures do you follow",
    "how do you ensure",
    "does your organization",
    "can you provide",
    "what steps do you take",
    "how do you manage",
    "what policies do you have",
    "how do you handle",
    "are you certified",
    "do you maintain",
    "what security measures",
    "how do you protect",
    "do you comply with",
    "what compliance frameworks",
];

pub fn is_vendor_directed(question: &str) -> bool {
    let lower = question.to_lowercase();
    VENDOR_PHRASES.iter().any(|p| lower.contains(p))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    VendorDirected,
    GeneralInquiry,
}

impl QuestionType {
    pub fn classify(question: &str) -> Self {
        if is_vendor_directed(question) {
            QuestionType::VendorDirected
        } else {
            QuestionType::GeneralInquiry
        }
    }

    pub fn is_vendor_directed(self) -> bool {
        matches!(self, QuestionType::VendorDirected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::VendorDirected => "vendor_directed",
            QuestionType::GeneralInquiry => "general_inquiry",
        }
    }
}
