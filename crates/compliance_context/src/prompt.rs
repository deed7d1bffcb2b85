use serde::Serialize;

use crate::error::ContextError;
use crate::record::ComplianceRecord;

pub const FALLBACK_ANSWER: &str = "This information is not available in the current compliance dataset. Please consult the compliance officer.";

pub const MODEL_FAILURE_ANSWER: &str = "We were unable to generate an answer to this question right now. Please try again later or consult the compliance officer.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_content: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptOptions {
    pub vendor_temperature: f32,
    pub generic_temperature: f32,
}

impl PromptPair {
    /// Rough token count for both messages, at four characters per token.
    pub fn estimated_tokens(&self) -> usize {
        (self.system_prompt.chars().count() + self.user_content.chars().count()) / 4
    }
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            vendor_temperature: 0.5,
            generic_temperature: 0.4,
        }
    }
}

fn vendor_system_prompt() -> String {
    [
        "You are answering as a SaaS vendor that follows GDPR, ISO 27001, and other European and Southeast Asian regulatory frameworks.",
        "You implement comprehensive security and compliance measures based on industry best practices.",
        "",
        "When answering, speak as the vendor (\"we\", \"our company\", \"our organization\") and give specific, confident responses about your compliance practices.",
        "Ground every claim in the compliance framework information provided to show how you meet the relevant regulatory requirements.",
        "",
        "Use the following compliance information as the basis for your practices:",
    ]
    .join("\n")
}

fn generic_system_prompt() -> String {
    [
        "You are a security and compliance assistant for SaaS vendors.",
        "Use the following reference information to answer the user's question accurately and concisely.",
        "Provide helpful guidance about compliance frameworks and security best practices.",
        "If the reference information does not cover the question, say so instead of guessing.",
    ]
    .join("\n")
}

/// Pretty-printed JSON dump of the records, as fed to the model.
pub fn context_block(records: &[&ComplianceRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

pub fn build_prompt(
    question: &str,
    records: &[&ComplianceRecord],
    vendor_directed: bool,
    opts: &PromptOptions,
) -> Result<PromptPair, ContextError> {
    if records.is_empty() {
        return Err(ContextError::EmptyContext);
    }
    let context = context_block(records);
    let pair = if vendor_directed {
        PromptPair {
            system_prompt: vendor_system_prompt(),
            user_content: format!(
                "Reference Information:\n{context}\n\nAnswer the following question from a prospective enterprise client, as if you are the vendor:\n\nQ: {question}\nA:"
            ),
            temperature: opts.vendor_temperature,
        }
    } else {
        PromptPair {
            system_prompt: generic_system_prompt(),
            user_content: format!("Reference Information:\n{context}\n\nQ: {question}"),
            temperature: opts.generic_temperature,
        }
    };
    Ok(pair)
}
