use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ContextError;

pub const MIN_QUESTION_CHARS: usize = 5;
pub const MAX_QUESTION_CHARS: usize = 1000;

// Applied in order; e-mail goes before URL so the domain part is not
// double-masked.
static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b", "[EMAIL_REDACTED]"),
        (
            r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})",
            "[PHONE_REDACTED]",
        ),
        (r"\b\d{3}-?\d{2}-?\d{4}\b", "[SSN_REDACTED]"),
        (r"\b(?:\d{4}[-\s]?){3}\d{4}\b", "[CARD_REDACTED]"),
        (r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b", "[IP_REDACTED]"),
        (
            r"(?i)https?://(?:[-\w.])+(?::\d+)?(?:/[\w/_.-]*(?:\?[\w&=%.]*)?(?:#\w*)?)?",
            "[URL_REDACTED]",
        ),
        (r"\b[A-Za-z0-9]{32,}\b", "[API_KEY_REDACTED]"),
        (
            r"(?i)\b(?:password|pwd|pass|secret|key|token)\s*[:=]\s*\S+",
            "[CREDENTIAL_REDACTED]",
        ),
    ]
    .into_iter()
    .filter_map(|(pat, mask)| Regex::new(pat).ok().map(|re| (re, mask)))
    .collect()
});

static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

const HARMFUL_MARKERS: &[&str] = &[
    "<script",
    "javascript:",
    "eval(",
    "exec(",
    "system(",
    "__import__",
];

static IMPORT_OS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"import\s+os").ok());

/// Mask PII and credentials in a question and collapse whitespace.
pub fn sanitize_question(text: &str) -> String {
    let trimmed = text.trim();
    let mut out = trimmed.to_string();
    for (re, mask) in REDACTIONS.iter() {
        out = re.replace_all(&out, *mask).into_owned();
    }
    if let Some(ws) = WHITESPACE.as_ref() {
        out = ws.replace_all(&out, " ").trim().to_string();
    }
    if out.len() != trimmed.len() {
        tracing::info!(
            original_len = trimmed.len(),
            sanitized_len = out.len(),
            "question sanitized"
        );
    }
    out
}

pub fn is_safe_question(question: &str) -> bool {
    let len = question.trim().chars().count();
    if !(MIN_QUESTION_CHARS..=MAX_QUESTION_CHARS).contains(&len) {
        return false;
    }
    let lower = question.to_lowercase();
    if let Some(marker) = HARMFUL_MARKERS.iter().find(|m| lower.contains(*m)) {
        tracing::warn!(marker = %marker, "potentially harmful pattern in question");
        return false;
    }
    if IMPORT_OS.as_ref().is_some_and(|re| re.is_match(&lower)) {
        tracing::warn!(marker = "import os", "potentially harmful pattern in question");
        return false;
    }
    true
}

/// Upstream validation for the ask pipeline: reject blank input, sanitize,
/// then apply the safety checks to the sanitized text.
pub fn validate_question(raw: &str) -> Result<String, ContextError> {
    if raw.trim().is_empty() {
        return Err(ContextError::EmptyQuestion);
    }
    let question = sanitize_question(raw);
    if question.is_empty() {
        return Err(ContextError::EmptyQuestion);
    }
    if !is_safe_question(&question) {
        return Err(ContextError::UnsafeQuestion(
            "question contains unsafe content or has an invalid length".to_string(),
        ));
    }
    Ok(question)
}
