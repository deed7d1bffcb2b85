//! Deterministic answer built straight from the selected records, used when
//! no model is configured.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::prompt::FALLBACK_ANSWER;
use crate::record::ComplianceRecord;

const DESCRIPTION_MAX_CHARS: usize = 150;
const MAX_MAIN_POINTS: usize = 2;

static SENTENCE_BREAK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[.;]\s+").ok());

const YES_NO_OPENERS: &[&str] = &["do you", "does your", "can you", "are you"];

fn question_topic(lower: &str) -> Option<&'static str> {
    let has = |needle: &str| lower.contains(needle);
    if has("encrypt") {
        Some("encryption")
    } else if has("access") || has("authentication") {
        Some("access control")
    } else if has("retention") || has("store") {
        Some("data retention")
    } else if has("third party") || has("vendor") {
        Some("third-party management")
    } else if has("breach") || has("incident") {
        Some("incident response")
    } else {
        None
    }
}

/// First couple of reasonably sized sentences of a requirement text.
fn main_points(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let pieces: Vec<&str> = match SENTENCE_BREAK.as_ref() {
        Some(re) => re.split(text).collect(),
        None => vec![text],
    };
    pieces
        .into_iter()
        .filter(|s| {
            let n = s.chars().count();
            n > 10 && n < 120
        })
        .take(MAX_MAIN_POINTS)
        .collect()
}

/// Shorten `text` to at most `max_chars` characters, cutting on a word
/// boundary and appending `...`.
fn condense(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let window_end = text
        .char_indices()
        .nth(max_chars.saturating_sub(2))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let cut = match text[..window_end].rfind(' ') {
        Some(i) => i,
        None => text
            .char_indices()
            .nth(max_chars.saturating_sub(3))
            .map(|(i, _)| i)
            .unwrap_or(text.len()),
    };
    format!("{}...", &text[..cut])
}

pub fn compose_answer(question: &str, records: &[&ComplianceRecord]) -> String {
    let Some(top) = records.first() else {
        return FALLBACK_ANSWER.to_string();
    };
    let lower = question.trim().to_lowercase();
    let mut answer = String::new();

    if YES_NO_OPENERS.iter().any(|o| lower.starts_with(o)) {
        answer.push_str("Yes. ");
    }

    let points = main_points(top.requirement.as_deref().unwrap_or(""));
    if points.is_empty() {
        answer.push_str(&format!(
            "Our compliance with {} addresses this through our {} controls. ",
            top.name,
            question_topic(&lower).unwrap_or("security")
        ));
    } else {
        answer.push_str(&points.join(" "));
        answer.push(' ');
    }

    answer.push_str("\n\nRelevant compliance frameworks:\n\n");
    for rec in records {
        answer.push_str(&format!("**{}**\n", rec.name));
        answer.push_str(&format!(
            "Description: {}\n",
            condense(&rec.description, DESCRIPTION_MAX_CHARS)
        ));
        if let Some(req) = rec.requirement.as_deref().filter(|r| !r.is_empty()) {
            answer.push_str(&format!("Requirements: {req}\n"));
        }
        answer.push('\n');
    }

    answer.push_str(
        "For further details or implementation specifics, please contact our compliance team.",
    );
    answer
}
