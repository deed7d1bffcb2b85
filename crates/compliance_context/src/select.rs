use crate::record::ComplianceRecord;

const NAME_BONUS: u32 = 15;
const CATEGORY_BONUS: u32 = 10;
const DOMAIN_BONUS: u32 = 5;
const JURISDICTION_BONUS: u32 = 3;
const WORD_IN_DESCRIPTION: u32 = 1;
const WORD_IN_REQUIREMENT: u32 = 2;
const PHRASE_IN_DESCRIPTION: u32 = 3;
const PHRASE_IN_REQUIREMENT: u32 = 4;

/// Question tokens must be longer than this many characters to score.
const MIN_WORD_CHARS: usize = 3;

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Data Privacy",
    "Data Security",
    "Cybersecurity",
    "Compliance",
    "Financial Privacy",
    "Public Sector Privacy",
    "GDPR",
    "HIPAA",
    "CCPA",
];

pub const EXTENDED_CATEGORIES: &[&str] = &[
    "Data Privacy",
    "Data Security",
    "Cybersecurity",
    "Compliance",
    "Financial Privacy",
    "Public Sector Privacy",
    "GDPR",
    "HIPAA",
    "CCPA",
    "Encryption",
    "Access Control",
    "Audit",
    "Authentication",
    "Authorization",
    "Data Retention",
    "Data Deletion",
    "Breach Notification",
    "Risk Assessment",
];

pub const QUESTION_STOPWORDS: &[&str] = &[
    "what", "when", "where", "which", "how", "does", "your", "our", "with",
];

pub const KEY_PHRASES: &[&str] = &[
    "data encryption",
    "encrypt data",
    "at rest",
    "in transit",
    "access control",
    "multi factor",
    "two factor",
    "authentication",
    "data retention",
    "retain data",
    "data deletion",
    "delete data",
    "security audit",
    "penetration test",
    "vulnerability scan",
    "incident response",
    "breach notification",
    "data processing",
    "privacy policy",
    "data protection",
    "data transfer",
    "cross border",
    "third party",
    "vendor management",
    "risk assessment",
    "security protocol",
    "security policy",
    "data classification",
    "data security",
    "security controls",
    "security measures",
];

/// Tuning knobs for one call site of the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOptions {
    pub limit: usize,
    /// Category allow-list. A record's category only earns the category
    /// bonus when it is one of these and the question mentions it.
    pub categories: Vec<String>,
    pub stopwords: Vec<String>,
    /// Phrases that earn a bonus when present in both the question and a
    /// record's description or requirement.
    pub phrases: Vec<String>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            categories: to_owned(DEFAULT_CATEGORIES),
            stopwords: Vec::new(),
            phrases: Vec::new(),
        }
    }
}

impl SelectOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = to_owned(categories);
        self
    }

    pub fn with_stopwords(mut self, stopwords: &[&str]) -> Self {
        self.stopwords = to_owned(stopwords);
        self
    }

    pub fn with_phrases(mut self, phrases: &[&str]) -> Self {
        self.phrases = to_owned(phrases);
        self
    }
}

fn to_owned(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// Everything about the question that does not depend on the record,
/// computed once per selection pass.
struct QuestionTerms {
    lower: String,
    categories: Vec<String>,
    words: Vec<String>,
    phrases: Vec<String>,
}

impl QuestionTerms {
    fn new(question: &str, opts: &SelectOptions) -> Self {
        let lower = question.to_lowercase();
        let categories = opts
            .categories
            .iter()
            .map(|c| c.to_lowercase())
            .filter(|c| !c.is_empty() && lower.contains(c.as_str()))
            .collect();
        let words = lower
            .split_whitespace()
            .filter(|w| w.chars().count() > MIN_WORD_CHARS)
            .filter(|w| !opts.stopwords.iter().any(|s| s.eq_ignore_ascii_case(w)))
            .map(|w| w.to_string())
            .collect();
        let phrases = opts
            .phrases
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty() && lower.contains(p.as_str()))
            .collect();
        Self {
            lower,
            categories,
            words,
            phrases,
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        !needle.is_empty() && self.lower.contains(&needle.to_lowercase())
    }
}

fn score_record(terms: &QuestionTerms, record: &ComplianceRecord) -> u32 {
    let mut score = 0;

    if terms.mentions(&record.name) {
        score += NAME_BONUS;
    }

    if let Some(cat) = record.category.as_deref() {
        let cat = cat.to_lowercase();
        if terms.categories.iter().any(|c| *c == cat) {
            score += CATEGORY_BONUS;
        }
    }

    for domain in record.domains() {
        if terms.mentions(domain) {
            score += DOMAIN_BONUS;
        }
    }

    if let Some(j) = record.jurisdiction.as_deref() {
        if terms.mentions(j) {
            score += JURISDICTION_BONUS;
        }
    }

    let description = record.description.to_lowercase();
    let requirement = record
        .requirement
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    for phrase in &terms.phrases {
        if description.contains(phrase.as_str()) {
            score += PHRASE_IN_DESCRIPTION;
        }
        if requirement.contains(phrase.as_str()) {
            score += PHRASE_IN_REQUIREMENT;
        }
    }

    for word in &terms.words {
        if description.contains(word.as_str()) {
            score += WORD_IN_DESCRIPTION;
        }
        if requirement.contains(word.as_str()) {
            score += WORD_IN_REQUIREMENT;
        }
    }

    score
}

/// Score of one record against `question`. `select_relevant` keeps the
/// records for which this is positive.
pub fn relevance_score(question: &str, record: &ComplianceRecord, opts: &SelectOptions) -> u32 {
    score_record(&QuestionTerms::new(question, opts), record)
}

/// Rank `records` against `question` and return at most `opts.limit` of
/// them, best first. Records that score zero are dropped; equal scores keep
/// their input order.
pub fn select_relevant<'a>(
    question: &str,
    records: &'a [ComplianceRecord],
    opts: &SelectOptions,
) -> Vec<&'a ComplianceRecord> {
    if records.is_empty() || opts.limit == 0 {
        return Vec::new();
    }
    let terms = QuestionTerms::new(question, opts);
    let mut scored: Vec<(&ComplianceRecord, u32)> = records
        .iter()
        .map(|r| (r, score_record(&terms, r)))
        .filter(|(_, score)| *score > 0)
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    tracing::debug!(
        candidates = records.len(),
        matched = scored.len(),
        limit = opts.limit,
        "scored compliance records"
    );
    scored
        .into_iter()
        .take(opts.limit)
        .map(|(r, _)| r)
        .collect()
}
