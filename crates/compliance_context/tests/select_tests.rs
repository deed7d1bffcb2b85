use pretty_assertions::assert_eq;
use proptest::prelude::*;

use compliance_context::select::{
    relevance_score, select_relevant, SelectOptions, KEY_PHRASES, QUESTION_STOPWORDS,
};
use compliance_context::{ComplianceRecord, Profile};

fn gdpr() -> ComplianceRecord {
    ComplianceRecord::new(
        "GDPR",
        "General Data Protection Regulation governing personal data.",
    )
    .with_category("Data Privacy")
    .with_domains(["consent"])
    .with_jurisdiction("EU")
    .with_requirement("Must obtain explicit consent.")
}

fn corpus() -> Vec<ComplianceRecord> {
    vec![
        gdpr(),
        ComplianceRecord::new(
            "HIPAA",
            "US law protecting health information handled by covered entities.",
        )
        .with_category("Data Privacy")
        .with_domains(["health", "breach notification"])
        .with_jurisdiction("United States")
        .with_requirement("Notify affected individuals of a breach within 60 days."),
        ComplianceRecord::new(
            "ISO 27001",
            "International standard for information security management systems.",
        )
        .with_category("Cybersecurity")
        .with_domains(["risk assessment", "access control"])
        .with_requirement("Maintain an information security risk assessment process."),
        ComplianceRecord::new(
            "PCI DSS",
            "Security standard for organizations handling card payments.",
        )
        .with_category("Data Security")
        .with_domains(["encryption"])
        .with_requirement("Encrypt transmission of cardholder data across open networks."),
    ]
}

fn names(records: &[&ComplianceRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}

#[test]
fn gdpr_consent_question_selects_gdpr_only() {
    let records = vec![gdpr()];
    let out = select_relevant(
        "Does your company comply with GDPR consent rules?",
        &records,
        &SelectOptions::default().with_limit(5),
    );
    assert_eq!(names(&out), vec!["GDPR"]);
}

#[test]
fn gdpr_scenario_breakdown() {
    let q = "Does your company comply with GDPR consent rules?";
    // name 15 + domain 5 + "consent" in requirement 2
    assert_eq!(relevance_score(q, &gdpr(), &SelectOptions::default()), 22);
}

#[test]
fn jurisdiction_mention_scores() {
    let rec = ComplianceRecord::new("X", "").with_jurisdiction("EU");
    let opts = SelectOptions::default();
    assert_eq!(relevance_score("EU data rules", &rec, &opts), 3);
    assert_eq!(relevance_score("US data rules", &rec, &opts), 0);
    // name 15 + jurisdiction 3 + "data" in description 1
    assert_eq!(relevance_score("GDPR in the EU: which data rules?", &gdpr(), &opts), 19);
}

#[test]
fn category_needs_allow_list_and_mention() {
    let rec = ComplianceRecord::new("X", "").with_category("data privacy");
    let opts = SelectOptions::default();
    assert_eq!(relevance_score("tell me about Data Privacy", &rec, &opts), 10);
    assert_eq!(relevance_score("tell me about privacy", &rec, &opts), 0);

    let off_list = ComplianceRecord::new("X", "").with_category("Data Privacy Law");
    assert_eq!(relevance_score("tell me about data privacy law", &off_list, &opts), 0);
}

#[test]
fn word_scores_description_and_requirement_additively() {
    let rec = ComplianceRecord::new("", "encryption at rest")
        .with_requirement("use encryption everywhere");
    assert_eq!(relevance_score("encryption", &rec, &SelectOptions::default()), 3);
}

#[test]
fn short_words_and_stopwords_do_not_score() {
    let rec = ComplianceRecord::new("", "what does your policy say about keys");
    let plain = SelectOptions::default();
    // "what", "does", "your" are four letters and score without stopwords
    assert_eq!(relevance_score("what does your key", &rec, &plain), 3);
    let strict = plain.with_stopwords(QUESTION_STOPWORDS);
    assert_eq!(relevance_score("what does your key", &rec, &strict), 0);
}

#[test]
fn phrase_bonus_needs_phrase_in_question() {
    let rec = ComplianceRecord::new("", "requires data encryption")
        .with_requirement("apply data encryption to backups");
    let opts = SelectOptions::default().with_phrases(KEY_PHRASES);
    // phrase 3 + 4, then words "data" (1 + 2) and "encryption" (1 + 2)
    assert_eq!(relevance_score("data encryption", &rec, &opts), 13);
    assert_eq!(relevance_score("encryption data", &rec, &opts), 6);
}

#[test]
fn empty_strings_never_match() {
    let rec = ComplianceRecord::new("", "")
        .with_domains([""])
        .with_jurisdiction("");
    assert_eq!(relevance_score("anything at all", &rec, &SelectOptions::default()), 0);
}

#[test]
fn substring_matching_is_not_tokenized() {
    let rec = ComplianceRecord::new("HIPAA", "");
    assert_eq!(relevance_score("is hipaaland covered", &rec, &SelectOptions::default()), 15);
}

#[test]
fn empty_records_give_empty_selection() {
    let out = select_relevant("anything", &[], &SelectOptions::default());
    assert!(out.is_empty());
}

#[test]
fn unrelated_question_gives_empty_selection() {
    let records = corpus();
    let out = select_relevant("Lunch?", &records, &Profile::Chatbot.select_options());
    assert!(out.is_empty());
}

#[test]
fn ranks_by_descending_score() {
    let records = corpus();
    // HIPAA: name 15 + category 10 + domains 5 + 5; GDPR: category 10 only
    let out = select_relevant(
        "HIPAA data privacy rules for health breach notification",
        &records,
        &Profile::Standard.select_options(),
    );
    assert_eq!(names(&out)[..2].to_vec(), vec!["HIPAA", "GDPR"]);
}

#[test]
fn ties_keep_input_order() {
    let records = vec![
        ComplianceRecord::new("A", "covers retention"),
        ComplianceRecord::new("B", "covers retention"),
        ComplianceRecord::new("C", "covers retention"),
    ];
    let out = select_relevant("retention", &records, &SelectOptions::default());
    assert_eq!(names(&out), vec!["A", "B", "C"]);
}

#[test]
fn limit_truncates_after_sorting() {
    let records = corpus();
    let question = "GDPR HIPAA ISO 27001 PCI DSS";
    let strict = select_relevant(question, &records, &Profile::Strict.select_options());
    assert_eq!(strict.len(), 3);
    let chatbot = select_relevant(question, &records, &Profile::Chatbot.select_options());
    assert_eq!(chatbot.len(), 4);
}

#[test]
fn strict_profile_uses_phrase_bonus() {
    let records = vec![
        ComplianceRecord::new("Plain", "annual review of the program"),
        ComplianceRecord::new("Phrased", "formal incident response plan")
            .with_requirement("test the incident response plan yearly"),
    ];
    let out = select_relevant(
        "How is incident response organized?",
        &records,
        &Profile::Strict.select_options(),
    );
    assert_eq!(names(&out), vec!["Phrased"]);
}

#[test]
fn missing_optional_fields_are_tolerated() {
    let records: Vec<ComplianceRecord> =
        serde_json::from_str(r#"[{"name": null, "description": null}, {"name": "SOC 2"}]"#)
            .unwrap();
    let out = select_relevant("Is SOC 2 in scope?", &records, &SelectOptions::default());
    assert_eq!(names(&out), vec!["SOC 2"]);
}

fn arb_record() -> impl Strategy<Value = ComplianceRecord> {
    (
        "[A-Za-z]{0,6}",
        "[a-z ]{0,30}",
        proptest::option::of("[a-z ]{0,20}"),
        proptest::collection::vec("[a-z]{0,5}", 0..3),
    )
        .prop_map(|(name, description, requirement, domains)| {
            let mut rec = ComplianceRecord::new(name, description).with_domains(domains);
            rec.requirement = requirement;
            rec
        })
}

proptest! {
    /// A record whose name appears in the question is always selected when
    /// there is room for it.
    #[test]
    fn named_record_is_always_selected(
        rec in arb_record().prop_filter("non-empty name", |r| !r.name.is_empty()),
        prefix in "[a-z ]{0,20}",
    ) {
        let question = format!("{prefix} {}", rec.name.to_uppercase());
        let records = vec![rec];
        let out = select_relevant(&question, &records, &SelectOptions::default().with_limit(1));
        prop_assert_eq!(out.len(), 1);
    }

    /// Output never exceeds the limit, holds only positive scores in
    /// non-increasing order, and keeps input order among equal scores.
    #[test]
    fn output_is_ranked_stable_subsequence(
        records in proptest::collection::vec(arb_record(), 0..12),
        question in "[a-z ]{0,40}",
        limit in 0usize..6,
    ) {
        let opts = SelectOptions::default().with_limit(limit);
        let out = select_relevant(&question, &records, &opts);
        prop_assert!(out.len() <= limit);

        let ranked: Vec<(usize, u32)> = out
            .iter()
            .map(|r| {
                let idx = records
                    .iter()
                    .position(|x| std::ptr::eq(x, *r))
                    .expect("selected record comes from the input");
                (idx, relevance_score(&question, r, &opts))
            })
            .collect();
        for (_, score) in &ranked {
            prop_assert!(*score > 0);
        }
        for pair in ranked.windows(2) {
            let ((i, a), (j, b)) = (pair[0], pair[1]);
            prop_assert!(a >= b);
            if a == b {
                prop_assert!(i < j);
            }
        }

        // Nothing left out outranks what was kept.
        let positive = records
            .iter()
            .filter(|r| relevance_score(&question, r, &opts) > 0)
            .count();
        prop_assert_eq!(out.len(), positive.min(limit));
        if let Some((_, lowest)) = ranked.last() {
            for (i, r) in records.iter().enumerate() {
                if !ranked.iter().any(|(k, _)| *k == i) {
                    prop_assert!(relevance_score(&question, r, &opts) <= *lowest);
                }
            }
        }
    }

    /// Same inputs, same output.
    #[test]
    fn selection_is_idempotent(
        records in proptest::collection::vec(arb_record(), 0..12),
        question in "[a-z ]{0,40}",
    ) {
        let opts = Profile::Strict.select_options();
        let a = select_relevant(&question, &records, &opts);
        let b = select_relevant(&question, &records, &opts);
        prop_assert_eq!(a, b);
    }
}
