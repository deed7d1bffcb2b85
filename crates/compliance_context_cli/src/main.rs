use std::io::{Read, Write};

use compliance_context::{
    build_prompt, select_relevant, validate_question, ComplianceRecord, Profile, PromptPair,
    QuestionType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct SelectRequest {
    question: String,
    records: Vec<ComplianceRecord>,
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SelectResponse<'a> {
    /// The question after redaction; this is what the prompt carries.
    question: String,
    question_type: QuestionType,
    records: Vec<&'a ComplianceRecord>,
    /// `None` when nothing was relevant; callers answer with the fallback.
    prompt: Option<PromptPair>,
}

fn fail(msg: &str) -> ! {
    let line = serde_json::json!({ "ok": false, "error": msg });
    let _ = writeln!(std::io::stderr(), "{line}");
    std::process::exit(2);
}

fn main() {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        fail("failed to read stdin");
    }

    let req: SelectRequest = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => fail(&format!("invalid json: {e}")),
    };
    let question = match validate_question(&req.question) {
        Ok(q) => q,
        Err(e) => fail(&e.to_string()),
    };

    let profile = req.profile.unwrap_or_default();
    let mut opts = profile.select_options();
    if let Some(limit) = req.limit {
        opts.limit = limit;
    }
    let question_type = QuestionType::classify(&question);
    let records = select_relevant(&question, &req.records, &opts);
    let prompt = build_prompt(
        &question,
        &records,
        question_type.is_vendor_directed(),
        &profile.prompt_options(),
    )
    .ok();

    let resp = SelectResponse {
        question,
        question_type,
        records,
        prompt,
    };
    let out = serde_json::to_string(&resp)
        .unwrap_or_else(|_| "{\"ok\":false,\"error\":\"encode error\"}".to_string());
    let _ = std::io::stdout().write_all(out.as_bytes());
}
