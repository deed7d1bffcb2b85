use std::sync::Arc;
use std::time::Duration;

use compliance_context::{
    build_prompt, compose_answer, select_relevant, validate_question, ComplianceRecord,
    ContextError, Profile, QuestionType, FALLBACK_ANSWER, MODEL_FAILURE_ANSWER,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::llm_client::{LlmClient, LlmRequest};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Nothing relevant was found; the canned answer was returned.
    Fallback,
    Model,
    Offline,
    ModelFailed,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub trace_id: String,
    pub question: String,
    pub answer: String,
    pub question_type: QuestionType,
    pub profile: Profile,
    pub sources: usize,
    pub mode: AnswerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error(transparent)]
    Invalid(#[from] ContextError),
    #[error("Question is too complex. Please try breaking it into smaller, more specific questions.")]
    PromptTooLong { estimated: usize, limit: usize },
}

#[derive(Clone)]
pub struct AskContext {
    pub records: Arc<Vec<ComplianceRecord>>,
    pub profile: Profile,
    /// `None` answers offline from the records alone.
    pub llm: Option<Arc<LlmClient>>,
    pub max_tokens: u32,
    /// Prompts estimated above this are refused before the model is called.
    pub max_prompt_tokens: usize,
    pub request_timeout: Duration,
}

impl AskContext {
    pub fn new(records: Vec<ComplianceRecord>, llm: Option<LlmClient>) -> Self {
        let defaults = RunnerConfig::default();
        Self {
            records: Arc::new(records),
            profile: defaults.profile,
            llm: llm.map(Arc::new),
            max_tokens: defaults.max_tokens,
            max_prompt_tokens: defaults.max_prompt_tokens,
            request_timeout: defaults.request_timeout,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn from_config(
        cfg: &RunnerConfig,
        records: Vec<ComplianceRecord>,
        llm: Option<LlmClient>,
    ) -> Self {
        Self {
            profile: cfg.profile,
            max_tokens: cfg.max_tokens,
            max_prompt_tokens: cfg.max_prompt_tokens,
            request_timeout: cfg.request_timeout,
            ..Self::new(records, llm)
        }
    }

    pub fn mode_name(&self) -> &str {
        match self.llm.as_deref() {
            Some(llm) => llm.model_name(),
            None => "offline",
        }
    }
}

pub async fn ask(req: &AskRequest, ctx: &AskContext) -> Result<AskResponse, AskError> {
    let trace_id = Uuid::new_v4().to_string();
    let question = validate_question(req.question.as_deref().unwrap_or(""))?;
    let profile = req.profile.unwrap_or(ctx.profile);
    let question_type = QuestionType::classify(&question);
    let mut warnings = Vec::new();

    let selected = select_relevant(&question, &ctx.records, &profile.select_options());
    tracing::info!(
        %trace_id,
        question_type = question_type.as_str(),
        %profile,
        sources = selected.len(),
        "question classified"
    );

    let mut resp = AskResponse {
        trace_id,
        question,
        answer: String::new(),
        question_type,
        profile,
        sources: selected.len(),
        mode: AnswerMode::Fallback,
        model: None,
        tokens_used: None,
        warnings: Vec::new(),
    };

    if selected.is_empty() {
        warnings.push("no_relevant_records".to_string());
        resp.answer = FALLBACK_ANSWER.to_string();
        resp.warnings = warnings;
        return Ok(resp);
    }

    let Some(llm) = ctx.llm.as_deref() else {
        resp.answer = compose_answer(&resp.question, &selected);
        resp.mode = AnswerMode::Offline;
        resp.warnings = warnings;
        return Ok(resp);
    };

    let prompt = build_prompt(
        &resp.question,
        &selected,
        question_type.is_vendor_directed(),
        &profile.prompt_options(),
    )?;
    let estimated = prompt.estimated_tokens();
    if estimated > ctx.max_prompt_tokens {
        tracing::warn!(
            trace_id = %resp.trace_id,
            estimated,
            limit = ctx.max_prompt_tokens,
            "prompt too long"
        );
        return Err(AskError::PromptTooLong {
            estimated,
            limit: ctx.max_prompt_tokens,
        });
    }
    let llm_req = LlmRequest::from_prompt(&prompt, ctx.max_tokens, ctx.request_timeout);
    resp.model = Some(llm.model_name().to_string());

    match llm.complete(llm_req).await {
        Ok(out) => {
            resp.answer = out.content;
            resp.tokens_used = out.total_tokens;
            resp.mode = AnswerMode::Model;
        }
        Err(e) => {
            tracing::error!(trace_id = %resp.trace_id, error = %e, "model call failed");
            warnings.push(format!("llm_failed: {e}"));
            resp.answer = MODEL_FAILURE_ANSWER.to_string();
            resp.mode = AnswerMode::ModelFailed;
        }
    }
    resp.warnings = warnings;
    Ok(resp)
}
