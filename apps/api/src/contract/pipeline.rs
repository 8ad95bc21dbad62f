//! Contract workflow. Each step builds one prompt and forwards it to the completion service.
//!
//! Flow for a new proposal: classify → stored/generated template → populate → risk check.
//! Flow for an edited contract: risk check → finalize.
//!
//! Every step rejects blank input before any API call is made.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::contract::placeholders::find_unfilled_placeholders;
use crate::contract::prompts::{
    CLASSIFY_PROMPT_TEMPLATE, CLASSIFY_SYSTEM, FINALIZE_PROMPT_TEMPLATE, FINALIZE_SYSTEM,
    POPULATE_PROMPT_TEMPLATE, POPULATE_SYSTEM, RISK_PROMPT_TEMPLATE, RISK_SYSTEM,
    TEMPLATE_PROMPT_TEMPLATE, TEMPLATE_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_slots, PLAIN_TEXT_INSTRUCTION};
use crate::llm_client::{strip_code_fences, Completion};
use crate::templates::{TemplateSource, TemplateStore, DEFAULT_TEMPLATE};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub proposal: String,
}

/// Result of running a proposal through the drafting steps.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub template_type: String,
    pub template_source: TemplateSource,
    pub populated_contract: String,
    pub risk_report: String,
    pub unfilled_placeholders: Vec<String>,
    pub processing_time_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub contract: String,
}

/// Result of re-checking and finalizing a user-reviewed contract.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub risk_report: String,
    pub final_contract: String,
    pub unfilled_placeholders: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow steps
// ────────────────────────────────────────────────────────────────────────────

/// Asks the model which kind of contract the proposal calls for.
/// Returns a normalized, lowercase contract type (`default` when the reply is unusable).
pub async fn classify_contract_type(
    llm: &dyn Completion,
    proposal: &str,
) -> Result<String, AppError> {
    let proposal = require_text("proposal", proposal)?;
    let prompt = fill_slots(CLASSIFY_PROMPT_TEMPLATE, &[("proposal", proposal)]);
    let reply = llm
        .complete(&prompt, CLASSIFY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Contract classification failed: {e}")))?;
    Ok(normalize_contract_type(&reply))
}

/// Asks the model for a fresh template of the given contract type.
pub async fn generate_template(
    llm: &dyn Completion,
    contract_type: &str,
) -> Result<String, AppError> {
    let contract_type = require_text("contract type", contract_type)?;
    let prompt = fill_slots(
        TEMPLATE_PROMPT_TEMPLATE,
        &[
            ("contract_type", contract_type),
            ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
        ],
    );
    let reply = llm
        .complete(&prompt, TEMPLATE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Template generation failed: {e}")))?;
    document_text(&reply, "template generation")
}

/// Fills `template` with the details found in `proposal`.
pub async fn populate_template(
    llm: &dyn Completion,
    template: &str,
    proposal: &str,
) -> Result<String, AppError> {
    let template = require_text("template", template)?;
    let proposal = require_text("proposal", proposal)?;
    let prompt = fill_slots(
        POPULATE_PROMPT_TEMPLATE,
        &[
            ("template", template),
            ("proposal", proposal),
            ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
        ],
    );
    let reply = llm
        .complete(&prompt, POPULATE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Template population failed: {e}")))?;
    document_text(&reply, "template population")
}

/// Produces a risk and compliance report for `contract`. The report is used verbatim.
pub async fn risk_compliance_check(
    llm: &dyn Completion,
    contract: &str,
) -> Result<String, AppError> {
    let contract = require_text("contract", contract)?;
    let prompt = fill_slots(RISK_PROMPT_TEMPLATE, &[("contract", contract)]);
    llm.complete(&prompt, RISK_SYSTEM)
        .await
        .map(|report| report.trim().to_string())
        .map_err(|e| AppError::Llm(format!("Risk and compliance check failed: {e}")))
}

/// Produces the final, consistency-checked version of `contract`.
pub async fn finalize_contract(llm: &dyn Completion, contract: &str) -> Result<String, AppError> {
    let contract = require_text("contract", contract)?;
    let prompt = fill_slots(
        FINALIZE_PROMPT_TEMPLATE,
        &[
            ("contract", contract),
            ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
        ],
    );
    let reply = llm
        .complete(&prompt, FINALIZE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Contract finalization failed: {e}")))?;
    document_text(&reply, "contract finalization")
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Runs a proposal through classification, template lookup, population and risk check.
pub async fn process_proposal(
    llm: &dyn Completion,
    templates: &TemplateStore,
    proposal: &str,
) -> Result<ProcessResponse, AppError> {
    let started = Instant::now();
    require_text("proposal", proposal)?;

    let template_type = classify_contract_type(llm, proposal).await?;
    info!("Proposal classified as '{template_type}'");

    let (template, template_source) = templates.get_or_generate(&template_type, llm).await?;

    let populated_contract = populate_template(llm, &template, proposal).await?;
    let unfilled_placeholders = find_unfilled_placeholders(&populated_contract);
    if !unfilled_placeholders.is_empty() {
        info!(
            "Populated contract still has {} unfilled placeholder(s)",
            unfilled_placeholders.len()
        );
    }

    let risk_report = risk_compliance_check(llm, &populated_contract).await?;

    let processing_time_secs = started.elapsed().as_secs_f64();
    info!("Processed proposal in {processing_time_secs:.2}s");

    Ok(ProcessResponse {
        template_type,
        template_source,
        populated_contract,
        risk_report,
        unfilled_placeholders,
        processing_time_secs,
    })
}

/// Re-checks a reviewed contract and produces its final version.
pub async fn analyze_contract(
    llm: &dyn Completion,
    contract: &str,
) -> Result<AnalyzeResponse, AppError> {
    let risk_report = risk_compliance_check(llm, contract).await?;
    let final_contract = finalize_contract(llm, contract).await?;
    let unfilled_placeholders = find_unfilled_placeholders(&final_contract);

    Ok(AnalyzeResponse {
        risk_report,
        final_contract,
        unfilled_placeholders,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Trims `text`, rejecting it when nothing is left.
fn require_text<'a>(field: &str, text: &'a str) -> Result<&'a str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}

/// Strips code fences from a document reply and rejects an empty document.
fn document_text(reply: &str, step: &str) -> Result<String, AppError> {
    let text = strip_code_fences(reply);
    if text.is_empty() {
        return Err(AppError::Llm(format!("{step} returned an empty document")));
    }
    Ok(text.to_string())
}

/// Reduces a classification reply to a bare lowercase contract type.
///
/// Keeps the first non-empty line, drops a leading "Contract type:" label,
/// surrounding quotes/asterisks and trailing punctuation.
pub fn normalize_contract_type(reply: &str) -> String {
    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let lowered = line.to_lowercase();
    let without_label = lowered
        .strip_prefix("contract type:")
        .unwrap_or(lowered.as_str())
        .trim();

    let cleaned = without_label
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '.' | ':' | '-'))
        .trim();

    if cleaned.is_empty() {
        DEFAULT_TEMPLATE.to_string()
    } else {
        cleaned.to_string()
    }
}
