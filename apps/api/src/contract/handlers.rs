//! Axum route handlers for the contract workflow.

use axum::{extract::State, Json};

use crate::contract::pipeline::{
    analyze_contract, process_proposal, AnalyzeRequest, AnalyzeResponse, ProcessRequest,
    ProcessResponse,
};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/contracts/process
///
/// Classifies the proposal, picks or generates a template, populates it and
/// returns the draft together with its risk report.
pub async fn handle_process(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    if request.proposal.trim().is_empty() {
        return Err(AppError::Validation("proposal cannot be empty".to_string()));
    }

    let response = process_proposal(state.llm.as_ref(), &state.templates, &request.proposal).await?;
    Ok(Json(response))
}

/// POST /api/v1/contracts/analyze
///
/// Runs an additional risk check on the user-reviewed contract and returns its final version.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.contract.trim().is_empty() {
        return Err(AppError::Validation("contract cannot be empty".to_string()));
    }

    let response = analyze_contract(state.llm.as_ref(), &request.contract).await?;
    Ok(Json(response))
}
