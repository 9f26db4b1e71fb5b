//! Claims handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::ClaimId;
use domain_workflow::ReportAssembler;

use crate::auth::{permissions, require_permission, TokenClaims};
use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

pub(crate) fn parse_claim_id(raw: String) -> Result<ClaimId, ApiError> {
    ClaimId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Accepts a new claim
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    require_permission(&user, permissions::CLAIM_WRITE)?;
    request.validate()?;

    let claim = state.service.submit_claim(request.into_submission()?).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require_permission(&user, permissions::CLAIM_READ)?;
    let claim = state.service.get_claim(&parse_claim_id(claim_id)?).await?;
    Ok(Json(claim.into()))
}

/// Starts an adjudication run; progress is followed on the returned stream
pub async fn start_processing(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(claim_id): Path<String>,
) -> Result<(StatusCode, Json<ProcessingStartedResponse>), ApiError> {
    require_permission(&user, permissions::CLAIM_PROCESS)?;
    let started = state.service.start_processing(&parse_claim_id(claim_id)?).await?;
    Ok((StatusCode::ACCEPTED, Json(started.into())))
}

/// Latest stored result as a report
pub async fn get_result(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(claim_id): Path<String>,
) -> Result<Json<ResultResponse>, ApiError> {
    require_permission(&user, permissions::CLAIM_READ)?;
    let result = state.service.get_result(&parse_claim_id(claim_id)?).await?;
    Ok(Json(ReportAssembler::report(&result)))
}

/// Every stored run, oldest first
pub async fn get_history(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(claim_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    require_permission(&user, permissions::CLAIM_READ)?;
    let claim_id = parse_claim_id(claim_id)?;
    let history = state.service.get_history(&claim_id).await?;
    Ok(Json(HistoryResponse {
        claim_id,
        runs: history.iter().map(HistoryEntry::from).collect(),
    }))
}
