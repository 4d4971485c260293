//! Investment Plan API
//!
//! Public listing of active plans plus admin CRUD.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::plan::entity::InvestmentPlan;
use crate::plan::repository::PlanRepository;
use crate::audit::AuditService;
use crate::shared::api_common::{CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Plan response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_amount: f64,
    pub max_amount: Option<f64>,
    pub interest_rate: f64,
    pub tenure_months: i32,
    pub is_active: bool,
    pub created_at: String,
}

impl From<InvestmentPlan> for PlanResponse {
    fn from(plan: InvestmentPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            min_amount: plan.min_amount,
            max_amount: plan.max_amount,
            interest_rate: plan.interest_rate,
            tenure_months: plan.tenure_months,
            is_active: plan.is_active,
            created_at: plan.created_at.to_rfc3339(),
        }
    }
}

/// Create plan request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub name: String,
    pub description: String,
    pub min_amount: f64,
    pub max_amount: Option<f64>,
    pub interest_rate: f64,
    pub tenure_months: i32,
}

/// Update plan request (partial)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub tenure_months: Option<i32>,
}

fn validate_bounds(min_amount: f64, max_amount: Option<f64>, interest_rate: f64, tenure_months: i32) -> Result<(), PlatformError> {
    if min_amount <= 0.0 {
        return Err(PlatformError::validation("Minimum amount must be positive"));
    }
    if let Some(max) = max_amount {
        if max < min_amount {
            return Err(PlatformError::validation("Maximum amount must not be below minimum amount"));
        }
    }
    if interest_rate <= 0.0 {
        return Err(PlatformError::validation("Interest rate must be positive"));
    }
    if tenure_months <= 0 {
        return Err(PlatformError::validation("Tenure must be at least one month"));
    }
    Ok(())
}

/// Plans service state
#[derive(Clone)]
pub struct PlansState {
    pub plan_repo: Arc<PlanRepository>,
    pub audit_service: Arc<AuditService>,
}

/// List active plans (public)
#[utoipa::path(
    get,
    path = "",
    tag = "plans",
    operation_id = "getApiPlans",
    responses(
        (status = 200, description = "Active investment plans", body = Vec<PlanResponse>)
    )
)]
pub async fn list_active_plans(
    State(state): State<PlansState>,
) -> Result<Json<Vec<PlanResponse>>, PlatformError> {
    let plans = state.plan_repo.find_active().await?;
    let response: Vec<PlanResponse> = plans.into_iter().map(|p| p.into()).collect();
    Ok(Json(response))
}

/// List all plans including inactive (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "plans",
    operation_id = "getApiAdminPlans",
    responses(
        (status = 200, description = "All investment plans", body = Vec<PlanResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_plans(
    State(state): State<PlansState>,
    auth: Authenticated,
) -> Result<Json<Vec<PlanResponse>>, PlatformError> {
    crate::checks::require_admin(&auth.0)?;

    let plans = state.plan_repo.find_all().await?;
    let response: Vec<PlanResponse> = plans.into_iter().map(|p| p.into()).collect();
    Ok(Json(response))
}

/// Create a plan (admin)
#[utoipa::path(
    post,
    path = "",
    tag = "plans",
    operation_id = "postApiAdminPlans",
    request_body = CreatePlanRequest,
    responses(
        (status = 200, description = "Plan created", body = CreatedResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Plan name already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_plan(
    State(state): State<PlansState>,
    auth: Authenticated,
    Json(request): Json<CreatePlanRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::checks::can_manage_plans(&auth.0)?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(PlatformError::validation("Plan name is required"));
    }
    validate_bounds(request.min_amount, request.max_amount, request.interest_rate, request.tenure_months)?;

    if state.plan_repo.find_by_name(name).await?.is_some() {
        return Err(PlatformError::duplicate("InvestmentPlan", "name", name));
    }

    let plan = InvestmentPlan::new(
        name,
        request.description.trim(),
        request.min_amount,
        request.max_amount,
        request.interest_rate,
        request.tenure_months,
    );

    state.plan_repo.insert(&plan).await?;
    state.audit_service.log_create(&auth.0, "InvestmentPlan", &plan.id, "CreatePlan").await?;

    info!(plan_id = %plan.id, name = %plan.name, "Investment plan created");

    Ok(Json(CreatedResponse::new(plan.id)))
}

/// Update a plan (admin)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "plans",
    operation_id = "putApiAdminPlansById",
    params(
        ("id" = String, Path, description = "Plan ID")
    ),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Plan updated", body = PlanResponse),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_plan(
    State(state): State<PlansState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<Json<PlanResponse>, PlatformError> {
    crate::checks::can_manage_plans(&auth.0)?;

    let mut plan = state.plan_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("InvestmentPlan", &id))?;

    if let Some(name) = request.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PlatformError::validation("Plan name is required"));
        }
        if name != plan.name {
            if state.plan_repo.find_by_name(&name).await?.is_some() {
                return Err(PlatformError::duplicate("InvestmentPlan", "name", &name));
            }
            plan.name = name;
        }
    }
    if let Some(description) = request.description {
        plan.description = description.trim().to_string();
    }
    if let Some(min_amount) = request.min_amount {
        plan.min_amount = min_amount;
    }
    if request.max_amount.is_some() {
        plan.max_amount = request.max_amount;
    }
    if let Some(interest_rate) = request.interest_rate {
        plan.interest_rate = interest_rate;
    }
    if let Some(tenure_months) = request.tenure_months {
        plan.tenure_months = tenure_months;
    }
    validate_bounds(plan.min_amount, plan.max_amount, plan.interest_rate, plan.tenure_months)?;

    plan.updated_at = Utc::now();
    state.plan_repo.update(&plan).await?;
    state.audit_service.log_update(&auth.0, "InvestmentPlan", &id, "UpdatePlan").await?;

    Ok(Json(plan.into()))
}

/// Activate a plan (admin)
#[utoipa::path(
    post,
    path = "/{id}/activate",
    tag = "plans",
    operation_id = "postApiAdminPlansByIdActivate",
    params(
        ("id" = String, Path, description = "Plan ID")
    ),
    responses(
        (status = 200, description = "Plan activated", body = SuccessResponse),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_plan(
    State(state): State<PlansState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_plans(&auth.0)?;

    let mut plan = state.plan_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("InvestmentPlan", &id))?;

    plan.activate();
    state.plan_repo.update(&plan).await?;
    state.audit_service.log_update(&auth.0, "InvestmentPlan", &id, "ActivatePlan").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Deactivate a plan (admin)
#[utoipa::path(
    post,
    path = "/{id}/deactivate",
    tag = "plans",
    operation_id = "postApiAdminPlansByIdDeactivate",
    params(
        ("id" = String, Path, description = "Plan ID")
    ),
    responses(
        (status = 200, description = "Plan deactivated", body = SuccessResponse),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_plan(
    State(state): State<PlansState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_plans(&auth.0)?;

    let mut plan = state.plan_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("InvestmentPlan", &id))?;

    plan.deactivate();
    state.plan_repo.update(&plan).await?;
    state.audit_service.log_update(&auth.0, "InvestmentPlan", &id, "DeactivatePlan").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a plan (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "plans",
    operation_id = "deleteApiAdminPlansById",
    params(
        ("id" = String, Path, description = "Plan ID")
    ),
    responses(
        (status = 200, description = "Plan deleted", body = SuccessResponse),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_plan(
    State(state): State<PlansState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_plans(&auth.0)?;

    let deleted = state.plan_repo.delete(&id).await?;
    if !deleted {
        return Err(PlatformError::not_found("InvestmentPlan", &id));
    }
    state.audit_service.log_delete(&auth.0, "InvestmentPlan", &id, "DeletePlan").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create the public plans router (mounted under /api/plans)
pub fn plans_router(state: PlansState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_active_plans))
        .with_state(state)
}

/// Create the admin plans router (mounted under /api/admin/plans)
pub fn admin_plans_router(state: PlansState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_all_plans, create_plan))
        .routes(routes!(update_plan, delete_plan))
        .routes(routes!(activate_plan))
        .routes(routes!(deactivate_plan))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(1000.0, Some(5000.0), 7.0, 12).is_ok());
        assert!(validate_bounds(1000.0, None, 7.0, 12).is_ok());
        assert!(validate_bounds(0.0, None, 7.0, 12).is_err());
        assert!(validate_bounds(1000.0, Some(500.0), 7.0, 12).is_err());
        assert!(validate_bounds(1000.0, None, 0.0, 12).is_err());
        assert!(validate_bounds(1000.0, None, 7.0, 0).is_err());
    }
}
