use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LandlordId, LeaseTerms, PropertyId, TenantId};
use super::engine::{AssignmentEngine, EngineError};
use super::notifier::ReadModelNotifier;
use super::qualification;
use super::reconcile::Reconciler;
use super::report;
use super::store::LettingsStore;

/// Router builder exposing the assignment, repair, qualification, and
/// portfolio endpoints.
pub fn occupancy_router<S, N>(engine: Arc<AssignmentEngine<S, N>>) -> Router
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    Router::new()
        .route("/api/v1/tenancies/assign", post(assign_handler::<S, N>))
        .route("/api/v1/tenancies/unassign", post(unassign_handler::<S, N>))
        .route(
            "/api/v1/tenants/:tenant_id/force-unassign",
            post(force_unassign_handler::<S, N>),
        )
        .route(
            "/api/v1/tenancies/reconcile",
            post(reconcile_handler::<S, N>),
        )
        .route(
            "/api/v1/qualification/income",
            post(income_qualification_handler::<S, N>),
        )
        .route(
            "/api/v1/qualification/affordability",
            post(affordability_handler::<S, N>),
        )
        .route(
            "/api/v1/portfolio/summary",
            get(portfolio_summary_handler::<S, N>),
        )
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    pub(crate) tenant_id: String,
    pub(crate) property_id: String,
    #[serde(default)]
    pub(crate) unit_number: Option<String>,
    pub(crate) lease: LeaseTerms,
    pub(crate) requesting_user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnassignRequest {
    pub(crate) tenant_id: String,
    pub(crate) property_id: String,
    #[serde(default)]
    pub(crate) unit_number: Option<String>,
    pub(crate) requesting_user_id: String,
    #[serde(default)]
    pub(crate) termination_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForceUnassignRequest {
    pub(crate) requesting_user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReconcileRequest {
    pub(crate) landlord_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QualificationRequest {
    pub(crate) tenant_id: String,
    pub(crate) monthly_rent: f64,
    pub(crate) requesting_user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PortfolioQuery {
    pub(crate) landlord_id: String,
}

pub(crate) async fn assign_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    axum::Json(request): axum::Json<AssignRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let outcome = engine.assign(
        &TenantId(request.tenant_id),
        &PropertyId(request.property_id),
        request.unit_number.as_deref(),
        request.lease,
        &LandlordId(request.requesting_user_id),
    );
    match outcome {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

pub(crate) async fn unassign_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    axum::Json(request): axum::Json<UnassignRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let outcome = engine.unassign(
        &TenantId(request.tenant_id),
        &PropertyId(request.property_id),
        request.unit_number.as_deref(),
        &LandlordId(request.requesting_user_id),
        request.termination_reason,
    );
    match outcome {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

pub(crate) async fn force_unassign_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    Path(tenant_id): Path<String>,
    axum::Json(request): axum::Json<ForceUnassignRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let outcome = engine.force_unassign_tenant(
        &TenantId(tenant_id),
        &LandlordId(request.requesting_user_id),
    );
    match outcome {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

pub(crate) async fn reconcile_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    axum::Json(request): axum::Json<ReconcileRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let reconciler = Reconciler::new(engine.store());
    match reconciler.sync_tenant_assignments(&LandlordId(request.landlord_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => store_error_response(&err.to_string()),
    }
}

pub(crate) async fn income_qualification_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    axum::Json(request): axum::Json<QualificationRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    match load_tenant(&engine, &request) {
        Ok(tenant) => {
            let verdict = qualification::check_income_qualification(&tenant, request.monthly_rent);
            (StatusCode::OK, axum::Json(verdict)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn affordability_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    axum::Json(request): axum::Json<QualificationRequest>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    match load_tenant(&engine, &request) {
        Ok(tenant) => {
            let verdict = qualification::check_affordability(&tenant, request.monthly_rent);
            (StatusCode::OK, axum::Json(verdict)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn portfolio_summary_handler<S, N>(
    State(engine): State<Arc<AssignmentEngine<S, N>>>,
    Query(query): Query<PortfolioQuery>,
) -> Response
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let store = engine.store();
    let owner = LandlordId(query.landlord_id);
    let properties = match store.properties(&owner) {
        Ok(properties) => properties,
        Err(err) => return store_error_response(&err.to_string()),
    };
    let tenants = match store.tenants(&owner) {
        Ok(tenants) => tenants,
        Err(err) => return store_error_response(&err.to_string()),
    };
    let summary = report::portfolio_summary(&properties, &tenants);
    (StatusCode::OK, axum::Json(summary)).into_response()
}

fn load_tenant<S, N>(
    engine: &AssignmentEngine<S, N>,
    request: &QualificationRequest,
) -> Result<super::domain::Tenant, Response>
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    let owner = LandlordId(request.requesting_user_id.clone());
    let id = TenantId(request.tenant_id.clone());
    match engine.store().tenant(&id, &owner) {
        Ok(Some(tenant)) => Ok(tenant),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": EngineError::NotFound.to_string() })),
        )
            .into_response()),
        Err(err) => Err(store_error_response(&err.to_string())),
    }
}

/// Maps engine errors onto the HTTP contract. The two Conflict variants
/// stay distinguishable through the `reason` field so the UI can phrase
/// the fix, while sharing the 409 status that drives retry handling.
pub(crate) fn engine_error_response(err: &EngineError) -> Response {
    let (status, body) = match err {
        EngineError::NotFound | EngineError::NoActiveLease => (
            StatusCode::NOT_FOUND,
            json!({ "error": err.to_string() }),
        ),
        EngineError::UnitRequired | EngineError::UnexpectedUnit => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": err.to_string() }),
        ),
        EngineError::QualificationFailed { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": err.to_string() }),
        ),
        EngineError::DuplicateLease => (
            StatusCode::CONFLICT,
            json!({ "error": err.to_string(), "reason": "duplicate_lease" }),
        ),
        EngineError::AlreadyOccupied => (
            StatusCode::CONFLICT,
            json!({ "error": err.to_string(), "reason": "already_occupied" }),
        ),
        EngineError::Contention => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": err.to_string(), "retryable": true }),
        ),
        EngineError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.to_string() }),
        ),
    };
    (status, axum::Json(body)).into_response()
}

fn store_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}
