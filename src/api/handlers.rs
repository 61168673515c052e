// Workflow REST API handlers
// Each handler maps one route onto one WorkflowService call

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, error, info};

use super::types::{CreateInstanceRequest, ErrorResponse, ExecuteActionRequest};
use crate::engine::{CreateDefinitionRequest, WorkflowService};
use crate::models::{Action, ActionId, WorkflowDefinition, WorkflowInstance};
use crate::WorkflowError;

type ApiResult<T> = Result<T, ErrorResponse>;

/// Log server-side failures loudly; client errors only at debug level
fn into_api_error(operation: &str, e: WorkflowError) -> ErrorResponse {
    match &e {
        WorkflowError::Validation(reason) | WorkflowError::Conflict(reason) => {
            debug!("🚫 {} rejected: {}", operation, reason);
        }
        other => error!("❌ {} failed: {}", operation, other),
    }
    ErrorResponse::from(e)
}

/// Unwrap a JSON body, reporting malformed input as a validation error
fn json_body<T>(operation: &str, payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let reason = format!("invalid request body: {}", rejection.body_text());
        into_api_error(operation, WorkflowError::validation(reason))
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fsm-workflow",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /api/workflows
pub async fn create_definition(
    State(service): State<WorkflowService>,
    payload: Result<Json<CreateDefinitionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WorkflowDefinition>)> {
    let request = json_body("create definition", payload)?;
    info!("📥 POST /api/workflows name='{}'", request.name);

    let definition = service
        .create_definition(request)
        .await
        .map_err(|e| into_api_error("create definition", e))?;

    Ok((StatusCode::CREATED, Json(definition)))
}

/// GET /api/workflows
pub async fn list_definitions(
    State(service): State<WorkflowService>,
) -> ApiResult<Json<Vec<WorkflowDefinition>>> {
    let definitions = service
        .list_definitions()
        .await
        .map_err(|e| into_api_error("list definitions", e))?;
    Ok(Json(definitions))
}

/// GET /api/workflows/:id
pub async fn get_definition(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowDefinition>> {
    service
        .get_definition(&id)
        .await
        .map_err(|e| into_api_error("get definition", e))?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found(format!("workflow definition '{}' not found", id)))
}

/// GET /api/workflows/:id/instances
pub async fn list_definition_instances(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<WorkflowInstance>>> {
    match service.list_instances_for_definition(&id).await {
        Ok(instances) => Ok(Json(instances)),
        Err(e @ WorkflowError::Validation(_)) => {
            let exists = service
                .get_definition(&id)
                .await
                .map_err(|e| into_api_error("get definition", e))?
                .is_some();
            if exists {
                Err(into_api_error("list definition instances", e))
            } else {
                Err(ErrorResponse::not_found(format!(
                    "workflow definition '{}' not found",
                    id
                )))
            }
        }
        Err(e) => Err(into_api_error("list definition instances", e)),
    }
}

/// POST /api/instances
pub async fn create_instance(
    State(service): State<WorkflowService>,
    payload: Result<Json<CreateInstanceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WorkflowInstance>)> {
    let request = json_body("create instance", payload)?;
    info!("📥 POST /api/instances definitionId={}", request.definition_id);

    let instance = service
        .create_instance(&request.definition_id)
        .await
        .map_err(|e| into_api_error("create instance", e))?;

    Ok((StatusCode::CREATED, Json(instance)))
}

/// GET /api/instances
pub async fn list_instances(
    State(service): State<WorkflowService>,
) -> ApiResult<Json<Vec<WorkflowInstance>>> {
    let instances = service
        .list_instances()
        .await
        .map_err(|e| into_api_error("list instances", e))?;
    Ok(Json(instances))
}

/// GET /api/instances/:id
pub async fn get_instance(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowInstance>> {
    service
        .get_instance(&id)
        .await
        .map_err(|e| into_api_error("get instance", e))?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found(format!("workflow instance '{}' not found", id)))
}

/// GET /api/instances/:id/actions
///
/// The instance is only looked up a second time when the service rejects
/// the call, to tell an unknown id (404) from a broken definition (400).
pub async fn available_actions(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Action>>> {
    match service.available_actions(&id).await {
        Ok(actions) => Ok(Json(actions)),
        Err(e @ WorkflowError::Validation(_)) => {
            let exists = service
                .get_instance(&id)
                .await
                .map_err(|e| into_api_error("get instance", e))?
                .is_some();
            if exists {
                Err(into_api_error("available actions", e))
            } else {
                Err(ErrorResponse::not_found(format!(
                    "workflow instance '{}' not found",
                    id
                )))
            }
        }
        Err(e) => Err(into_api_error("available actions", e)),
    }
}

/// POST /api/instances/:id/actions/:action_id
pub async fn execute_action(
    State(service): State<WorkflowService>,
    Path((id, action_id)): Path<(String, String)>,
) -> ApiResult<Json<WorkflowInstance>> {
    run_action(&service, &id, action_id).await
}

/// POST /api/instances/:id/execute with `{"actionId": "..."}`
pub async fn execute_action_body(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
    payload: Result<Json<ExecuteActionRequest>, JsonRejection>,
) -> ApiResult<Json<WorkflowInstance>> {
    let request = json_body("execute action", payload)?;
    run_action(&service, &id, request.action_id).await
}

async fn run_action(
    service: &WorkflowService,
    instance_id: &str,
    action_id: String,
) -> ApiResult<Json<WorkflowInstance>> {
    info!("📥 execute '{}' on instance {}", action_id, instance_id);

    let instance = service
        .execute_action(instance_id, &ActionId::from(action_id))
        .await
        .map_err(|e| into_api_error("execute action", e))?;
    Ok(Json(instance))
}

/// Fallback for unknown routes
pub async fn not_found() -> ErrorResponse {
    ErrorResponse::not_found("route not found".to_string())
}
