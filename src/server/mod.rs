use crate::core::dataset::Dataset;
use crate::core::schema::{ColumnDefinition, TableSet};
use crate::core::value::Row;
use crate::engine::{Sandbox, SandboxError};
use crate::query::QueryResult;
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use toon_format::encode_default;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

struct AppState {
    sandbox: Arc<Sandbox>,
    timeout: Duration,
}

#[derive(Deserialize, utoipa::IntoParams)]
struct FormatParams {
    /// Format of the output: 'json' (default) or 'toon'
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ParseRequest {
    migration_text: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct QueryRequest {
    query: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    table_data: Dataset,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SaveRequest {
    table: String,
    #[schema(value_type = Vec<Object>)]
    data: Vec<Row>,
    #[schema(value_type = Vec<Object>)]
    table_structure: Vec<ColumnDefinition>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    tables: Option<TableSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    result: Option<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    processed_data: Option<Vec<Row>>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            tables: None,
            result: None,
            processed_data: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::ok()
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        parse_migrations,
        execute_query,
        save_table_data,
        health_check
    ),
    components(
        schemas(ParseRequest, QueryRequest, SaveRequest, ApiResponse)
    ),
    tags(
        (name = "tablesim", description = "Schema parser and query sandbox API")
    )
)]
struct ApiDoc;

/// Router with every route, sharing one [`Sandbox`].
pub fn router(sandbox: Arc<Sandbox>) -> Router {
    let server = &sandbox.config().server;
    let max_bytes = server.max_request_bytes;
    let timeout = Duration::from_secs(server.timeout_secs);
    let state = Arc::new(AppState { sandbox, timeout });

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .route("/api/parse-migrations", post(parse_migrations))
        .route("/api/execute-query", post(execute_query))
        .route("/api/save-table-data", post(save_table_data))
        .layer(DefaultBodyLimit::max(max_bytes))
        .with_state(state)
}

pub async fn start_server(sandbox: Arc<Sandbox>, port: u16) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running at http://{}", addr);
    serve(listener, sandbox).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, sandbox: Arc<Sandbox>) -> std::io::Result<()> {
    axum::serve(listener, router(sandbox)).await
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check", body = String)
    )
)]
async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

#[utoipa::path(
    post,
    path = "/api/parse-migrations",
    request_body = ParseRequest,
    params(FormatParams),
    responses(
        (status = 200, description = "Parsed tables", body = ApiResponse),
        (status = 400, description = "Malformed request", body = ApiResponse)
    )
)]
async fn parse_migrations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    body: String,
) -> Response {
    let outcome = run_blocking(&state, move |sandbox| {
        let request: ParseRequest = decode(&body)?;
        Ok(ApiResponse {
            tables: Some(sandbox.parse_schema(&request.migration_text)),
            ..ApiResponse::ok()
        })
    })
    .await;
    respond(outcome, &params.format)
}

#[utoipa::path(
    post,
    path = "/api/execute-query",
    request_body = QueryRequest,
    params(FormatParams),
    responses(
        (status = 200, description = "Query result", body = ApiResponse),
        (status = 400, description = "Malformed request", body = ApiResponse)
    )
)]
async fn execute_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    body: String,
) -> Response {
    let outcome = run_blocking(&state, move |sandbox| {
        let request: QueryRequest = decode(&body)?;
        Ok(ApiResponse {
            result: Some(sandbox.interpret(&request.query, &request.table_data)),
            ..ApiResponse::ok()
        })
    })
    .await;
    respond(outcome, &params.format)
}

#[utoipa::path(
    post,
    path = "/api/save-table-data",
    request_body = SaveRequest,
    params(FormatParams),
    responses(
        (status = 200, description = "Rows after autofill", body = ApiResponse),
        (status = 400, description = "Validation failed or malformed request", body = ApiResponse)
    )
)]
async fn save_table_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    body: String,
) -> Response {
    let outcome = run_blocking(&state, move |sandbox| {
        let request: SaveRequest = decode(&body)?;
        let processed = sandbox.process(&request.data, &request.table_structure)?;
        Ok(ApiResponse {
            message: Some(format!("Data saved for table '{}'", request.table)),
            processed_data: Some(processed),
            ..ApiResponse::ok()
        })
    })
    .await;
    respond(outcome, &params.format)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SandboxError> {
    Ok(serde_json::from_str(body)?)
}

/// Run a core call on the blocking pool under the configured timeout.
async fn run_blocking<F>(state: &AppState, f: F) -> Result<ApiResponse, String>
where
    F: FnOnce(&Sandbox) -> Result<ApiResponse, SandboxError> + Send + 'static,
{
    let sandbox = state.sandbox.clone();
    let exec_result = tokio::time::timeout(
        state.timeout,
        tokio::task::spawn_blocking(move || f(sandbox.as_ref())),
    )
    .await;

    match exec_result {
        Ok(Ok(Ok(response))) => Ok(response),
        Ok(Ok(Err(SandboxError::Validation(e)))) => {
            tracing::warn!("rejected rows: {}", e);
            Err(e.errors_json())
        }
        Ok(Ok(Err(e))) => Err(e.to_string()),
        Ok(Err(e)) => Err(format!("Execution task panicked: {}", e)),
        Err(_) => Err(format!("Request timed out after {}s", state.timeout.as_secs())),
    }
}

fn respond(outcome: Result<ApiResponse, String>, format: &str) -> Response {
    let (status, response) = match outcome {
        Ok(response) => (StatusCode::OK, response),
        Err(message) => (StatusCode::BAD_REQUEST, ApiResponse::error(message)),
    };

    match format {
        "toon" => {
            let body = encode_default(&response)
                .unwrap_or_else(|e| format!("success: false\nmessage: Serialization failed: {}", e));
            (status, [(header::CONTENT_TYPE, "text/toon")], body).into_response()
        }
        _ => (status, Json(response)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(ApiResponse::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "boom"}));
    }

    #[test]
    fn test_missing_table_data_defaults_to_empty() {
        let request: QueryRequest = decode(r#"{"query": "Product::all()"}"#).unwrap();
        assert!(request.table_data.is_empty());
    }
}
