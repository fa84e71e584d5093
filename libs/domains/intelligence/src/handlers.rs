use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AppError, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::completion::CompletionProvider;
use crate::flowscope::FlowDataSource;
use crate::models::{
    AnalyzeQuery, AnswerResponse, CostExplainRequest, Difficulty, InvestigationRequest,
    OptimizationSuggestion, ParsedAnalysis, QuestionRequest, ReadyResponse,
};
use crate::service::IntelligenceService;

const TAG: &str = "Intelligence";

/// OpenAPI documentation for the Intelligence API
#[derive(OpenApi)]
#[openapi(
    paths(analyze, investigate, explain_cost, ask, optimizations),
    components(
        schemas(
            ParsedAnalysis,
            OptimizationSuggestion,
            Difficulty,
            InvestigationRequest,
            CostExplainRequest,
            QuestionRequest,
            AnswerResponse
        ),
        responses(
            BadRequestValidationResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "LLM analysis of FlowScope transfer and cost data")
    )
)]
pub struct ApiDoc;

type SharedService<D, C> = Arc<IntelligenceService<D, C>>;

/// API routes, to be nested under `/api`
pub fn router<D, C>(service: IntelligenceService<D, C>) -> Router
where
    D: FlowDataSource + 'static,
    C: CompletionProvider + 'static,
{
    Router::new()
        .route("/analyze", post(analyze))
        .route("/investigate", post(investigate))
        .route("/explain-cost", post(explain_cost))
        .route("/ask", post(ask))
        .route("/optimizations", get(optimizations))
        .with_state(Arc::new(service))
}

/// Root-level `/ready` probe
pub fn ready_router<D, C>(service: IntelligenceService<D, C>) -> Router
where
    D: FlowDataSource + 'static,
    C: CompletionProvider + 'static,
{
    Router::new()
        .route("/ready", get(ready))
        .with_state(Arc::new(service))
}

/// General analysis of the current FlowScope state
#[utoipa::path(
    post,
    path = "/analyze",
    tag = TAG,
    params(AnalyzeQuery),
    responses(
        (status = 200, description = "Sectioned analysis", body = ParsedAnalysis),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn analyze<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
    ValidatedQuery(query): ValidatedQuery<AnalyzeQuery>,
) -> Result<Json<ParsedAnalysis>, AppError> {
    service
        .analyze(query.time_range_hours)
        .await
        .map(Json)
        .map_err(|e| e.into_app_error("analysis", "Analysis failed"))
}

/// Investigate a single anomaly
#[utoipa::path(
    post,
    path = "/investigate",
    tag = TAG,
    request_body = InvestigationRequest,
    responses(
        (status = 200, description = "Investigation result", body = ParsedAnalysis),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn investigate<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
    ValidatedJson(request): ValidatedJson<InvestigationRequest>,
) -> Result<Json<ParsedAnalysis>, AppError> {
    service
        .investigate(request)
        .await
        .map(Json)
        .map_err(|e| e.into_app_error("investigation", "Investigation failed"))
}

/// Explain current transfer cost, optionally against a previous period
#[utoipa::path(
    post,
    path = "/explain-cost",
    tag = TAG,
    request_body = CostExplainRequest,
    responses(
        (status = 200, description = "Cost explanation", body = ParsedAnalysis),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn explain_cost<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
    ValidatedJson(request): ValidatedJson<CostExplainRequest>,
) -> Result<Json<ParsedAnalysis>, AppError> {
    service
        .explain_cost(request)
        .await
        .map(Json)
        .map_err(|e| e.into_app_error("cost_explanation", "Cost explanation failed"))
}

/// Answer a free-text question about the current data
#[utoipa::path(
    post,
    path = "/ask",
    tag = TAG,
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Answer text", body = AnswerResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn ask<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
    ValidatedJson(request): ValidatedJson<QuestionRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    service
        .ask(request)
        .await
        .map(|answer| Json(AnswerResponse { answer }))
        .map_err(|e| e.into_app_error("question", "Failed to answer question"))
}

/// Cost optimization suggestions
#[utoipa::path(
    get,
    path = "/optimizations",
    tag = TAG,
    responses(
        (status = 200, description = "Suggestions, empty when cost data is unavailable", body = Vec<OptimizationSuggestion>),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn optimizations<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
) -> Result<Json<Vec<OptimizationSuggestion>>, AppError> {
    service
        .optimizations()
        .await
        .map(Json)
        .map_err(|e| e.into_app_error("optimization", "Failed to generate optimizations"))
}

/// 200 once a completion API key is configured, 503 before
async fn ready<D: FlowDataSource, C: CompletionProvider>(
    State(service): State<SharedService<D, C>>,
) -> Response {
    if service.is_ready() {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
            }),
        )
            .into_response()
    } else {
        AppError::ServiceUnavailable("Claude API key not configured".to_string()).into_response()
    }
}
