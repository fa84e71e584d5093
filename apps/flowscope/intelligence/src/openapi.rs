use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "FlowScope Intelligence",
        version = "0.1.0",
        description = "LLM-powered analysis of FlowScope data transfer, cost and anomaly summaries"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Full API document: shared metadata plus the intelligence endpoints
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_intelligence::handlers::ApiDoc::openapi());
        doc
    }
}
