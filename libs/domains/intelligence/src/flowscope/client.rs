use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::{FlowDataSource, FlowScopeConfig};
use crate::error::IntelligenceResult;
use crate::models::{AnomalySummary, CostSummary, FlowSummary, GraphStats};

/// HTTP client for the FlowScope API.
///
/// Holds one connection pool for the life of the process; share it by
/// reference or `Arc` rather than constructing per request.
#[derive(Debug, Clone)]
pub struct FlowScopeClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ServiceGraph {
    #[serde(default)]
    edges: Option<Vec<serde_json::Value>>,
}

impl FlowScopeClient {
    pub fn new(config: FlowScopeConfig) -> IntelligenceResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> IntelligenceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET FlowScope");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    /// GET and decode, logging and swallowing any failure.
    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        id: Option<&str>,
        path: &str,
        query: &[(&str, String)],
    ) -> Option<T> {
        match self.get_json(path, query).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(resource, id, error = %e, "Failed to fetch {} from FlowScope", resource);
                None
            }
        }
    }
}

#[async_trait]
impl FlowDataSource for FlowScopeClient {
    async fn graph_stats(&self) -> Option<GraphStats> {
        self.fetch("graph_stats", None, "/api/v1/graph/stats", &[])
            .await
    }

    async fn cost_summary(&self) -> Option<CostSummary> {
        self.fetch("cost_summary", None, "/api/v1/costs/summary", &[])
            .await
    }

    async fn top_flows(&self, n: usize) -> Vec<FlowSummary> {
        self.fetch("top_flows", None, "/api/v1/graph/top-edges", &[("n", n.to_string())])
            .await
            .unwrap_or_default()
    }

    async fn active_anomalies(&self) -> Vec<AnomalySummary> {
        self.fetch::<Option<Vec<AnomalySummary>>>(
            "active_anomalies",
            None,
            "/api/v1/anomalies/active",
            &[],
        )
        .await
        .flatten()
        .unwrap_or_default()
    }

    async fn anomaly(&self, id: &str) -> Option<AnomalySummary> {
        let path = format!("/api/v1/anomalies/{}", urlencoding::encode(id));
        self.fetch("anomaly", Some(id), &path, &[]).await
    }

    async fn related_flows(&self, service: &str) -> Vec<serde_json::Value> {
        let path = format!("/api/v1/graph/service/{}", urlencoding::encode(service));
        self.fetch::<ServiceGraph>(
            "related_flows",
            Some(service),
            &path,
            &[("depth", "1".to_string())],
        )
        .await
        .and_then(|graph| graph.edges)
        .unwrap_or_default()
    }

    async fn baseline(&self, flow_key: &str) -> Option<serde_json::Value> {
        let path = format!("/api/v1/baselines/{}", urlencoding::encode(flow_key));
        self.fetch("baseline", Some(flow_key), &path, &[]).await
    }
}
