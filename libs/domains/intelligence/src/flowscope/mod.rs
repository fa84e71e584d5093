//! Read-only access to the FlowScope analytics API.

mod client;

pub use client::FlowScopeClient;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};
use std::time::Duration;

use crate::models::{AnomalySummary, CostSummary, FlowSummary, GraphStats};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of flow, cost and anomaly summaries.
///
/// Implementations absorb their own failures: an unreachable or misbehaving
/// upstream yields `None` or an empty list, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlowDataSource: Send + Sync {
    async fn graph_stats(&self) -> Option<GraphStats>;

    async fn cost_summary(&self) -> Option<CostSummary>;

    /// Top `n` flows by volume
    async fn top_flows(&self, n: usize) -> Vec<FlowSummary>;

    async fn active_anomalies(&self) -> Vec<AnomalySummary>;

    async fn anomaly(&self, id: &str) -> Option<AnomalySummary>;

    /// Graph edges touching `service`, one hop deep
    async fn related_flows(&self, service: &str) -> Vec<serde_json::Value>;

    /// Baseline statistics for a `"{source}|{destination}"` flow key
    async fn baseline(&self, flow_key: &str) -> Option<serde_json::Value>;
}

/// FlowScope API connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct FlowScopeConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl FlowScopeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FlowScopeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl FromEnv for FlowScopeConfig {
    /// - `FLOWSCOPE_API_URL` (default `http://localhost:8080`)
    /// - `FLOWSCOPE_API_TIMEOUT_SECS` (default 30)
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default("FLOWSCOPE_API_URL", DEFAULT_API_URL);
        let timeout_secs = env_parse_or_default("FLOWSCOPE_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }
}
