use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Longest accepted look-back window (30 days).
pub const MAX_HOURS: u32 = 720;

const fn default_hours() -> u32 {
    24
}

const fn default_true() -> bool {
    true
}

// ============================================================================
// Upstream summaries (FlowScope API)
// ============================================================================

/// Transfer graph statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GraphStats {
    pub total_nodes: u64,
    pub total_external_nodes: u64,
    pub total_edges: u64,
    pub total_bytes: u64,
    pub egress_bytes: u64,
    pub cross_region_bytes: u64,
}

/// Cost summary for the current period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostSummary {
    pub total_cost_usd: f64,
    pub egress_cost_usd: f64,
    pub cross_region_cost_usd: f64,
    pub cross_az_cost_usd: f64,
    pub total_bytes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_namespace: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_service: BTreeMap<String, f64>,
}

impl CostSummary {
    /// Services ordered by descending cost, ties broken by name.
    pub fn top_services(&self, n: usize) -> Vec<(&str, f64)> {
        let mut services: Vec<(&str, f64)> = self
            .by_service
            .iter()
            .map(|(name, cost)| (name.as_str(), *cost))
            .collect();
        services.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        services.truncate(n);
        services
    }
}

/// A single source → destination transfer flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowSummary {
    pub source: String,
    #[serde(alias = "target")]
    pub destination: String,
    pub transfer_type: String,
    pub total_bytes: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

/// An anomaly detected by FlowScope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnomalySummary {
    pub id: String,
    #[serde(rename = "type")]
    pub anomaly_type: String,
    pub severity: String,
    pub source_service: String,
    #[serde(default)]
    pub destination_service: Option<String>,
    pub current_value: f64,
    pub baseline_value: f64,
    pub deviation: f64,
    pub cost_impact_usd: f64,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub ai_summary: Option<String>,
}

impl AnomalySummary {
    /// Destination name, or `external` for egress to unknown endpoints.
    pub fn destination_or_external(&self) -> &str {
        self.destination_service.as_deref().unwrap_or("external")
    }

    /// Key used by the baselines endpoint: `"{source}|{destination_or_external}"`.
    pub fn flow_key(&self) -> String {
        format!("{}|{}", self.source_service, self.destination_or_external())
    }
}

/// Everything the analysis and question prompts are built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisContext {
    pub graph_stats: Option<GraphStats>,
    pub cost_summary: Option<CostSummary>,
    pub top_flows: Vec<FlowSummary>,
    pub active_anomalies: Vec<AnomalySummary>,
    pub time_range_hours: u32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Results
// ============================================================================

/// Sectioned view of a free-text completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ParsedAnalysis {
    /// Summary section, or the whole reply when no section was recognised
    pub summary: String,
    pub key_findings: Vec<String>,
    pub cost_insights: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
    /// Unmodified completion text
    pub raw_response: String,
}

/// Implementation effort of an optimization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

/// A cost optimization suggested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct OptimizationSuggestion {
    pub description: String,
    pub estimated_monthly_savings_usd: f64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub affected_services: Vec<String>,
}

impl OptimizationSuggestion {
    /// Wraps free text that could not be decoded as structured suggestions.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            description: text.into(),
            estimated_monthly_savings_usd: 0.0,
            difficulty: Difficulty::Medium,
            steps: Vec::new(),
            affected_services: Vec::new(),
        }
    }
}

/// Answer to a free-text question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Readiness probe body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
}

// ============================================================================
// Requests
// ============================================================================

/// Query for the general analysis endpoint
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyzeQuery {
    /// Look-back window in hours
    #[serde(default = "default_hours")]
    #[validate(range(min = 1, max = MAX_HOURS))]
    #[param(default = 24, minimum = 1, maximum = 720)]
    pub time_range_hours: u32,
}

impl Default for AnalyzeQuery {
    fn default() -> Self {
        Self {
            time_range_hours: default_hours(),
        }
    }
}

/// Investigate a single anomaly
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct InvestigationRequest {
    #[validate(length(min = 1, max = 256))]
    pub anomaly_id: String,
    #[serde(default = "default_true")]
    pub include_related_flows: bool,
    #[serde(default = "default_true")]
    pub include_baseline: bool,
}

impl InvestigationRequest {
    pub fn new(anomaly_id: impl Into<String>) -> Self {
        Self {
            anomaly_id: anomaly_id.into(),
            include_related_flows: true,
            include_baseline: true,
        }
    }
}

/// Explain the cost of the current period, optionally against a previous one
///
/// Previous-period figures are supplied by the caller; without them the
/// explanation covers the current period only.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct CostExplainRequest {
    #[serde(default = "default_hours")]
    #[validate(range(min = 1, max = MAX_HOURS))]
    pub current_period_hours: u32,
    #[serde(default = "default_hours")]
    #[validate(range(min = 1, max = MAX_HOURS))]
    pub comparison_period_hours: u32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub previous_total_cost_usd: Option<f64>,
    #[serde(default)]
    pub previous_by_service: Option<BTreeMap<String, f64>>,
}

impl Default for CostExplainRequest {
    fn default() -> Self {
        Self {
            current_period_hours: default_hours(),
            comparison_period_hours: default_hours(),
            previous_total_cost_usd: None,
            previous_by_service: None,
        }
    }
}

/// Free-text question about the current FlowScope data
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
    #[serde(default = "default_hours")]
    #[validate(range(min = 1, max = MAX_HOURS))]
    pub context_hours: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn anomaly(destination: Option<&str>) -> AnomalySummary {
        serde_json::from_value(json!({
            "id": "a-1",
            "type": "volume_spike",
            "severity": "high",
            "source_service": "payments/api",
            "destination_service": destination,
            "current_value": 2048.0,
            "baseline_value": 1024.0,
            "deviation": 4.2,
            "cost_impact_usd": 12.5,
            "detected_at": "2026-10-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_flow_key_uses_external_without_destination() {
        assert_eq!(anomaly(None).flow_key(), "payments/api|external");
        assert_eq!(anomaly(Some("db/postgres")).flow_key(), "payments/api|db/postgres");
    }

    #[test]
    fn test_anomaly_type_field_is_named_type_on_the_wire() {
        let value = serde_json::to_value(anomaly(None)).unwrap();
        assert_eq!(value["type"], "volume_spike");
        assert!(value.get("anomaly_type").is_none());
    }

    #[test]
    fn test_flow_summary_accepts_target_and_defaults_counts() {
        let flow: FlowSummary = serde_json::from_value(json!({
            "source": "a",
            "target": "b",
            "transfer_type": "cross_az",
            "total_bytes": 10
        }))
        .unwrap();
        assert_eq!(flow.destination, "b");
        assert_eq!(flow.total_events, 0);
        assert_eq!(flow.cost_usd, 0.0);
    }

    #[test]
    fn test_cost_summary_maps_default_to_empty() {
        let summary: CostSummary = serde_json::from_value(json!({
            "total_cost_usd": 1.0,
            "egress_cost_usd": 0.5,
            "cross_region_cost_usd": 0.25,
            "cross_az_cost_usd": 0.25,
            "total_bytes": 100,
            "by_service": null
        }))
        .unwrap();
        assert!(summary.by_namespace.is_empty());
        assert!(summary.by_service.is_empty());
    }

    #[test]
    fn test_top_services_sorted_by_cost() {
        let summary = CostSummary {
            total_cost_usd: 0.0,
            egress_cost_usd: 0.0,
            cross_region_cost_usd: 0.0,
            cross_az_cost_usd: 0.0,
            total_bytes: 0,
            by_namespace: BTreeMap::new(),
            by_service: BTreeMap::from([
                ("a".to_string(), 1.0),
                ("b".to_string(), 5.0),
                ("c".to_string(), 3.0),
            ]),
        };
        assert_eq!(summary.top_services(2), vec![("b", 5.0), ("c", 3.0)]);
    }

    #[test]
    fn test_difficulty_is_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::High).unwrap(), "\"high\"");
        assert_eq!("low".parse::<Difficulty>().unwrap(), Difficulty::Low);
        assert!(serde_json::from_str::<Difficulty>("\"extreme\"").is_err());
    }

    #[test]
    fn test_difficulty_accepts_capitalised_input() {
        assert_eq!(serde_json::from_str::<Difficulty>("\"Low\"").unwrap(), Difficulty::Low);
        assert_eq!(serde_json::from_str::<Difficulty>("\"MEDIUM\"").unwrap(), Difficulty::Medium);
        assert_eq!("High".parse::<Difficulty>().unwrap(), Difficulty::High);
        assert_eq!(serde_json::to_string(&Difficulty::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_request_defaults() {
        let req: InvestigationRequest =
            serde_json::from_value(json!({ "anomaly_id": "a-1" })).unwrap();
        assert!(req.include_related_flows);
        assert!(req.include_baseline);

        let q: QuestionRequest = serde_json::from_value(json!({ "question": "why?" })).unwrap();
        assert_eq!(q.context_hours, 24);

        let c: CostExplainRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(c.current_period_hours, 24);
        assert!(c.previous_total_cost_usd.is_none());
    }

    #[test]
    fn test_request_validation_bounds() {
        let q = QuestionRequest {
            question: String::new(),
            context_hours: 24,
        };
        assert!(q.validate().is_err());

        let a = AnalyzeQuery {
            time_range_hours: MAX_HOURS + 1,
        };
        assert!(a.validate().is_err());
        assert!(AnalyzeQuery::default().validate().is_ok());
    }
}
