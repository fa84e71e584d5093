//! Prompt text for each kind of request.
//!
//! All builders are pure: the same input always renders the same text.

use serde::Serialize;

use crate::error::IntelligenceResult;
use crate::models::{AnalysisContext, AnomalySummary, CostSummary, FlowSummary};

pub const SYSTEM_PROMPT: &str = "\
You are FlowScope's AI assistant. You analyze data transfer patterns and costs in Kubernetes environments.

Your job:
1. Explain transfer patterns and anomalies in plain language
2. Identify cost optimization opportunities
3. Help investigate unexpected traffic or cost increases
4. Give actionable recommendations

When analyzing data:
- Focus on practical insights SREs and platform engineers can act on
- Call out security concerns such as unexpected external endpoints or possible data exfiltration
- Quantify cost impact where possible
- Be concise but thorough

You only ever receive pre-aggregated summaries from FlowScope, never raw traffic.
Structure every response with clear sections for summary, findings, cost insights, recommendations and risk.";

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Flows listed in the analysis prompt
pub const ANALYSIS_FLOW_LIMIT: usize = 10;
/// Anomalies listed in the analysis prompt
pub const ANALYSIS_ANOMALY_LIMIT: usize = 5;

/// Binary-unit size with one decimal, e.g. `1536` → `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, BYTE_UNITS[unit])
}

fn flow_line(flow: &FlowSummary) -> String {
    format!(
        "- {} → {}: {} (${:.2})",
        flow.source,
        flow.destination,
        format_bytes(flow.total_bytes),
        flow.cost_usd
    )
}

fn anomaly_line(anomaly: &AnomalySummary) -> String {
    format!(
        "- [{}] {}: {} → {} (+{:.1}σ, ${:.2} impact)",
        anomaly.severity.to_uppercase(),
        anomaly.anomaly_type,
        anomaly.source_service,
        anomaly.destination_or_external(),
        anomaly.deviation,
        anomaly.cost_impact_usd
    )
}

/// General state-of-the-cluster analysis.
pub fn analysis_prompt(ctx: &AnalysisContext) -> String {
    let mut sections = Vec::new();

    if let Some(stats) = &ctx.graph_stats {
        sections.push(format!(
            "**Transfer Graph Stats:**\n\
             - Total services: {}\n\
             - External endpoints: {}\n\
             - Total connections: {}\n\
             - Total transfer: {}\n\
             - Egress traffic: {}\n\
             - Cross-region: {}",
            stats.total_nodes,
            stats.total_external_nodes,
            stats.total_edges,
            format_bytes(stats.total_bytes),
            format_bytes(stats.egress_bytes),
            format_bytes(stats.cross_region_bytes),
        ));
    }

    if let Some(costs) = &ctx.cost_summary {
        sections.push(format!(
            "**Cost Summary (last {}h):**\n\
             - Total: ${:.2}\n\
             - Egress: ${:.2}\n\
             - Cross-region: ${:.2}\n\
             - Cross-AZ: ${:.2}",
            ctx.time_range_hours,
            costs.total_cost_usd,
            costs.egress_cost_usd,
            costs.cross_region_cost_usd,
            costs.cross_az_cost_usd,
        ));
    }

    if !ctx.top_flows.is_empty() {
        let flows: Vec<String> = ctx
            .top_flows
            .iter()
            .take(ANALYSIS_FLOW_LIMIT)
            .map(flow_line)
            .collect();
        sections.push(format!("**Top Flows:**\n{}", flows.join("\n")));
    }

    if !ctx.active_anomalies.is_empty() {
        let anomalies: Vec<String> = ctx
            .active_anomalies
            .iter()
            .take(ANALYSIS_ANOMALY_LIMIT)
            .map(anomaly_line)
            .collect();
        sections.push(format!("**Active Anomalies:**\n{}", anomalies.join("\n")));
    }

    format!(
        "Analyze the following FlowScope data and provide insights:\n\n\
         {}\n\n\
         Please provide:\n\
         1. A brief summary of the current state\n\
         2. Key findings (3-5 bullet points)\n\
         3. Cost insights and optimization opportunities\n\
         4. Specific recommendations\n\
         5. Risk assessment",
        sections.join("\n\n")
    )
}

/// Deep dive into one anomaly.
pub fn investigation_prompt(
    anomaly: &AnomalySummary,
    related_flows: &[serde_json::Value],
    baseline: Option<&serde_json::Value>,
) -> IntelligenceResult<String> {
    let related = serde_json::to_string_pretty(related_flows)?;
    let baseline = match baseline {
        Some(value) => serde_json::to_string_pretty(value)?,
        None => "No baseline available".to_string(),
    };

    Ok(format!(
        "Investigate this data transfer anomaly:\n\n\
         **Anomaly Details:**\n\
         - Type: {}\n\
         - Severity: {}\n\
         - Source: {}\n\
         - Destination: {}\n\
         - Current value: {}/hour\n\
         - Baseline: {}/hour\n\
         - Deviation: {:.1} standard deviations\n\
         - Estimated cost impact: ${:.2}\n\
         - Detected: {}\n\n\
         **Related Flows:**\n{}\n\n\
         **Baseline Statistics:**\n{}\n\n\
         Please provide:\n\
         1. Root cause analysis - what likely caused this anomaly?\n\
         2. Impact assessment - what are the cost and operational implications?\n\
         3. Immediate actions - what should be done right now?\n\
         4. Long-term recommendations - how to prevent this in the future?",
        anomaly.anomaly_type,
        anomaly.severity,
        anomaly.source_service,
        anomaly.destination_or_external(),
        format_bytes(anomaly.current_value.max(0.0) as u64),
        format_bytes(anomaly.baseline_value.max(0.0) as u64),
        anomaly.deviation,
        anomaly.cost_impact_usd,
        anomaly.detected_at.to_rfc3339(),
        related,
        baseline,
    ))
}

/// Per-service line of a cost comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCostChange {
    pub service: String,
    pub current_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

/// Current vs previous period costs.
#[derive(Debug, Clone, PartialEq)]
pub struct CostChange {
    pub current_period_hours: u32,
    pub comparison_period_hours: u32,
    pub current_cost: f64,
    /// `None` when the caller has no previous-period figure
    pub previous_cost: Option<f64>,
    pub top_services: Vec<ServiceCostChange>,
}

/// Explain a change in transfer cost.
pub fn cost_change_prompt(change: &CostChange) -> IntelligenceResult<String> {
    let summary = match change.previous_cost {
        Some(previous) => {
            let delta = change.current_cost - previous;
            let percent = if previous > 0.0 {
                delta / previous * 100.0
            } else {
                0.0
            };
            format!(
                "- Previous period ({}h): ${:.2}\n\
                 - Current period ({}h): ${:.2}\n\
                 - Change: ${:+.2} ({:+.1}%)",
                change.comparison_period_hours,
                previous,
                change.current_period_hours,
                change.current_cost,
                delta,
                percent
            )
        }
        None => format!(
            "- Current period ({}h): ${:.2}\n\
             - Previous period: no comparison data available",
            change.current_period_hours, change.current_cost
        ),
    };

    Ok(format!(
        "Explain this data transfer cost change and provide optimization advice:\n\n\
         **Cost Summary:**\n{}\n\n\
         **Top Changes by Service:**\n{}\n\n\
         Please explain:\n\
         1. Why did costs change?\n\
         2. Which services/transfers are responsible?\n\
         3. Are these costs justified or wasteful?\n\
         4. Specific steps to reduce costs",
        summary,
        serde_json::to_string_pretty(&change.top_services)?,
    ))
}

/// Free-text question answered against the current context.
pub fn question_prompt(question: &str, ctx: &AnalysisContext) -> IntelligenceResult<String> {
    Ok(format!(
        "Given this FlowScope data:\n\n\
         {}\n\n\
         Answer this question: {}\n\n\
         Provide a clear, actionable answer based on the data.",
        serde_json::to_string_pretty(ctx)?,
        question
    ))
}

/// Ask for optimizations as a JSON array.
pub fn optimization_prompt(
    cost_summary: &CostSummary,
    top_flows: &[FlowSummary],
) -> IntelligenceResult<String> {
    Ok(format!(
        "Analyze these data transfer patterns and suggest optimizations:\n\n\
         **Cost Summary:**\n{}\n\n\
         **Top Flows:**\n{}\n\n\
         For each suggestion, provide:\n\
         1. Description of the optimization\n\
         2. Estimated monthly savings (in USD)\n\
         3. Implementation difficulty (low/medium/high)\n\
         4. Specific steps to implement\n\
         5. Affected services\n\n\
         Format your response as a JSON array of objects with the keys \
         \"description\", \"estimated_monthly_savings_usd\", \"difficulty\", \
         \"steps\" and \"affected_services\".",
        serde_json::to_string_pretty(cost_summary)?,
        serde_json::to_string_pretty(top_flows)?,
    ))
}
