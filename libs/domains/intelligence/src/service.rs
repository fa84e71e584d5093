use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::completion::CompletionProvider;
use crate::error::{IntelligenceError, IntelligenceResult};
use crate::flowscope::FlowDataSource;
use crate::models::{
    AnalysisContext, CostExplainRequest, InvestigationRequest, MAX_HOURS, OptimizationSuggestion,
    ParsedAnalysis, QuestionRequest,
};
use crate::parser::{parse, parse_optimizations};
use crate::prompts::{
    CostChange, SYSTEM_PROMPT, ServiceCostChange, analysis_prompt, cost_change_prompt,
    investigation_prompt, optimization_prompt, question_prompt,
};

/// Flows fetched for the analysis and question context
pub const CONTEXT_FLOW_COUNT: usize = 10;
/// Flows fetched when asking for optimizations
pub const OPTIMIZATION_FLOW_COUNT: usize = 20;
/// Services listed in a cost explanation
pub const COST_CHANGE_SERVICE_COUNT: usize = 5;

/// Orchestrates fetch → prompt → completion → parse.
///
/// Both collaborators are injected once at start-up and shared across
/// requests; no request state is kept here.
pub struct IntelligenceService<D: FlowDataSource, C: CompletionProvider> {
    data: Arc<D>,
    completion: Arc<C>,
}

impl<D: FlowDataSource, C: CompletionProvider> Clone for IntelligenceService<D, C> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            completion: Arc::clone(&self.completion),
        }
    }
}

impl<D: FlowDataSource, C: CompletionProvider> IntelligenceService<D, C> {
    pub fn new(data: D, completion: C) -> Self {
        Self {
            data: Arc::new(data),
            completion: Arc::new(completion),
        }
    }

    /// Completion credentials are present.
    pub fn is_ready(&self) -> bool {
        self.completion.is_configured()
    }

    fn ensure_configured(&self) -> IntelligenceResult<()> {
        if self.completion.is_configured() {
            Ok(())
        } else {
            Err(IntelligenceError::NotConfigured(
                "ANTHROPIC_API_KEY not configured".to_string(),
            ))
        }
    }

    fn validate_hours(hours: u32) -> IntelligenceResult<()> {
        if (1..=MAX_HOURS).contains(&hours) {
            Ok(())
        } else {
            Err(IntelligenceError::InvalidInput(format!(
                "time range must be between 1 and {} hours, got {}",
                MAX_HOURS, hours
            )))
        }
    }

    async fn complete(&self, prompt: &str) -> IntelligenceResult<String> {
        self.completion.complete(SYSTEM_PROMPT, prompt).await
    }

    /// Fetch stats, costs, top flows and active anomalies, one after another.
    #[instrument(skip(self))]
    pub async fn build_analysis_context(&self, time_range_hours: u32) -> AnalysisContext {
        let graph_stats = self.data.graph_stats().await;
        let cost_summary = self.data.cost_summary().await;
        let top_flows = self.data.top_flows(CONTEXT_FLOW_COUNT).await;
        let active_anomalies = self.data.active_anomalies().await;

        AnalysisContext {
            graph_stats,
            cost_summary,
            top_flows,
            active_anomalies,
            time_range_hours,
        }
    }

    #[instrument(skip(self))]
    pub async fn analyze(&self, time_range_hours: u32) -> IntelligenceResult<ParsedAnalysis> {
        Self::validate_hours(time_range_hours)?;
        self.ensure_configured()?;

        let context = self.build_analysis_context(time_range_hours).await;
        let reply = self.complete(&analysis_prompt(&context)).await?;

        Ok(parse(&reply))
    }

    #[instrument(skip(self), fields(anomaly_id = %request.anomaly_id))]
    pub async fn investigate(
        &self,
        request: InvestigationRequest,
    ) -> IntelligenceResult<ParsedAnalysis> {
        request
            .validate()
            .map_err(|e| IntelligenceError::InvalidInput(e.to_string()))?;
        self.ensure_configured()?;

        let anomaly = self
            .data
            .anomaly(&request.anomaly_id)
            .await
            .ok_or_else(|| IntelligenceError::AnomalyNotFound(request.anomaly_id.clone()))?;

        let related_flows = if request.include_related_flows {
            self.data.related_flows(&anomaly.source_service).await
        } else {
            Vec::new()
        };

        let baseline = if request.include_baseline {
            self.data.baseline(&anomaly.flow_key()).await
        } else {
            None
        };

        let prompt = investigation_prompt(&anomaly, &related_flows, baseline.as_ref())?;
        let reply = self.complete(&prompt).await?;

        Ok(parse(&reply))
    }

    /// Explain current transfer cost, against caller-supplied previous figures
    /// when present.
    #[instrument(skip(self, request))]
    pub async fn explain_cost(
        &self,
        request: CostExplainRequest,
    ) -> IntelligenceResult<ParsedAnalysis> {
        request
            .validate()
            .map_err(|e| IntelligenceError::InvalidInput(e.to_string()))?;
        self.ensure_configured()?;

        let summary = self
            .data
            .cost_summary()
            .await
            .ok_or_else(|| IntelligenceError::Internal("Failed to fetch cost data".to_string()))?;

        let top_services = summary
            .top_services(COST_CHANGE_SERVICE_COUNT)
            .into_iter()
            .map(|(service, current_cost)| {
                let previous_cost = request
                    .previous_by_service
                    .as_ref()
                    .and_then(|previous| previous.get(service).copied());
                ServiceCostChange {
                    service: service.to_string(),
                    current_cost,
                    previous_cost,
                    delta: previous_cost.map(|previous| current_cost - previous),
                }
            })
            .collect();

        if request.previous_total_cost_usd.is_none() {
            info!("No previous-period cost supplied, explaining current period only");
        }

        let change = CostChange {
            current_period_hours: request.current_period_hours,
            comparison_period_hours: request.comparison_period_hours,
            current_cost: summary.total_cost_usd,
            previous_cost: request.previous_total_cost_usd,
            top_services,
        };

        let reply = self.complete(&cost_change_prompt(&change)?).await?;

        Ok(parse(&reply))
    }

    /// Answer a question; the reply is returned as-is.
    #[instrument(skip(self, request), fields(context_hours = request.context_hours))]
    pub async fn ask(&self, request: QuestionRequest) -> IntelligenceResult<String> {
        request
            .validate()
            .map_err(|e| IntelligenceError::InvalidInput(e.to_string()))?;
        self.ensure_configured()?;

        let context = self.build_analysis_context(request.context_hours).await;
        let prompt = question_prompt(&request.question, &context)?;

        self.complete(&prompt).await
    }

    #[instrument(skip(self))]
    pub async fn optimizations(&self) -> IntelligenceResult<Vec<OptimizationSuggestion>> {
        self.ensure_configured()?;

        let Some(cost_summary) = self.data.cost_summary().await else {
            warn!("Cost summary unavailable, no optimizations suggested");
            return Ok(Vec::new());
        };
        let top_flows = self.data.top_flows(OPTIMIZATION_FLOW_COUNT).await;

        let reply = self
            .complete(&optimization_prompt(&cost_summary, &top_flows)?)
            .await?;

        Ok(parse_optimizations(&reply))
    }
}
