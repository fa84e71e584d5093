//! Application state: the intelligence service with both upstream clients,
//! built once at start-up and shared by every request.

use domain_intelligence::{AnthropicProvider, FlowScopeClient, IntelligenceService};
use tracing::{info, warn};

use crate::config::Config;

pub type Service = IntelligenceService<FlowScopeClient, AnthropicProvider>;

/// Shared application state (cheap to clone; the service holds `Arc`s)
#[derive(Clone)]
pub struct AppState {
    pub service: Service,
}

impl AppState {
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let flowscope = FlowScopeClient::new(config.flowscope.clone())?;
        info!(base_url = %flowscope.base_url(), "FlowScope API client ready");

        let completion = AnthropicProvider::new(config.completion.clone())?;
        if config.completion.api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not set; analysis endpoints will return 503");
        } else {
            info!(model = %completion.model(), "Anthropic client ready");
        }

        Ok(Self {
            service: IntelligenceService::new(flowscope, completion),
        })
    }
}
