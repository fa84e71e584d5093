//! FlowScope Intelligence domain
//!
//! Turns FlowScope transfer, cost and anomaly summaries into LLM analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← fetch → prompt → complete → parse
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼────┐ ┌▼───────────┐
//! │ Flow  │ │ Completion │  ← traits + HTTP clients
//! │ Scope │ │ (Anthropic)│
//! └───────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_intelligence::{
//!     AnthropicProvider, CompletionConfig, FlowScopeClient, FlowScopeConfig,
//!     IntelligenceService, handlers,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let flowscope = FlowScopeClient::new(FlowScopeConfig::from_env()?)?;
//! let completion = AnthropicProvider::new(CompletionConfig::from_env()?)?;
//! let service = IntelligenceService::new(flowscope, completion);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod error;
pub mod flowscope;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod service;

// Re-export commonly used types
pub use completion::{AnthropicProvider, CompletionConfig, CompletionProvider};
pub use error::{IntelligenceError, IntelligenceResult};
pub use flowscope::{FlowDataSource, FlowScopeClient, FlowScopeConfig};
pub use models::{
    AnalysisContext, AnomalySummary, AnswerResponse, CostExplainRequest, CostSummary, Difficulty,
    FlowSummary, GraphStats, InvestigationRequest, OptimizationSuggestion, ParsedAnalysis,
    QuestionRequest,
};
pub use parser::{parse, parse_optimizations};
pub use service::IntelligenceService;
