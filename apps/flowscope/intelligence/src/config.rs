use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_intelligence::{CompletionConfig, FlowScopeConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

const DEFAULT_PORT: u16 = 8090;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub flowscope: FlowScopeConfig,
    pub completion: CompletionConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env_with_default_port(DEFAULT_PORT)?; // HOST=0.0.0.0, PORT=8090
        let flowscope = FlowScopeConfig::from_env()?;
        let completion = CompletionConfig::from_env()?; // API key optional; /ready reports it

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            flowscope,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "HOST",
                "PORT",
                "FLOWSCOPE_API_URL",
                "ANTHROPIC_API_KEY",
                "CLAUDE_MODEL",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "flowscope_intelligence");
                assert_eq!(config.server.port, 8090);
                assert!(config.environment.is_development());
                assert_eq!(config.flowscope.base_url, "http://localhost:8080");
                assert!(config.completion.api_key.is_none());
                assert_eq!(config.completion.model, "claude-sonnet-4-20250514");
            },
        );
    }

    #[test]
    fn test_invalid_number_fails_startup() {
        temp_env::with_var("CLAUDE_MAX_TOKENS", Some("many"), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("CLAUDE_MAX_TOKENS"));
        });
    }
}
