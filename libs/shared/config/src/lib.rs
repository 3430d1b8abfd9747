use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub open_dental_api_url: String,
    pub open_dental_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            open_dental_api_url: env::var("OPEN_DENTAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("OPEN_DENTAL_API_URL not set, using empty value");
                    String::new()
                }),
            open_dental_api_key: env::var("OPEN_DENTAL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("OPEN_DENTAL_API_KEY not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Open Dental credentials not configured - scheduling integration disabled");
        }

        config
    }

    /// Capability check for the scheduling integration. The HTTP layer performs
    /// this once per request; the scheduling core always assumes a live provider.
    pub fn is_configured(&self) -> bool {
        !self.open_dental_api_url.is_empty()
            && !self.open_dental_api_key.is_empty()
    }
}
