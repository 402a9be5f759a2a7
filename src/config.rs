use std::env;

use anyhow::{Context, bail};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub weather_api_key: String,
    pub weather_base_url: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_base_url: String,
    pub static_dir: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("APP_PORT must be a number")?;

        let config = Self {
            port,
            environment: env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            weather_api_key: secret("WEATHER_API_KEY").context("WEATHER_API_KEY must be set")?,
            weather_base_url: env::var("WEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "google".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".to_string()),
            gemini_api_key: secret("GEMINI_API_KEY"),
            openai_api_key: secret("OPENAI_API_KEY"),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "crisis-agent".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that the weather key is present and that the selected generation
    /// provider has the secret it needs. Blank secrets count as missing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if is_blank(Some(self.weather_api_key.as_str())) {
            bail!("WEATHER_API_KEY must not be empty");
        }

        match self.llm_provider.as_str() {
            "google" if is_blank(self.gemini_api_key.as_deref()) => {
                bail!("GEMINI_API_KEY must be set when LLM_PROVIDER=google")
            }
            "openai" if is_blank(self.openai_api_key.as_deref()) => {
                bail!("OPENAI_API_KEY must be set when LLM_PROVIDER=openai")
            }
            "google" | "openai" | "ollama" => Ok(()),
            other => bail!("unsupported LLM_PROVIDER: {other}"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn secret(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
